//! Invalid-location detection.

use serde_json::json;

use crate::error::Result;
use crate::rules::anomaly::{Anomaly, Evidence, Severity};
use crate::rules::engine::{EvaluationContext, RuleEvaluator};
use crate::rules::rule::Rule;
use crate::snapshot::InventorySnapshot;

/// Flags pallets whose location code fails validation even after every
/// normalized variant has been tried.
///
/// The evidence carries the raw code's failure reason — the exceeded bound
/// or the shape check that did not hold — so the finding is explainable.
pub struct InvalidLocationEvaluator;

impl RuleEvaluator for InvalidLocationEvaluator {
    fn evaluate(
        &self,
        rule: &Rule,
        snapshot: &InventorySnapshot,
        ctx: &EvaluationContext,
    ) -> Result<Vec<Anomaly>> {
        let mut anomalies = Vec::new();
        for record in snapshot.complete_records() {
            if ctx.classify(&record.location).is_some() {
                continue;
            }

            let code = record.location.trim();
            let reason = ctx
                .raw_validity(code)
                .and_then(|v| v.reason.clone())
                .unwrap_or_else(|| "location could not be classified".to_string());
            let description = format!(
                "Pallet {} is on location '{}' which is not addressable in warehouse {}: {}",
                record.pallet_id, code, ctx.warehouse.warehouse_id, reason
            );
            anomalies.push(
                Anomaly::new(rule, &record.pallet_id, code, Severity::Critical, description)
                    .with_evidence(
                        Evidence::new()
                            .with_observed(json!(code))
                            .with_reason(reason),
                    ),
            );
        }
        Ok(anomalies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextResolver;
    use crate::grammar::{SpecialArea, WarehouseGrammar, WarehouseRegistry};
    use crate::location::LocationType;
    use crate::rules::rule::RuleType;
    use crate::snapshot::PalletRecord;
    use chrono::{DateTime, TimeZone, Utc};

    fn grammar() -> WarehouseGrammar {
        WarehouseGrammar {
            warehouse_id: "WH1".to_string(),
            name: "Main".to_string(),
            aisles: 10,
            racks_per_aisle: 4,
            positions_per_rack: 20,
            level_names: vec!['A', 'B', 'C', 'D'],
            default_capacity: 2,
            special_areas: vec![SpecialArea {
                code: "RCV-01".to_string(),
                area_type: LocationType::Receiving,
                capacity: 50,
                zone: "INBOUND".to_string(),
            }],
            detected_format: None,
            active: true,
        }
    }

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    fn evaluate(snapshot: &InventorySnapshot) -> Vec<Anomaly> {
        let grammar = grammar();
        let registry = WarehouseRegistry::new(vec![grammar.clone()], "WH1").unwrap();
        let resolution = ContextResolver::new(&registry).detect(&snapshot.distinct_locations());
        let ctx = EvaluationContext::build(&grammar, &resolution, snapshot);
        let rule = Rule::new("R1", RuleType::InvalidLocation, "invalid location");
        InvalidLocationEvaluator
            .evaluate(&rule, snapshot, &ctx)
            .unwrap()
    }

    #[test]
    fn test_valid_and_normalizable_codes_pass() {
        let snapshot = InventorySnapshot::new(
            ts(),
            vec![
                PalletRecord::new("P1", "01-01-001-A", ts()),
                PalletRecord::new("P2", "rcv-01", ts()),
                PalletRecord::new("P3", "1_2_3_b", ts()),
            ],
        );
        assert!(evaluate(&snapshot).is_empty());
    }

    #[test]
    fn test_out_of_bounds_flagged_with_reason() {
        let snapshot = InventorySnapshot::new(
            ts(),
            vec![PalletRecord::new("P1", "99-01-001-A", ts())],
        );
        let anomalies = evaluate(&snapshot);
        assert_eq!(anomalies.len(), 1);
        assert!(anomalies[0]
            .description
            .contains("aisle 99 exceeds configured maximum of 10"));
        assert_eq!(anomalies[0].severity, Severity::Critical);
        assert!(anomalies[0].evidence.reason.is_some());
    }

    #[test]
    fn test_garbage_code_flagged() {
        let snapshot =
            InventorySnapshot::new(ts(), vec![PalletRecord::new("P1", "??", ts())]);
        let anomalies = evaluate(&snapshot);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].location, "??");
    }

    #[test]
    fn test_duplicate_rows_single_pallet() {
        // Same pallet listed twice on the same bad code: the engine-level
        // dedup handles (pallet, rule) pairs; the evaluator itself emits
        // one finding per row.
        let snapshot = InventorySnapshot::new(
            ts(),
            vec![
                PalletRecord::new("P1", "??", ts()),
                PalletRecord::new("P1", "??", ts()),
            ],
        );
        let anomalies = evaluate(&snapshot);
        assert_eq!(anomalies.len(), 2);
    }
}
