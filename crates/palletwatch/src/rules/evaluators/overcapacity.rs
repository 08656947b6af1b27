//! Overcapacity detection.

use indexmap::IndexMap;
use serde_json::json;

use crate::error::Result;
use crate::location::LocationRecord;
use crate::rules::anomaly::{Anomaly, Evidence, Severity};
use crate::rules::engine::{EvaluationContext, RuleEvaluator};
use crate::rules::rule::Rule;
use crate::snapshot::{InventorySnapshot, PalletRecord};

/// Flags every pallet in a location holding more pallets than its derived
/// capacity.
///
/// Pallets group by the canonical resolved code, so padding or separator
/// drift between rows of the same physical location still counts together.
/// Unresolvable codes are left to the invalid-location rule.
pub struct OvercapacityEvaluator;

impl RuleEvaluator for OvercapacityEvaluator {
    fn evaluate(
        &self,
        rule: &Rule,
        snapshot: &InventorySnapshot,
        ctx: &EvaluationContext,
    ) -> Result<Vec<Anomaly>> {
        // Group by canonical code.
        let mut groups: IndexMap<String, (&LocationRecord, Vec<&PalletRecord>)> = IndexMap::new();
        for record in snapshot.complete_records() {
            if let Some(location) = ctx.classify(&record.location) {
                groups
                    .entry(location.code.clone())
                    .or_insert_with(|| (location, Vec::new()))
                    .1
                    .push(record);
            }
        }

        let mut anomalies = Vec::new();
        for (code, (location, pallets)) in &groups {
            let count = pallets.len();
            if count <= location.capacity as usize {
                continue;
            }

            let description = format!(
                "Location '{}' holds {} pallets, capacity {}",
                code, count, location.capacity
            );
            let sample: Vec<String> = pallets
                .iter()
                .take(5)
                .map(|p| p.pallet_id.clone())
                .collect();
            for pallet in pallets {
                anomalies.push(
                    Anomaly::new(
                        rule,
                        &pallet.pallet_id,
                        pallet.location.trim(),
                        Severity::Critical,
                        description.clone(),
                    )
                    .with_evidence(
                        Evidence::new()
                            .with_count(count)
                            .with_expected(json!(location.capacity))
                            .with_sample_pallets(sample.clone()),
                    ),
                );
            }
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
    use chrono::{DateTime, TimeZone, Utc};

    fn grammar(default_capacity: u32) -> WarehouseGrammar {
        WarehouseGrammar {
            warehouse_id: "WH1".to_string(),
            name: "Main".to_string(),
            aisles: 10,
            racks_per_aisle: 4,
            positions_per_rack: 20,
            level_names: vec!['A', 'B', 'C', 'D'],
            default_capacity,
            special_areas: vec![SpecialArea {
                code: "RCV-01".to_string(),
                area_type: LocationType::Receiving,
                capacity: 2,
                zone: "INBOUND".to_string(),
            }],
            detected_format: None,
            active: true,
        }
    }

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    fn evaluate(grammar: &WarehouseGrammar, snapshot: &InventorySnapshot) -> Vec<Anomaly> {
        let registry = WarehouseRegistry::new(vec![grammar.clone()], "WH1").unwrap();
        let resolution = ContextResolver::new(&registry).detect(&snapshot.distinct_locations());
        let ctx = EvaluationContext::build(grammar, &resolution, snapshot);
        let rule = Rule::new("R1", RuleType::Overcapacity, "overfull");
        OvercapacityEvaluator.evaluate(&rule, snapshot, &ctx).unwrap()
    }

    #[test]
    fn test_overfull_location_flags_every_pallet() {
        let grammar = grammar(1);
        let snapshot = InventorySnapshot::new(
            ts(),
            vec![
                PalletRecord::new("P1", "01-01-001-A", ts()),
                PalletRecord::new("P2", "01-01-001-A", ts()),
                PalletRecord::new("P3", "01-01-001-A", ts()),
                PalletRecord::new("P4", "01-01-002-A", ts()),
            ],
        );
        let anomalies = evaluate(&grammar, &snapshot);
        assert_eq!(anomalies.len(), 3);
        for anomaly in &anomalies {
            assert!(anomaly.description.contains("3 pallets, capacity 1"));
            assert_eq!(anomaly.location, "01-01-001-A");
        }
    }

    #[test]
    fn test_at_capacity_passes() {
        let grammar = grammar(2);
        let snapshot = InventorySnapshot::new(
            ts(),
            vec![
                PalletRecord::new("P1", "01-01-001-A", ts()),
                PalletRecord::new("P2", "01-01-001-A", ts()),
            ],
        );
        assert!(evaluate(&grammar, &snapshot).is_empty());
    }

    #[test]
    fn test_drifted_codes_group_together() {
        let grammar = grammar(1);
        // Same physical slot rendered three different ways.
        let snapshot = InventorySnapshot::new(
            ts(),
            vec![
                PalletRecord::new("P1", "01-01-001-A", ts()),
                PalletRecord::new("P2", "1-1-1-A", ts()),
                PalletRecord::new("P3", "01_01_001_a", ts()),
            ],
        );
        let anomalies = evaluate(&grammar, &snapshot);
        assert_eq!(anomalies.len(), 3);
        assert!(anomalies[0].description.contains("3 pallets, capacity 1"));
    }

    #[test]
    fn test_special_area_capacity_used() {
        let grammar = grammar(10);
        let snapshot = InventorySnapshot::new(
            ts(),
            vec![
                PalletRecord::new("P1", "RCV-01", ts()),
                PalletRecord::new("P2", "RCV-01", ts()),
                PalletRecord::new("P3", "RCV-01", ts()),
            ],
        );
        let anomalies = evaluate(&grammar, &snapshot);
        assert_eq!(anomalies.len(), 3);
        assert!(anomalies[0].description.contains("capacity 2"));
    }

    #[test]
    fn test_unresolvable_codes_skipped() {
        let grammar = grammar(1);
        let snapshot = InventorySnapshot::new(
            ts(),
            vec![
                PalletRecord::new("P1", "JUNK", ts()),
                PalletRecord::new("P2", "JUNK", ts()),
            ],
        );
        assert!(evaluate(&grammar, &snapshot).is_empty());
    }
}
