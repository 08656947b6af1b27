//! Declared-vs-derived location type cross-checks.

use serde_json::json;

use crate::error::Result;
use crate::location::LocationType;
use crate::rules::anomaly::{Anomaly, Evidence, Severity};
use crate::rules::engine::{EvaluationContext, RuleEvaluator};
use crate::rules::rule::Rule;
use crate::snapshot::InventorySnapshot;

/// Flags rows whose declared location type disagrees with the type the
/// engine derives from the grammar.
///
/// Rows without a declared type are out of scope, and codes the engine
/// cannot classify at all are left to the invalid-location rule.
pub struct LocationMappingErrorEvaluator;

impl RuleEvaluator for LocationMappingErrorEvaluator {
    fn evaluate(
        &self,
        rule: &Rule,
        snapshot: &InventorySnapshot,
        ctx: &EvaluationContext,
    ) -> Result<Vec<Anomaly>> {
        let mut anomalies = Vec::new();
        for record in snapshot.complete_records() {
            let Some(declared_raw) = record.declared_type.as_deref() else {
                continue;
            };
            if declared_raw.trim().is_empty() {
                continue;
            }

            let derived = ctx.location_type(&record.location);
            if derived == LocationType::Unknown {
                continue;
            }

            // An unparseable declared label can never agree with the
            // derived type, so it is a mapping error too.
            let matches = LocationType::parse(declared_raw)
                .is_some_and(|declared| declared == derived);
            if matches {
                continue;
            }

            let description = format!(
                "Pallet {} declares location type '{}' but '{}' is {}",
                record.pallet_id,
                declared_raw.trim(),
                record.location.trim(),
                derived.label()
            );
            anomalies.push(
                Anomaly::new(
                    rule,
                    &record.pallet_id,
                    record.location.trim(),
                    Severity::Warning,
                    description,
                )
                .with_evidence(
                    Evidence::new()
                        .with_observed(json!(declared_raw.trim()))
                        .with_expected(json!(derived.label())),
                ),
            );
        }
        Ok(anomalies)
    }
}
