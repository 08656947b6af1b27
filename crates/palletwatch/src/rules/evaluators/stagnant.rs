//! Stagnant-pallet detection.

use serde_json::json;

use crate::error::{PalletwatchError, Result};
use crate::location::LocationType;
use crate::rules::anomaly::{Anomaly, Evidence, Severity};
use crate::rules::engine::{EvaluationContext, RuleEvaluator};
use crate::rules::rule::Rule;
use crate::snapshot::InventorySnapshot;

/// Flags pallets that have sat in the named location types longer than the
/// configured threshold.
///
/// Conditions: `time_threshold_hours` (number), `location_types` (list of
/// type labels). Ages are measured against the snapshot's `taken_at`, from
/// the last move when the extract carries one.
pub struct StagnantPalletsEvaluator;

impl RuleEvaluator for StagnantPalletsEvaluator {
    fn evaluate(
        &self,
        rule: &Rule,
        snapshot: &InventorySnapshot,
        ctx: &EvaluationContext,
    ) -> Result<Vec<Anomaly>> {
        let threshold_hours = rule.conditions.require_f64("time_threshold_hours")?;
        let type_labels = rule.conditions.require_str_list("location_types")?;
        let watched: Vec<LocationType> = type_labels
            .iter()
            .map(|label| {
                LocationType::parse(label).ok_or_else(|| PalletwatchError::InvalidCondition {
                    key: "location_types".to_string(),
                    expected: format!("known location types, got '{}'", label),
                })
            })
            .collect::<Result<_>>()?;

        let mut anomalies = Vec::new();
        for record in snapshot.complete_records() {
            let location_type = ctx.location_type(&record.location);
            if !watched.contains(&location_type) {
                continue;
            }

            let age_hours = record.age_at(snapshot.taken_at).num_minutes() as f64 / 60.0;
            if age_hours > threshold_hours {
                let description = format!(
                    "Pallet {} has been in {} location '{}' for {:.1} hours (threshold {})",
                    record.pallet_id,
                    location_type.label(),
                    record.location.trim(),
                    age_hours,
                    threshold_hours
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
                            .with_observed(json!(location_type.label()))
                            .with_elapsed_hours(age_hours)
                            .with_threshold(threshold_hours),
                    ),
                );
            }
        }
        Ok(anomalies)
    }
}
