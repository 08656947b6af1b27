//! Uncoordinated-lot detection.

use indexmap::IndexMap;
use serde_json::json;

use crate::error::{PalletwatchError, Result};
use crate::location::LocationType;
use crate::rules::anomaly::{Anomaly, Evidence, Severity};
use crate::rules::engine::{EvaluationContext, RuleEvaluator};
use crate::rules::rule::Rule;
use crate::snapshot::{InventorySnapshot, PalletRecord};

/// Flags lots that moved only partially: some pallets reached a final
/// location type while others are still in intake areas, and the completed
/// fraction is below the configured threshold.
///
/// Conditions: `completion_threshold` (0–1), optional
/// `final_location_types` (defaults to `["STORAGE"]`). Pallets group by
/// `lot_id`, falling back to `receipt_number`; rows without either are
/// outside any lot and ignored.
pub struct UncoordinatedLotsEvaluator;

impl RuleEvaluator for UncoordinatedLotsEvaluator {
    fn evaluate(
        &self,
        rule: &Rule,
        snapshot: &InventorySnapshot,
        ctx: &EvaluationContext,
    ) -> Result<Vec<Anomaly>> {
        let threshold = rule.conditions.require_f64("completion_threshold")?;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(PalletwatchError::InvalidCondition {
                key: "completion_threshold".to_string(),
                expected: "a fraction between 0 and 1".to_string(),
            });
        }
        let final_labels = rule
            .conditions
            .optional_str_list("final_location_types")?
            .unwrap_or_else(|| vec!["STORAGE".to_string()]);
        let final_types: Vec<LocationType> = final_labels
            .iter()
            .map(|label| {
                LocationType::parse(label).ok_or_else(|| PalletwatchError::InvalidCondition {
                    key: "final_location_types".to_string(),
                    expected: format!("known location types, got '{}'", label),
                })
            })
            .collect::<Result<_>>()?;

        // Group rows by lot key.
        let mut lots: IndexMap<String, Vec<&PalletRecord>> = IndexMap::new();
        for record in snapshot.complete_records() {
            if let Some(key) = record.lot_key() {
                lots.entry(key.to_string()).or_default().push(record);
            }
        }

        let mut anomalies = Vec::new();
        for (lot, pallets) in &lots {
            let total = pallets.len();
            let completed = pallets
                .iter()
                .filter(|p| final_types.contains(&ctx.location_type(&p.location)))
                .count();
            let lagging: Vec<&&PalletRecord> = pallets
                .iter()
                .filter(|p| ctx.location_type(&p.location).is_intake())
                .collect();

            let completed_fraction = completed as f64 / total as f64;
            if completed_fraction >= threshold || lagging.is_empty() {
                continue;
            }

            for pallet in lagging {
                let location_type = ctx.location_type(&pallet.location);
                let description = format!(
                    "Lot '{}' is {:.0}% complete ({} of {} pallets, threshold {:.0}%): pallet {} still in {} location '{}'",
                    lot,
                    completed_fraction * 100.0,
                    completed,
                    total,
                    threshold * 100.0,
                    pallet.pallet_id,
                    location_type.label(),
                    pallet.location.trim()
                );
                anomalies.push(
                    Anomaly::new(
                        rule,
                        &pallet.pallet_id,
                        pallet.location.trim(),
                        Severity::Warning,
                        description,
                    )
                    .with_evidence(
                        Evidence::new()
                            .with_observed(json!(completed_fraction))
                            .with_threshold(threshold)
                            .with_count(total)
                            .with_sample_pallets(
                                pallets.iter().take(5).map(|p| p.pallet_id.clone()).collect(),
                            ),
                    ),
                );
            }
        }
        Ok(anomalies)
    }
}
