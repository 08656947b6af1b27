//! Scoring and selection of the best-matching warehouse.

use indexmap::IndexSet;

use crate::grammar::{WarehouseGrammar, WarehouseRegistry};
use crate::location::{LocationNormalizer, VirtualLocationEngine};

use super::score::{ConfidenceLevel, ContextResolution, WarehouseMatchScore};

/// Resolves which registered warehouse a snapshot belongs to.
///
/// Never fails: when nothing matches, the registry's designated fallback
/// warehouse is returned with score 0 and LOW confidence so analysis can
/// still run in degraded mode.
#[derive(Debug)]
pub struct ContextResolver<'r> {
    registry: &'r WarehouseRegistry,
}

impl<'r> ContextResolver<'r> {
    /// Create a resolver over a registry.
    pub fn new(registry: &'r WarehouseRegistry) -> Self {
        Self { registry }
    }

    /// Score every active warehouse against the snapshot's distinct
    /// location codes and pick the best match.
    ///
    /// Each code is expanded through the normalizer; a warehouse matches a
    /// code when any variant addresses one of its locations. The score
    /// denominator stays the count of original distinct codes. Ties break
    /// toward the warehouse with more registered locations — a richer
    /// layout beats a sparse default.
    pub fn detect(&self, snapshot_locations: &IndexSet<String>) -> ContextResolution {
        let distinct = snapshot_locations.len();

        let mut detailed_scores: Vec<WarehouseMatchScore> = self
            .registry
            .active()
            .map(|grammar| self.score_warehouse(grammar, snapshot_locations, distinct))
            .collect();

        detailed_scores.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(b.total_locations.cmp(&a.total_locations))
        });

        match detailed_scores.first() {
            Some(best) if best.score > 0.0 => ContextResolution {
                warehouse_id: best.warehouse_id.clone(),
                score: best.score,
                confidence: ConfidenceLevel::from_score(best.score),
                fallback: false,
                detailed_scores,
            },
            _ => ContextResolution {
                warehouse_id: self.registry.fallback_warehouse_id.clone(),
                score: 0.0,
                confidence: ConfidenceLevel::Low,
                fallback: true,
                detailed_scores,
            },
        }
    }

    fn score_warehouse(
        &self,
        grammar: &WarehouseGrammar,
        snapshot_locations: &IndexSet<String>,
        distinct: usize,
    ) -> WarehouseMatchScore {
        let engine = VirtualLocationEngine::new(grammar);
        let normalizer = LocationNormalizer::for_grammar(grammar);

        let matching = snapshot_locations
            .iter()
            .filter(|code| engine.resolve_normalized(&normalizer, code).is_some())
            .count();

        WarehouseMatchScore {
            warehouse_id: grammar.warehouse_id.clone(),
            total_locations: grammar.total_location_count(),
            matching_locations: matching,
            distinct_snapshot_locations: distinct,
            score: if distinct == 0 {
                0.0
            } else {
                matching as f64 / distinct as f64
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::SpecialArea;
    use crate::location::LocationType;

    fn grammar(id: &str, aisles: u32, areas: &[&str]) -> WarehouseGrammar {
        WarehouseGrammar {
            warehouse_id: id.to_string(),
            name: id.to_string(),
            aisles,
            racks_per_aisle: 4,
            positions_per_rack: 20,
            level_names: vec!['A', 'B', 'C', 'D'],
            default_capacity: 2,
            special_areas: areas
                .iter()
                .map(|code| SpecialArea {
                    code: code.to_string(),
                    area_type: LocationType::Receiving,
                    capacity: 50,
                    zone: "INBOUND".to_string(),
                })
                .collect(),
            detected_format: None,
            active: true,
        }
    }

    fn locations(codes: &[&str]) -> IndexSet<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_exclusive_special_areas_score_one() {
        let registry = WarehouseRegistry::new(
            vec![
                grammar("WH1", 10, &["WH1-RCV", "WH1-STG"]),
                grammar("WH2", 10, &["WH2-RCV"]),
            ],
            "WH1",
        )
        .unwrap();
        let resolver = ContextResolver::new(&registry);

        // Both codes only exist in WH1 (grid shapes don't apply).
        let resolution = resolver.detect(&locations(&["WH1-RCV", "WH1-STG"]));
        assert_eq!(resolution.warehouse_id, "WH1");
        assert!((resolution.score - 1.0).abs() < f64::EPSILON);
        assert_eq!(resolution.confidence, ConfidenceLevel::High);
        assert!(!resolution.fallback);
    }

    #[test]
    fn test_tie_breaks_toward_richer_layout() {
        let registry = WarehouseRegistry::new(
            vec![grammar("SMALL", 2, &[]), grammar("BIG", 50, &[])],
            "SMALL",
        )
        .unwrap();
        let resolver = ContextResolver::new(&registry);

        // Valid in both layouts; the larger warehouse wins the tie.
        let resolution = resolver.detect(&locations(&["01-01-001-A", "02-02-002-B"]));
        assert_eq!(resolution.warehouse_id, "BIG");
        assert_eq!(resolution.detailed_scores.len(), 2);
    }

    #[test]
    fn test_no_match_falls_back() {
        let registry =
            WarehouseRegistry::new(vec![grammar("WH1", 10, &["WH1-RCV"])], "WH1").unwrap();
        let resolver = ContextResolver::new(&registry);

        let resolution = resolver.detect(&locations(&["XX##YY", "??"]));
        assert!(resolution.fallback);
        assert_eq!(resolution.warehouse_id, "WH1");
        assert_eq!(resolution.score, 0.0);
        assert_eq!(resolution.confidence, ConfidenceLevel::Low);
    }

    #[test]
    fn test_empty_snapshot_falls_back() {
        let registry =
            WarehouseRegistry::new(vec![grammar("WH1", 10, &["WH1-RCV"])], "WH1").unwrap();
        let resolver = ContextResolver::new(&registry);

        let resolution = resolver.detect(&IndexSet::new());
        assert!(resolution.fallback);
        assert_eq!(resolution.confidence, ConfidenceLevel::Low);
    }

    #[test]
    fn test_inactive_warehouses_skipped() {
        let mut retired = grammar("OLD", 10, &["OLD-RCV"]);
        retired.active = false;
        let registry =
            WarehouseRegistry::new(vec![retired, grammar("WH1", 10, &["WH1-RCV"])], "WH1")
                .unwrap();
        let resolver = ContextResolver::new(&registry);

        let resolution = resolver.detect(&locations(&["OLD-RCV"]));
        // OLD would match, but it is deactivated.
        assert!(resolution.fallback);
        assert_eq!(resolution.detailed_scores.len(), 1);
    }

    #[test]
    fn test_normalization_widens_matching() {
        let registry = WarehouseRegistry::new(vec![grammar("WH1", 10, &[])], "WH1").unwrap();
        let resolver = ContextResolver::new(&registry);

        let resolution = resolver.detect(&locations(&["1-1-1-a", "02_03_004_b"]));
        assert_eq!(resolution.warehouse_id, "WH1");
        assert!((resolution.score - 1.0).abs() < f64::EPSILON);
    }
}
