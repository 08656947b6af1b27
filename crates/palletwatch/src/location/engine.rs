//! The virtual location engine.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::grammar::WarehouseGrammar;

use super::normalize::LocationNormalizer;
use super::record::{LocationRecord, LocationValidity};
use super::resolver::{GridResolver, LocationResolver, SpecialAreaResolver};

/// Validates and classifies location codes against one warehouse grammar.
///
/// Resolution order: exact special-area match, then the detected format
/// (when confident), then the default aisle-rack-position-level grammar.
/// Memory stays O(special areas); each lookup is O(code length).
#[derive(Debug)]
pub struct VirtualLocationEngine<'g> {
    grammar: &'g WarehouseGrammar,
    special: SpecialAreaResolver<'g>,
    grid: GridResolver<'g>,
}

impl<'g> VirtualLocationEngine<'g> {
    /// Build an engine over a grammar.
    pub fn new(grammar: &'g WarehouseGrammar) -> Self {
        Self {
            grammar,
            special: SpecialAreaResolver::new(grammar),
            grid: GridResolver::new(grammar),
        }
    }

    /// The grammar this engine interprets.
    pub fn grammar(&self) -> &WarehouseGrammar {
        self.grammar
    }

    /// Check whether a code addresses a real location, with the failed
    /// check named when it does not.
    pub fn validate(&self, code: &str) -> LocationValidity {
        let trimmed = code.trim();
        if trimmed.is_empty() {
            return LocationValidity::invalid("empty location code");
        }
        if self.special.resolve(trimmed).is_some() {
            return LocationValidity::valid();
        }
        match self.grid.resolve_detailed(trimmed) {
            Ok(_) => LocationValidity::valid(),
            Err(reason) => LocationValidity::invalid(reason),
        }
    }

    /// Full derived attributes for a code, or `None` when it is invalid.
    pub fn resolve(&self, code: &str) -> Option<LocationRecord> {
        let trimmed = code.trim();
        if trimmed.is_empty() {
            return None;
        }
        self.special
            .resolve(trimmed)
            .or_else(|| self.grid.resolve(trimmed))
    }

    /// Resolve a raw code, trying normalized variants in order until one
    /// addresses a real location.
    pub fn resolve_normalized(
        &self,
        normalizer: &LocationNormalizer,
        raw: &str,
    ) -> Option<LocationRecord> {
        normalizer
            .variants(raw)
            .iter()
            .find_map(|variant| self.resolve(variant))
    }

    /// Aggregate counts for diagnostics. Computed arithmetically; the
    /// storage grid is never enumerated.
    pub fn summary(&self) -> WarehouseSummary {
        let mut locations_by_type: IndexMap<String, u64> = IndexMap::new();
        locations_by_type.insert(
            "STORAGE".to_string(),
            self.grammar.storage_location_count(),
        );
        for area in &self.grammar.special_areas {
            *locations_by_type
                .entry(area.area_type.label().to_string())
                .or_insert(0) += 1;
        }

        WarehouseSummary {
            warehouse_id: self.grammar.warehouse_id.clone(),
            total_locations: self.grammar.total_location_count(),
            locations_by_type,
            total_capacity: self.grammar.total_capacity(),
            special_area_codes: self
                .grammar
                .special_areas
                .iter()
                .map(|a| a.code.clone())
                .collect(),
        }
    }
}

/// Aggregate location counts for one warehouse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseSummary {
    /// The warehouse summarized.
    pub warehouse_id: String,
    /// Total addressable locations, storage grid included.
    pub total_locations: u64,
    /// Location counts keyed by type label.
    pub locations_by_type: IndexMap<String, u64>,
    /// Theoretical pallet capacity.
    pub total_capacity: u64,
    /// Codes of all special areas.
    pub special_area_codes: Vec<String>,
}
