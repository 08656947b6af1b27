//! Warehouse grammar definition and invariant checks.

use serde::{Deserialize, Serialize};

use crate::error::{PalletwatchError, Result};
use crate::format::FormatPattern;
use crate::location::LocationType;

fn default_active() -> bool {
    true
}

/// A named location outside the regular aisle-rack-position-level addressing
/// (receiving bay, staging lane, dock door, transitional buffer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialArea {
    /// Exact location code as it appears in inventory extracts.
    pub code: String,
    /// Area classification.
    pub area_type: LocationType,
    /// Pallet capacity of the area.
    pub capacity: u32,
    /// Zone the area belongs to.
    pub zone: String,
}

/// Compact descriptor of a warehouse's addressable coordinate space.
///
/// The grammar never materializes the aisle × rack × position × level
/// product; bulk storage locations are derived on demand by the
/// [`VirtualLocationEngine`](crate::location::VirtualLocationEngine).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseGrammar {
    /// Unique warehouse identifier.
    pub warehouse_id: String,
    /// Display name.
    pub name: String,
    /// Number of aisles, numbered from 1.
    pub aisles: u32,
    /// Racks per aisle, numbered from 1.
    pub racks_per_aisle: u32,
    /// Positions per rack, numbered from 1.
    pub positions_per_rack: u32,
    /// Ordered level letters, e.g. `['A', 'B', 'C', 'D']`.
    pub level_names: Vec<char>,
    /// Pallet capacity of a single storage slot.
    pub default_capacity: u32,
    /// Named areas outside the storage grid.
    #[serde(default)]
    pub special_areas: Vec<SpecialArea>,
    /// Location-code format learned from examples, when one was detected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_format: Option<FormatPattern>,
    /// Soft-deactivation flag; inactive warehouses are skipped by the
    /// context resolver but stay resolvable for old reports.
    #[serde(default = "default_active")]
    pub active: bool,
}

impl WarehouseGrammar {
    /// Check the structural invariants: positive counts, at least one level,
    /// no duplicate level names, special areas classified as non-storage.
    pub fn validate(&self) -> Result<()> {
        let fail = |message: String| {
            Err(PalletwatchError::InvalidGrammar {
                warehouse_id: self.warehouse_id.clone(),
                message,
            })
        };

        if self.warehouse_id.trim().is_empty() {
            return fail("warehouse_id must not be empty".to_string());
        }
        if self.aisles == 0 || self.racks_per_aisle == 0 || self.positions_per_rack == 0 {
            return fail("aisle, rack and position counts must be positive".to_string());
        }
        if self.default_capacity == 0 {
            return fail("default_capacity must be positive".to_string());
        }
        if self.level_names.is_empty() {
            return fail("at least one level name is required".to_string());
        }
        for (i, level) in self.level_names.iter().enumerate() {
            if self.level_names[..i].contains(level) {
                return fail(format!("duplicate level name '{}'", level));
            }
        }
        for area in &self.special_areas {
            if area.code.trim().is_empty() {
                return fail("special area with empty code".to_string());
            }
            if matches!(area.area_type, LocationType::Storage | LocationType::Unknown) {
                return fail(format!(
                    "special area '{}' must have a non-storage type",
                    area.code
                ));
            }
        }
        Ok(())
    }

    /// Find a special area by exact (trimmed) code match.
    pub fn special_area(&self, code: &str) -> Option<&SpecialArea> {
        let trimmed = code.trim();
        self.special_areas.iter().find(|a| a.code == trimmed)
    }

    /// Number of addressable storage slots, computed arithmetically.
    pub fn storage_location_count(&self) -> u64 {
        self.aisles as u64
            * self.racks_per_aisle as u64
            * self.positions_per_rack as u64
            * self.level_names.len() as u64
    }

    /// Total addressable locations including special areas.
    pub fn total_location_count(&self) -> u64 {
        self.storage_location_count() + self.special_areas.len() as u64
    }

    /// Theoretical pallet capacity across the whole warehouse.
    pub fn total_capacity(&self) -> u64 {
        let storage = self.storage_location_count() * self.default_capacity as u64;
        let special: u64 = self.special_areas.iter().map(|a| a.capacity as u64).sum();
        storage + special
    }
}
