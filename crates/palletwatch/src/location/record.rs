//! Location records and classification types.

use serde::{Deserialize, Serialize};

/// Classification of a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationType {
    /// A regular aisle-rack-position-level storage slot.
    Storage,
    /// Inbound receiving area.
    Receiving,
    /// Staging lane awaiting putaway or dispatch.
    Staging,
    /// Dock door.
    Dock,
    /// Transitional buffer between areas.
    Transitional,
    /// Could not be classified.
    Unknown,
}

impl LocationType {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            LocationType::Storage => "STORAGE",
            LocationType::Receiving => "RECEIVING",
            LocationType::Staging => "STAGING",
            LocationType::Dock => "DOCK",
            LocationType::Transitional => "TRANSITIONAL",
            LocationType::Unknown => "UNKNOWN",
        }
    }

    /// Parse a declared type string, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "STORAGE" => Some(LocationType::Storage),
            "RECEIVING" => Some(LocationType::Receiving),
            "STAGING" => Some(LocationType::Staging),
            "DOCK" => Some(LocationType::Dock),
            "TRANSITIONAL" => Some(LocationType::Transitional),
            "UNKNOWN" => Some(LocationType::Unknown),
            _ => None,
        }
    }

    /// Whether pallets in this type of location are still inbound.
    pub fn is_intake(&self) -> bool {
        matches!(
            self,
            LocationType::Receiving
                | LocationType::Staging
                | LocationType::Dock
                | LocationType::Transitional
        )
    }
}

/// Where a location record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// A persisted row (special/custom areas).
    Physical,
    /// Derived on demand from the grammar.
    Virtual,
}

/// Full derived attributes of one location.
///
/// Physical and virtual provenances produce the identical shape; rule
/// evaluators never need to know which side a record came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationRecord {
    /// Canonical location code.
    pub code: String,
    /// Owning warehouse.
    pub warehouse_id: String,
    /// Classification.
    pub location_type: LocationType,
    /// Zone, when one is defined for the location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    /// Pallet capacity.
    pub capacity: u32,
    /// Aisle coordinate, for grid locations that carry one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aisle: Option<u32>,
    /// Rack coordinate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rack: Option<u32>,
    /// Position coordinate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    /// Level letter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<char>,
    /// Whether the location is in service.
    pub active: bool,
    /// Physical or virtual origin.
    pub provenance: Provenance,
}

/// Outcome of validating one location code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationValidity {
    /// Whether the code addresses a real location.
    pub valid: bool,
    /// For invalid codes, which check failed — bound exceeded, bad shape,
    /// unknown level. Required for explainable anomaly text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl LocationValidity {
    /// A valid outcome.
    pub fn valid() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    /// An invalid outcome with the failed check named.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }
}
