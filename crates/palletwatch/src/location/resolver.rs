//! Location resolution: one contract, two provenances.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::format::{FormatPattern, PatternType, MIN_FORMAT_CONFIDENCE};
use crate::grammar::WarehouseGrammar;

use super::record::{LocationRecord, LocationType, Provenance};

/// Default storage-grid shape: zero-padded numeric aisle, rack, and
/// position segments with a single level letter.
static GRID_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,4})-(\d{1,4})-(\d{1,5})-([A-Za-z])$").unwrap());

/// Resolves a location code to its full derived attributes.
///
/// The two implementations — persisted special areas and the virtual
/// storage grid — produce identical record shapes, so consumers never
/// learn which side a record came from.
pub trait LocationResolver: Send + Sync {
    /// Resolve a (trimmed) code, or `None` when it isn't addressable.
    fn resolve(&self, code: &str) -> Option<LocationRecord>;
}

/// Resolver over the grammar's persisted special areas.
#[derive(Debug)]
pub struct SpecialAreaResolver<'g> {
    grammar: &'g WarehouseGrammar,
}

impl<'g> SpecialAreaResolver<'g> {
    /// Create a resolver over the grammar's special areas.
    pub fn new(grammar: &'g WarehouseGrammar) -> Self {
        Self { grammar }
    }
}

impl LocationResolver for SpecialAreaResolver<'_> {
    fn resolve(&self, code: &str) -> Option<LocationRecord> {
        let area = self.grammar.special_area(code)?;
        Some(LocationRecord {
            code: area.code.clone(),
            warehouse_id: self.grammar.warehouse_id.clone(),
            location_type: area.area_type,
            zone: Some(area.zone.clone()),
            capacity: area.capacity,
            aisle: None,
            rack: None,
            position: None,
            level: None,
            active: self.grammar.active,
            provenance: Provenance::Physical,
        })
    }
}

/// Resolver for the virtual storage grid.
///
/// Derives records on demand from the grammar — the aisle × rack ×
/// position × level product is never materialized. When the grammar
/// carries a detected format at or above [`MIN_FORMAT_CONFIDENCE`], codes
/// are interpreted through that format; otherwise the default zero-padded
/// aisle-rack-position-level grammar applies.
#[derive(Debug)]
pub struct GridResolver<'g> {
    grammar: &'g WarehouseGrammar,
}

impl<'g> GridResolver<'g> {
    /// Create a resolver over the grammar's storage grid.
    pub fn new(grammar: &'g WarehouseGrammar) -> Self {
        Self { grammar }
    }

    /// The detected format, when it is confident enough to use.
    fn confident_format(&self) -> Option<&FormatPattern> {
        self.grammar
            .detected_format
            .as_ref()
            .filter(|f| f.confidence >= MIN_FORMAT_CONFIDENCE)
    }

    /// Resolve with a failure reason, for explainable validation.
    pub fn resolve_detailed(&self, code: &str) -> Result<LocationRecord, String> {
        match self.confident_format() {
            Some(format) => self.resolve_via_format(format, code),
            None => self.resolve_default(code),
        }
    }

    /// Interpret a code through the detected format.
    fn resolve_via_format(
        &self,
        format: &FormatPattern,
        code: &str,
    ) -> Result<LocationRecord, String> {
        let values = format.capture(code).ok_or_else(|| {
            format!(
                "location '{}' does not match the detected format {}",
                code,
                format.shape()
            )
        })?;

        match format.pattern_type {
            PatternType::AisleRackPositionLevel => {
                let [aisle, rack, position, level] = values.as_slice() else {
                    return Err(format!(
                        "location '{}' does not match the detected format {}",
                        code,
                        format.shape()
                    ));
                };
                let aisle = parse_coordinate(aisle, "aisle")?;
                let rack = parse_coordinate(rack, "rack")?;
                let position = parse_coordinate(position, "position")?;
                let level = parse_level(level)?;
                self.check_grid_bounds(aisle, rack, position, level)?;
                Ok(self.grid_record(code, Some(aisle), Some(rack), Some(position), Some(level)))
            }
            PatternType::PositionLevel => {
                let [position, level] = values.as_slice() else {
                    return Err(format!(
                        "location '{}' does not match the detected format {}",
                        code,
                        format.shape()
                    ));
                };
                let position = parse_coordinate(position, "position")?;
                let level = parse_level(level)?;
                // Position+level codes address slots across the whole
                // floor, so the bound is the per-level slot count.
                let max_position = self.grammar.aisles as u64
                    * self.grammar.racks_per_aisle as u64
                    * self.grammar.positions_per_rack as u64;
                if position as u64 > max_position {
                    return Err(format!(
                        "position {} exceeds configured maximum of {}",
                        position, max_position
                    ));
                }
                if position == 0 {
                    return Err("position 0 is below the minimum of 1".to_string());
                }
                self.check_level(level)?;
                Ok(self.grid_record(code, None, None, Some(position), Some(level)))
            }
            PatternType::AlphanumericFree => {
                Ok(self.grid_record(code, None, None, None, None))
            }
        }
    }

    /// Interpret a code as the default `AA-RR-PPP-L` grammar.
    fn resolve_default(&self, code: &str) -> Result<LocationRecord, String> {
        let captures = GRID_SHAPE.captures(code).ok_or_else(|| {
            format!(
                "location '{}' does not match the AA-RR-PPP-L storage format",
                code
            )
        })?;
        let aisle = parse_coordinate(&captures[1], "aisle")?;
        let rack = parse_coordinate(&captures[2], "rack")?;
        let position = parse_coordinate(&captures[3], "position")?;
        let level = parse_level(&captures[4])?;
        self.check_grid_bounds(aisle, rack, position, level)?;
        Ok(self.grid_record(code, Some(aisle), Some(rack), Some(position), Some(level)))
    }

    /// Bounds checks with the exceeded bound named in the reason.
    fn check_grid_bounds(
        &self,
        aisle: u32,
        rack: u32,
        position: u32,
        level: char,
    ) -> Result<(), String> {
        let bounds = [
            ("aisle", aisle, self.grammar.aisles),
            ("rack", rack, self.grammar.racks_per_aisle),
            ("position", position, self.grammar.positions_per_rack),
        ];
        for (name, value, max) in bounds {
            if value == 0 {
                return Err(format!("{} 0 is below the minimum of 1", name));
            }
            if value > max {
                return Err(format!(
                    "{} {} exceeds configured maximum of {}",
                    name, value, max
                ));
            }
        }
        self.check_level(level)
    }

    fn check_level(&self, level: char) -> Result<(), String> {
        if self.grammar.level_names.contains(&level) {
            Ok(())
        } else {
            let levels: String = self
                .grammar
                .level_names
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            Err(format!(
                "level '{}' is not one of the configured levels {}",
                level, levels
            ))
        }
    }

    fn grid_record(
        &self,
        code: &str,
        aisle: Option<u32>,
        rack: Option<u32>,
        position: Option<u32>,
        level: Option<char>,
    ) -> LocationRecord {
        // Canonical rendering: drifted inputs of the same physical slot
        // ("1-1-1-A", "01_01_001_a") must resolve to one code.
        let code = match (aisle, rack, position, level) {
            (Some(a), Some(r), Some(p), Some(l)) => format!("{:02}-{:02}-{:03}-{}", a, r, p, l),
            (None, None, Some(p), Some(l)) => format!("{:03}{}", p, l),
            _ => code.trim().to_string(),
        };
        LocationRecord {
            code,
            warehouse_id: self.grammar.warehouse_id.clone(),
            location_type: LocationType::Storage,
            zone: aisle.map(|a| format!("Z{:02}", a)),
            capacity: self.grammar.default_capacity,
            aisle,
            rack,
            position,
            level,
            active: self.grammar.active,
            provenance: Provenance::Virtual,
        }
    }
}

impl LocationResolver for GridResolver<'_> {
    fn resolve(&self, code: &str) -> Option<LocationRecord> {
        self.resolve_detailed(code).ok()
    }
}

/// Parse a numeric coordinate segment.
fn parse_coordinate(text: &str, name: &str) -> Result<u32, String> {
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("{} segment '{}' is not numeric", name, text));
    }
    text.parse::<u32>()
        .map_err(|_| format!("{} segment '{}' is out of range", name, text))
}

/// Parse a single-letter level segment.
fn parse_level(text: &str) -> Result<char, String> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Ok(c.to_ascii_uppercase()),
        _ => Err(format!("level segment '{}' is not a single letter", text)),
    }
}
