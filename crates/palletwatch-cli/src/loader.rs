//! Snapshot and registry loading.
//!
//! File parsing lives here, in the collaborator layer: the core engine
//! only ever sees structured snapshots and registries.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use palletwatch::{InventorySnapshot, PalletRecord, RuleRegistry, WarehouseRegistry};

/// Provenance metadata for a loaded snapshot file.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Rows loaded into the snapshot.
    pub rows_loaded: usize,
    /// Rows dropped for being unparseable.
    pub rows_malformed: usize,
    /// When the file was loaded.
    pub loaded_at: DateTime<Utc>,
}

/// Load a snapshot CSV.
///
/// Expected columns: `pallet_id,location,created_at` with optional
/// `last_moved_at`, `lot_id`, `receipt_number`, `location_type`.
/// Timestamps are RFC 3339 (a bare `YYYY-MM-DD HH:MM:SS` form is also
/// accepted). Malformed rows are counted and dropped, never fatal.
pub fn load_snapshot(
    path: &Path,
) -> Result<(InventorySnapshot, SnapshotMetadata), Box<dyn std::error::Error>> {
    let contents = fs::read(path)
        .map_err(|e| format!("cannot read snapshot '{}': {}", path.display(), e))?;

    let mut hasher = Sha256::new();
    hasher.update(&contents);
    let hash = format!("sha256:{:x}", hasher.finalize());

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(contents.as_slice());

    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

    let pallet_idx = column("pallet_id")
        .ok_or_else(|| format!("snapshot '{}' has no pallet_id column", path.display()))?;
    let location_idx = column("location")
        .ok_or_else(|| format!("snapshot '{}' has no location column", path.display()))?;
    let created_idx = column("created_at")
        .ok_or_else(|| format!("snapshot '{}' has no created_at column", path.display()))?;
    let moved_idx = column("last_moved_at");
    let lot_idx = column("lot_id");
    let receipt_idx = column("receipt_number");
    let declared_idx = column("location_type");

    let mut records = Vec::new();
    let mut rows_malformed = 0usize;

    for row in reader.records() {
        let Ok(row) = row else {
            rows_malformed += 1;
            continue;
        };
        let field = |idx: usize| row.get(idx).unwrap_or("").trim();

        let Some(created_at) = parse_timestamp(field(created_idx)) else {
            rows_malformed += 1;
            continue;
        };

        let mut record = PalletRecord::new(field(pallet_idx), field(location_idx), created_at);
        if let Some(idx) = moved_idx {
            if let Some(moved_at) = parse_timestamp(field(idx)) {
                record = record.with_last_moved_at(moved_at);
            }
        }
        if let Some(idx) = lot_idx {
            if !field(idx).is_empty() {
                record = record.with_lot_id(field(idx));
            }
        }
        if let Some(idx) = receipt_idx {
            if !field(idx).is_empty() {
                record = record.with_receipt_number(field(idx));
            }
        }
        if let Some(idx) = declared_idx {
            if !field(idx).is_empty() {
                record = record.with_declared_type(field(idx));
            }
        }
        records.push(record);
    }

    let loaded_at = Utc::now();
    let metadata = SnapshotMetadata {
        file: path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
        path: path.to_path_buf(),
        hash,
        size_bytes: contents.len() as u64,
        rows_loaded: records.len(),
        rows_malformed,
        loaded_at,
    };

    Ok((InventorySnapshot::new(loaded_at, records), metadata))
}

/// Parse an RFC 3339 timestamp, accepting the space-separated form too.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if value.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Load and validate a warehouse registry JSON.
pub fn load_warehouses(path: &Path) -> Result<WarehouseRegistry, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("cannot read warehouse registry '{}': {}", path.display(), e))?;
    let registry: WarehouseRegistry = serde_json::from_str(&contents)?;
    registry.validate()?;
    Ok(registry)
}

/// Load a rule registry JSON.
pub fn load_rules(path: &Path) -> Result<RuleRegistry, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("cannot read rule registry '{}': {}", path.display(), e))?;
    let registry: RuleRegistry = serde_json::from_str(&contents)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file
    }

    #[test]
    fn test_load_snapshot_with_optional_columns() {
        let content = "pallet_id,location,created_at,lot_id,location_type\n\
                       P1,01-01-001-A,2024-03-01T08:00:00Z,L1,STORAGE\n\
                       P2,RCV-01,2024-03-01 09:30:00,,RECEIVING\n";
        let file = create_test_file(content);

        let (snapshot, metadata) = load_snapshot(file.path()).unwrap();
        assert_eq!(snapshot.row_count(), 2);
        assert_eq!(metadata.rows_loaded, 2);
        assert_eq!(metadata.rows_malformed, 0);
        assert!(metadata.hash.starts_with("sha256:"));

        assert_eq!(snapshot.records[0].lot_id.as_deref(), Some("L1"));
        assert_eq!(snapshot.records[1].lot_id, None);
        assert_eq!(
            snapshot.records[1].declared_type.as_deref(),
            Some("RECEIVING")
        );
    }

    #[test]
    fn test_malformed_rows_counted_not_fatal() {
        let content = "pallet_id,location,created_at\n\
                       P1,01-01-001-A,2024-03-01T08:00:00Z\n\
                       P2,01-01-002-A,not-a-timestamp\n\
                       P3,01-01-003-A,2024-03-01T09:00:00Z\n";
        let file = create_test_file(content);

        let (snapshot, metadata) = load_snapshot(file.path()).unwrap();
        assert_eq!(snapshot.row_count(), 2);
        assert_eq!(metadata.rows_malformed, 1);
    }

    #[test]
    fn test_missing_required_column_is_an_error() {
        let content = "pallet_id,created_at\nP1,2024-03-01T08:00:00Z\n";
        let file = create_test_file(content);
        let result = load_snapshot(file.path());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("location"));
    }

    #[test]
    fn test_load_registries() {
        let warehouses = serde_json::json!({
            "warehouses": [{
                "warehouse_id": "WH1",
                "name": "Main",
                "aisles": 10,
                "racks_per_aisle": 4,
                "positions_per_rack": 20,
                "level_names": ["A", "B"],
                "default_capacity": 2,
                "special_areas": [{
                    "code": "RCV-01",
                    "area_type": "RECEIVING",
                    "capacity": 50,
                    "zone": "INBOUND"
                }]
            }],
            "fallback_warehouse_id": "WH1"
        });
        let file = create_test_file(&warehouses.to_string());
        let registry = load_warehouses(file.path()).unwrap();
        assert_eq!(registry.len(), 1);

        let rules = serde_json::json!({
            "rules": [{
                "id": "R1",
                "rule_type": "OVERCAPACITY",
                "name": "overfull",
                "priority": 5
            }]
        });
        let file = create_test_file(&rules.to_string());
        let registry = load_rules(file.path()).unwrap();
        assert_eq!(registry.rules.len(), 1);
    }

    #[test]
    fn test_bad_registry_rejected() {
        let warehouses = serde_json::json!({
            "warehouses": [{
                "warehouse_id": "WH1",
                "name": "Main",
                "aisles": 0,
                "racks_per_aisle": 4,
                "positions_per_rack": 20,
                "level_names": ["A"],
                "default_capacity": 2
            }],
            "fallback_warehouse_id": "WH1"
        });
        let file = create_test_file(&warehouses.to_string());
        assert!(load_warehouses(file.path()).is_err());
    }
}
