//! Pallet records and the snapshot container.

use chrono::{DateTime, Duration, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// One pallet row from an inventory extract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PalletRecord {
    /// Pallet identifier (license plate / SSCC).
    pub pallet_id: String,
    /// Raw location code as it appeared in the extract.
    pub location: String,
    /// When the pallet record was created.
    pub created_at: DateTime<Utc>,
    /// When the pallet was last moved, if the extract carries it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_moved_at: Option<DateTime<Utc>>,
    /// Lot identifier, for lot-coordination rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lot_id: Option<String>,
    /// Receipt number, used as the lot key when `lot_id` is absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_number: Option<String>,
    /// Location type declared by the exporting system, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<String>,
}

impl PalletRecord {
    /// Create a record with the required fields.
    pub fn new(
        pallet_id: impl Into<String>,
        location: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            pallet_id: pallet_id.into(),
            location: location.into(),
            created_at,
            last_moved_at: None,
            lot_id: None,
            receipt_number: None,
            declared_type: None,
        }
    }

    /// Set the last-moved timestamp.
    pub fn with_last_moved_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_moved_at = Some(at);
        self
    }

    /// Set the lot identifier.
    pub fn with_lot_id(mut self, lot_id: impl Into<String>) -> Self {
        self.lot_id = Some(lot_id.into());
        self
    }

    /// Set the receipt number.
    pub fn with_receipt_number(mut self, receipt: impl Into<String>) -> Self {
        self.receipt_number = Some(receipt.into());
        self
    }

    /// Set the declared location type.
    pub fn with_declared_type(mut self, declared: impl Into<String>) -> Self {
        self.declared_type = Some(declared.into());
        self
    }

    /// Age of the pallet at the given instant, measured from the last move
    /// when known, otherwise from creation.
    pub fn age_at(&self, instant: DateTime<Utc>) -> Duration {
        instant - self.last_moved_at.unwrap_or(self.created_at)
    }

    /// The grouping key for lot-coordination rules.
    pub fn lot_key(&self) -> Option<&str> {
        self.lot_id
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.receipt_number.as_deref().filter(|s| !s.trim().is_empty()))
    }

    /// Whether the row carries the fields every evaluator needs.
    /// Rows failing this are skipped and counted, never fatal.
    pub fn is_complete(&self) -> bool {
        !self.pallet_id.trim().is_empty() && !self.location.trim().is_empty()
    }
}

/// A point-in-time inventory extract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySnapshot {
    /// When the extract was produced. All age computations use this instant
    /// so a rerun over the same snapshot is reproducible.
    pub taken_at: DateTime<Utc>,
    /// Pallet rows, in extract order.
    pub records: Vec<PalletRecord>,
}

impl InventorySnapshot {
    /// Create a snapshot from records.
    pub fn new(taken_at: DateTime<Utc>, records: Vec<PalletRecord>) -> Self {
        Self { taken_at, records }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    /// Rows that carry all required fields.
    pub fn complete_records(&self) -> impl Iterator<Item = &PalletRecord> {
        self.records.iter().filter(|r| r.is_complete())
    }

    /// Number of rows missing required fields.
    pub fn incomplete_count(&self) -> usize {
        self.records.iter().filter(|r| !r.is_complete()).count()
    }

    /// Distinct trimmed location codes, in first-seen order.
    pub fn distinct_locations(&self) -> IndexSet<String> {
        self.complete_records()
            .map(|r| r.location.trim().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, h, 0, 0).unwrap()
    }

    #[test]
    fn test_age_uses_last_move_when_present() {
        let record = PalletRecord::new("P1", "01-01-001-A", ts(0)).with_last_moved_at(ts(6));
        assert_eq!(record.age_at(ts(10)).num_hours(), 4);
    }

    #[test]
    fn test_age_falls_back_to_creation() {
        let record = PalletRecord::new("P1", "01-01-001-A", ts(0));
        assert_eq!(record.age_at(ts(10)).num_hours(), 10);
    }

    #[test]
    fn test_lot_key_prefers_lot_id() {
        let record = PalletRecord::new("P1", "RCV-01", ts(0))
            .with_lot_id("L100")
            .with_receipt_number("R200");
        assert_eq!(record.lot_key(), Some("L100"));

        let record = PalletRecord::new("P2", "RCV-01", ts(0)).with_receipt_number("R200");
        assert_eq!(record.lot_key(), Some("R200"));
    }

    #[test]
    fn test_incomplete_rows_filtered() {
        let snapshot = InventorySnapshot::new(
            ts(12),
            vec![
                PalletRecord::new("P1", "01-01-001-A", ts(0)),
                PalletRecord::new("", "01-01-002-A", ts(0)),
                PalletRecord::new("P3", "  ", ts(0)),
            ],
        );
        assert_eq!(snapshot.row_count(), 3);
        assert_eq!(snapshot.complete_records().count(), 1);
        assert_eq!(snapshot.incomplete_count(), 2);
    }

    #[test]
    fn test_distinct_locations_trimmed_and_ordered() {
        let snapshot = InventorySnapshot::new(
            ts(12),
            vec![
                PalletRecord::new("P1", " 01-01-001-A ", ts(0)),
                PalletRecord::new("P2", "RCV-01", ts(0)),
                PalletRecord::new("P3", "01-01-001-A", ts(0)),
            ],
        );
        let locations: Vec<_> = snapshot.distinct_locations().into_iter().collect();
        assert_eq!(locations, vec!["01-01-001-A", "RCV-01"]);
    }
}
