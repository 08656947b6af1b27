//! Palletwatch: warehouse inventory anomaly engine.
//!
//! Palletwatch scans point-in-time pallet snapshots for operational
//! anomalies: stagnant pallets, overfull locations, codes the warehouse
//! cannot address, lots that moved only partially, and mislabeled
//! location types.
//!
//! # Core Principles
//!
//! - **Compact grammars**: a warehouse's addressable space is described,
//!   never materialized — locations are derived on demand.
//! - **Deterministic**: the same snapshot and registries always produce
//!   the same findings, in the same order.
//! - **Explainable**: every anomaly carries structured evidence and a
//!   description citing the triggering values.
//! - **Isolated failure**: one rule's error never suppresses another
//!   rule's findings.
//!
//! # Example
//!
//! ```no_run
//! use palletwatch::{Palletwatch, WarehouseRegistry, RuleRegistry};
//!
//! # fn registries() -> (WarehouseRegistry, RuleRegistry) { unimplemented!() }
//! let (warehouses, rules) = registries();
//! let engine = Palletwatch::new(warehouses, rules);
//! # let snapshot = unimplemented!();
//! let result = engine.audit(&snapshot).unwrap();
//!
//! println!("Warehouse: {}", result.resolution.warehouse_id);
//! println!("Findings: {}", result.summary.total_anomalies);
//! ```

pub mod context;
pub mod error;
pub mod format;
pub mod grammar;
pub mod location;
pub mod rules;
pub mod snapshot;

mod palletwatch;

pub use crate::palletwatch::{AuditResult, AuditSummary, Palletwatch, SeverityCounts};
pub use context::{ConfidenceLevel, ContextResolution, ContextResolver, WarehouseMatchScore};
pub use error::{PalletwatchError, Result};
pub use format::{FormatDetector, FormatPattern, PatternType, MIN_FORMAT_CONFIDENCE};
pub use grammar::{SpecialArea, WarehouseGrammar, WarehouseRegistry};
pub use location::{
    LocationNormalizer, LocationRecord, LocationType, LocationValidity, VirtualLocationEngine,
    WarehouseSummary,
};
pub use rules::{
    Anomaly, Evidence, Rule, RuleConditions, RuleEngine, RuleEvaluation, RuleRegistry, RuleStatus,
    RuleType, Severity,
};
pub use snapshot::{InventorySnapshot, PalletRecord};
