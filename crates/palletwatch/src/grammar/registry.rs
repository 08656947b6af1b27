//! Read-only registry of known warehouses.

use serde::{Deserialize, Serialize};

use crate::error::{PalletwatchError, Result};

use super::warehouse::WarehouseGrammar;

/// All warehouses known to the engine, plus the designated fallback used
/// when context resolution finds no match at all.
///
/// The registry is loaded by the surrounding application at startup and
/// treated as read-only for the duration of an evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseRegistry {
    /// Registered warehouse grammars.
    pub warehouses: Vec<WarehouseGrammar>,
    /// Warehouse to fall back to when nothing matches a snapshot.
    pub fallback_warehouse_id: String,
}

impl WarehouseRegistry {
    /// Create a registry, checking every grammar's invariants, id uniqueness,
    /// and that the fallback id is actually registered.
    pub fn new(warehouses: Vec<WarehouseGrammar>, fallback_warehouse_id: impl Into<String>) -> Result<Self> {
        let registry = Self {
            warehouses,
            fallback_warehouse_id: fallback_warehouse_id.into(),
        };
        registry.validate()?;
        Ok(registry)
    }

    /// Validate all grammars and registry-level invariants. Called by
    /// [`new`](Self::new); deserialized registries should call it explicitly.
    pub fn validate(&self) -> Result<()> {
        for (i, grammar) in self.warehouses.iter().enumerate() {
            grammar.validate()?;
            if self.warehouses[..i]
                .iter()
                .any(|g| g.warehouse_id == grammar.warehouse_id)
            {
                return Err(PalletwatchError::Config(format!(
                    "duplicate warehouse id '{}'",
                    grammar.warehouse_id
                )));
            }
        }
        if self.get(&self.fallback_warehouse_id).is_none() {
            return Err(PalletwatchError::Config(format!(
                "fallback warehouse '{}' is not registered",
                self.fallback_warehouse_id
            )));
        }
        Ok(())
    }

    /// Look up a warehouse by id.
    pub fn get(&self, warehouse_id: &str) -> Option<&WarehouseGrammar> {
        self.warehouses
            .iter()
            .find(|g| g.warehouse_id == warehouse_id)
    }

    /// Look up a warehouse by id, as a typed error on miss.
    pub fn require(&self, warehouse_id: &str) -> Result<&WarehouseGrammar> {
        self.get(warehouse_id)
            .ok_or_else(|| PalletwatchError::UnknownWarehouse(warehouse_id.to_string()))
    }

    /// Warehouses eligible for context resolution.
    pub fn active(&self) -> impl Iterator<Item = &WarehouseGrammar> {
        self.warehouses.iter().filter(|g| g.active)
    }

    /// Number of registered warehouses.
    pub fn len(&self) -> usize {
        self.warehouses.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.warehouses.is_empty()
    }
}
