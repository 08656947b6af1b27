//! Warehouse grammar: the compact description of an addressable location space.

mod registry;
mod warehouse;

pub use registry::WarehouseRegistry;
pub use warehouse::{SpecialArea, WarehouseGrammar};
