//! Inventory snapshot input types.

mod record;

pub use record::{InventorySnapshot, PalletRecord};
