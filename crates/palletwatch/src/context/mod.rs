//! Warehouse context resolution.
//!
//! Decides which registered warehouse layout an inventory snapshot belongs
//! to by scoring every warehouse on how many of the snapshot's distinct
//! location codes it can address.

mod resolver;
mod score;

pub use resolver::ContextResolver;
pub use score::{ConfidenceLevel, ContextResolution, WarehouseMatchScore};
