//! Location modeling: classification, validation, and normalization.
//!
//! A warehouse's bulk storage grid is never materialized. The
//! [`VirtualLocationEngine`] derives a [`LocationRecord`] for any code on
//! demand from the grammar, while persisted special areas resolve through
//! the same [`LocationResolver`] contract, so consumers never see which
//! provenance produced a record.

mod engine;
mod normalize;
mod record;
mod resolver;

pub use engine::{VirtualLocationEngine, WarehouseSummary};
pub use normalize::LocationNormalizer;
pub use record::{LocationRecord, LocationType, LocationValidity, Provenance};
pub use resolver::{GridResolver, LocationResolver, SpecialAreaResolver};
