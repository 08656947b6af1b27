//! Location-code format inference.
//!
//! A [`FormatDetector`] learns a structural pattern (segment kinds, lengths,
//! separators) from a handful of example location codes. The resulting
//! [`FormatPattern`] carries a confidence score; the virtual location engine
//! only consults patterns at or above [`MIN_FORMAT_CONFIDENCE`].

mod detector;
mod pattern;

pub use detector::FormatDetector;
pub use pattern::{FormatPattern, PatternType, Segment, SegmentKind};

/// Minimum confidence at which a detected format replaces the default
/// aisle-rack-position-level grammar during validation.
pub const MIN_FORMAT_CONFIDENCE: f64 = 0.6;
