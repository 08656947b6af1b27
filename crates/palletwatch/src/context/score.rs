//! Match scores and confidence buckets for context resolution.

use serde::{Deserialize, Serialize};

/// Bucketed confidence in a context resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceLevel {
    /// Score at or above 0.8.
    High,
    /// Score at or above 0.5.
    Medium,
    /// Anything below; downstream consumers should treat the resolution
    /// as uncertain.
    Low,
}

impl ConfidenceLevel {
    /// Bucket a coverage score.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            ConfidenceLevel::High
        } else if score >= 0.5 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "HIGH",
            ConfidenceLevel::Medium => "MEDIUM",
            ConfidenceLevel::Low => "LOW",
        }
    }
}

/// How well one warehouse matched a snapshot's locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseMatchScore {
    /// The warehouse scored.
    pub warehouse_id: String,
    /// Total addressable locations registered for the warehouse.
    pub total_locations: u64,
    /// Distinct snapshot codes the warehouse could address.
    pub matching_locations: usize,
    /// Denominator: distinct original snapshot codes. Variants widen the
    /// match search but never inflate the denominator.
    pub distinct_snapshot_locations: usize,
    /// `matching_locations / distinct_snapshot_locations`.
    pub score: f64,
}

/// Outcome of resolving a snapshot's warehouse context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextResolution {
    /// The selected warehouse.
    pub warehouse_id: String,
    /// The winning coverage score.
    pub score: f64,
    /// Bucketed confidence.
    pub confidence: ConfidenceLevel,
    /// True when nothing matched and the designated fallback was returned.
    pub fallback: bool,
    /// Per-warehouse scores, best first.
    pub detailed_scores: Vec<WarehouseMatchScore>,
}

impl ContextResolution {
    /// Whether downstream consumers should tag results as uncertain.
    pub fn is_low_confidence(&self) -> bool {
        self.confidence == ConfidenceLevel::Low
    }
}
