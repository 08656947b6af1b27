//! Anomaly records produced by rule evaluators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::rule::{Rule, RuleType};

/// Severity of an anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational only.
    Info,
    /// Should be reviewed.
    Warning,
    /// Needs operational action.
    Critical,
}

impl Severity {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Critical => "Critical",
        }
    }
}

/// Structured evidence attached to an anomaly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Evidence {
    /// The observed value that triggered the rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed: Option<Value>,
    /// What the rule expected instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    /// The configured threshold, where one applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    /// A count backing the finding (pallets in a location, lot size).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    /// Elapsed hours, for time-based rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_hours: Option<f64>,
    /// Why validation failed, for location rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Related pallet ids, capped by the evaluator.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub sample_pallets: Vec<String>,
}

impl Evidence {
    /// Create empty evidence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the observed value.
    pub fn with_observed(mut self, observed: impl Into<Value>) -> Self {
        self.observed = Some(observed.into());
        self
    }

    /// Set the expected value.
    pub fn with_expected(mut self, expected: impl Into<Value>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Set the threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Set the backing count.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Set elapsed hours.
    pub fn with_elapsed_hours(mut self, hours: f64) -> Self {
        self.elapsed_hours = Some(hours);
        self
    }

    /// Set the validation failure reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Set related pallet ids.
    pub fn with_sample_pallets(mut self, pallets: Vec<String>) -> Self {
        self.sample_pallets = pallets;
        self
    }
}

/// One detected anomaly. Produced fresh per evaluation, never mutated
/// after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anomaly {
    /// Engine-assigned identifier.
    pub id: String,
    /// The pallet the finding is about.
    pub pallet_id: String,
    /// The rule that produced the finding.
    pub rule_id: String,
    /// The rule family.
    pub rule_type: RuleType,
    /// The raw location code from the snapshot row.
    pub location: String,
    /// Severity.
    pub severity: Severity,
    /// Human-readable description citing the triggering values.
    pub description: String,
    /// Structured evidence.
    pub evidence: Evidence,
    /// When the finding was produced.
    pub detected_at: DateTime<Utc>,
}

impl Anomaly {
    /// Create an anomaly for a rule.
    pub fn new(
        rule: &Rule,
        pallet_id: impl Into<String>,
        location: impl Into<String>,
        severity: Severity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: generate_anomaly_id(),
            pallet_id: pallet_id.into(),
            rule_id: rule.id.clone(),
            rule_type: rule.rule_type,
            location: location.into(),
            severity,
            description: description.into(),
            evidence: Evidence::new(),
            detected_at: Utc::now(),
        }
    }

    /// Attach evidence.
    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence = evidence;
        self
    }
}

/// Generate a unique anomaly id.
fn generate_anomaly_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    format!("anom_{:03}", COUNTER.fetch_add(1, Ordering::SeqCst))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_anomaly() {
        let rule = Rule::new("R1", RuleType::Overcapacity, "overfull");
        let anomaly = Anomaly::new(
            &rule,
            "P1",
            "01-01-001-A",
            Severity::Critical,
            "Location '01-01-001-A' holds 3 pallets, capacity 1",
        )
        .with_evidence(Evidence::new().with_count(3).with_expected(1));

        assert!(anomaly.id.starts_with("anom_"));
        assert_eq!(anomaly.rule_id, "R1");
        assert_eq!(anomaly.rule_type, RuleType::Overcapacity);
        assert_eq!(anomaly.evidence.count, Some(3));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Critical);
    }

    #[test]
    fn test_ids_unique() {
        let rule = Rule::new("R1", RuleType::InvalidLocation, "invalid");
        let a = Anomaly::new(&rule, "P1", "X", Severity::Warning, "first");
        let b = Anomaly::new(&rule, "P2", "Y", Severity::Warning, "second");
        assert_ne!(a.id, b.id);
    }
}
