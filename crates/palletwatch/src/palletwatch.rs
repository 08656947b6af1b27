//! Main Palletwatch struct and public API.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::context::{ContextResolution, ContextResolver};
use crate::error::Result;
use crate::grammar::WarehouseRegistry;
use crate::location::{
    LocationRecord, LocationValidity, VirtualLocationEngine, WarehouseSummary,
};
use crate::rules::{
    EvaluationContext, RuleEngine, RuleEvaluation, RuleEvaluator, RuleRegistry, RuleType, Severity,
};
use crate::snapshot::InventorySnapshot;

/// Result of auditing one snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResult {
    /// How the warehouse context was resolved.
    pub resolution: ContextResolution,
    /// True when the resolution confidence was LOW; consumers should warn
    /// that classifications may belong to the wrong layout.
    pub low_confidence: bool,
    /// Per-rule results, in evaluation (priority) order.
    pub rule_results: Vec<RuleEvaluation>,
    /// Aggregate statistics.
    pub summary: AuditSummary,
}

impl AuditResult {
    /// All anomalies across rules, in evaluation order.
    pub fn anomalies(&self) -> impl Iterator<Item = &crate::rules::Anomaly> {
        self.rule_results.iter().flat_map(|r| r.anomalies.iter())
    }
}

/// Aggregate statistics for one audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSummary {
    /// Rules dispatched.
    pub total_rules: usize,
    /// Rules that finished without error.
    pub rules_succeeded: usize,
    /// Rules that failed; their errors are on the per-rule results.
    pub rules_failed: usize,
    /// Findings across all rules.
    pub total_anomalies: usize,
    /// Findings by severity.
    pub anomalies_by_severity: SeverityCounts,
    /// Findings by rule type label.
    pub anomalies_by_rule_type: IndexMap<String, usize>,
    /// Distinct pallets flagged by at least one rule.
    pub distinct_pallets_flagged: usize,
    /// Rows skipped for missing required fields.
    pub rows_skipped: usize,
    /// Snapshot health score, 0.0 (bad) to 1.0 (clean).
    pub health_score: f64,
    /// One-line recommendation.
    pub recommendation: String,
}

/// Counts of anomalies by severity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
}

/// The main inventory analysis engine.
///
/// Owns the read-only warehouse and rule registries for its lifetime; the
/// surrounding application loads them at startup and rebuilds the engine
/// when they change.
pub struct Palletwatch {
    warehouses: WarehouseRegistry,
    rules: RuleRegistry,
    engine: RuleEngine,
}

impl Palletwatch {
    /// Create an engine over loaded registries.
    pub fn new(warehouses: WarehouseRegistry, rules: RuleRegistry) -> Self {
        Self {
            warehouses,
            rules,
            engine: RuleEngine::new(),
        }
    }

    /// The warehouse registry in use.
    pub fn warehouses(&self) -> &WarehouseRegistry {
        &self.warehouses
    }

    /// The rule registry in use.
    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }

    /// Replace the evaluator for a rule family.
    pub fn register_evaluator(&mut self, rule_type: RuleType, evaluator: Box<dyn RuleEvaluator>) {
        self.engine.register(rule_type, evaluator);
    }

    /// Resolve which warehouse a snapshot belongs to.
    pub fn detect_context(&self, snapshot: &InventorySnapshot) -> ContextResolution {
        ContextResolver::new(&self.warehouses).detect(&snapshot.distinct_locations())
    }

    /// Run every active rule against a snapshot.
    ///
    /// Context resolution happens once and is shared by all rules. A LOW
    /// confidence resolution does not stop the run; it tags the result.
    pub fn audit(&self, snapshot: &InventorySnapshot) -> Result<AuditResult> {
        let resolution = self.detect_context(snapshot);
        let warehouse = self.warehouses.require(&resolution.warehouse_id)?;
        let ctx = EvaluationContext::build(warehouse, &resolution, snapshot);

        let rule_results = self.engine.evaluate_all(&self.rules, snapshot, &ctx);
        let summary = self.compute_summary(snapshot, &rule_results);

        Ok(AuditResult {
            low_confidence: resolution.is_low_confidence(),
            resolution,
            rule_results,
            summary,
        })
    }

    /// Evaluate one rule in isolation, resolving context on the fly.
    pub fn evaluate_rule(
        &self,
        rule: &crate::rules::Rule,
        snapshot: &InventorySnapshot,
    ) -> Result<RuleEvaluation> {
        let resolution = self.detect_context(snapshot);
        let warehouse = self.warehouses.require(&resolution.warehouse_id)?;
        let ctx = EvaluationContext::build(warehouse, &resolution, snapshot);
        Ok(self.engine.evaluate_rule(rule, snapshot, &ctx))
    }

    /// Validate a single location code against a warehouse, for
    /// diagnostics and admin tooling.
    pub fn validate_location(&self, warehouse_id: &str, code: &str) -> Result<LocationValidity> {
        let warehouse = self.warehouses.require(warehouse_id)?;
        Ok(VirtualLocationEngine::new(warehouse).validate(code))
    }

    /// Full derived attributes for a location code.
    pub fn location_properties(
        &self,
        warehouse_id: &str,
        code: &str,
    ) -> Result<Option<LocationRecord>> {
        let warehouse = self.warehouses.require(warehouse_id)?;
        Ok(VirtualLocationEngine::new(warehouse).resolve(code))
    }

    /// Aggregate counts for a warehouse.
    pub fn warehouse_summary(&self, warehouse_id: &str) -> Result<WarehouseSummary> {
        let warehouse = self.warehouses.require(warehouse_id)?;
        Ok(VirtualLocationEngine::new(warehouse).summary())
    }

    /// Compute aggregate statistics from per-rule results.
    fn compute_summary(
        &self,
        snapshot: &InventorySnapshot,
        rule_results: &[RuleEvaluation],
    ) -> AuditSummary {
        let total_rules = rule_results.len();
        let rules_succeeded = rule_results.iter().filter(|r| r.succeeded()).count();
        let rules_failed = total_rules - rules_succeeded;

        let mut anomalies_by_severity = SeverityCounts::default();
        let mut anomalies_by_rule_type: IndexMap<String, usize> = IndexMap::new();
        let mut flagged: IndexSet<&str> = IndexSet::new();
        let mut total_anomalies = 0usize;

        for result in rule_results {
            for anomaly in &result.anomalies {
                total_anomalies += 1;
                match anomaly.severity {
                    Severity::Critical => anomalies_by_severity.critical += 1,
                    Severity::Warning => anomalies_by_severity.warning += 1,
                    Severity::Info => anomalies_by_severity.info += 1,
                }
                *anomalies_by_rule_type
                    .entry(anomaly.rule_type.label().to_string())
                    .or_insert(0) += 1;
                flagged.insert(anomaly.pallet_id.as_str());
            }
        }

        let rows_skipped = snapshot.incomplete_count();
        let health_score = self.calculate_health_score(
            snapshot.complete_records().count(),
            flagged.len(),
            &anomalies_by_severity,
        );
        let recommendation =
            self.generate_recommendation(rules_failed, &anomalies_by_severity, health_score);

        AuditSummary {
            total_rules,
            rules_succeeded,
            rules_failed,
            total_anomalies,
            anomalies_by_severity,
            anomalies_by_rule_type,
            distinct_pallets_flagged: flagged.len(),
            rows_skipped,
            health_score,
            recommendation,
        }
    }

    /// Score the snapshot's operational health.
    fn calculate_health_score(
        &self,
        total_pallets: usize,
        flagged_pallets: usize,
        severity_counts: &SeverityCounts,
    ) -> f64 {
        if total_pallets == 0 {
            return 1.0;
        }

        // Base score from the fraction of clean pallets.
        let pallet_score = 1.0 - (flagged_pallets as f64 / total_pallets as f64);

        // Penalty for severity.
        let critical_penalty = severity_counts.critical as f64 * 0.02;
        let warning_penalty = severity_counts.warning as f64 * 0.005;
        let total_penalty = (critical_penalty + warning_penalty).min(0.5);

        (pallet_score - total_penalty).clamp(0.0, 1.0)
    }

    /// Generate a recommendation line for the audit.
    fn generate_recommendation(
        &self,
        rules_failed: usize,
        severity_counts: &SeverityCounts,
        health_score: f64,
    ) -> String {
        if rules_failed > 0 {
            format!(
                "{} rule(s) failed to evaluate; fix their configuration and rerun.",
                rules_failed
            )
        } else if severity_counts.critical > 0 {
            format!(
                "Address {} critical finding(s) before the next receiving cycle.",
                severity_counts.critical
            )
        } else if severity_counts.warning > 5 {
            format!(
                "Review {} warnings to improve warehouse health (score: {:.0}%).",
                severity_counts.warning,
                health_score * 100.0
            )
        } else if health_score >= 0.9 {
            "Inventory looks healthy. Minor findings for review.".to_string()
        } else {
            "Inventory health needs attention. Review all findings.".to_string()
        }
    }
}
