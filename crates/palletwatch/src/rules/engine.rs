//! Rule dispatch and per-rule result collection.

use std::time::Instant;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::context::ContextResolution;
use crate::error::{PalletwatchError, Result};
use crate::grammar::WarehouseGrammar;
use crate::location::{
    LocationNormalizer, LocationRecord, LocationType, LocationValidity, VirtualLocationEngine,
};
use crate::snapshot::InventorySnapshot;

use super::anomaly::Anomaly;
use super::evaluators::default_evaluators;
use super::rule::{Rule, RuleRegistry, RuleType};

/// Lifecycle of one rule within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStatus {
    /// Not yet dispatched.
    Pending,
    /// Currently evaluating.
    Running,
    /// Finished without error.
    Succeeded,
    /// Evaluation error; siblings are unaffected.
    Failed,
}

/// Result of evaluating one rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleEvaluation {
    /// The rule evaluated.
    pub rule_id: String,
    /// The rule family.
    pub rule_type: RuleType,
    /// Final status.
    pub status: RuleStatus,
    /// Findings, deduplicated per pallet.
    pub anomalies: Vec<Anomaly>,
    /// Failure message for `Failed` evaluations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Rows missing required fields, skipped by every evaluator.
    pub rows_skipped: usize,
    /// Wall-clock duration of the evaluation.
    pub execution_time_ms: u64,
}

impl RuleEvaluation {
    /// Whether the evaluation finished without error.
    pub fn succeeded(&self) -> bool {
        self.status == RuleStatus::Succeeded
    }
}

/// Shared, read-only classification state for one evaluation run.
///
/// Location classification happens once per distinct code, before any rule
/// dispatches; evaluators only read the precomputed maps, so they can be
/// fanned out across threads by the caller.
#[derive(Debug)]
pub struct EvaluationContext<'a> {
    /// The resolved warehouse grammar.
    pub warehouse: &'a WarehouseGrammar,
    /// How the warehouse was chosen.
    pub resolution: &'a ContextResolution,
    /// Per-code classification, normalized variants already tried.
    classifications: IndexMap<String, Option<LocationRecord>>,
    /// Per-code validity of the raw (un-normalized) rendering.
    raw_validity: IndexMap<String, LocationValidity>,
}

impl<'a> EvaluationContext<'a> {
    /// Classify every distinct snapshot location against the grammar.
    pub fn build(
        warehouse: &'a WarehouseGrammar,
        resolution: &'a ContextResolution,
        snapshot: &InventorySnapshot,
    ) -> Self {
        let engine = VirtualLocationEngine::new(warehouse);
        let normalizer = LocationNormalizer::for_grammar(warehouse);

        let mut classifications = IndexMap::new();
        let mut raw_validity = IndexMap::new();
        for code in snapshot.distinct_locations() {
            raw_validity.insert(code.clone(), engine.validate(&code));
            let record = engine.resolve_normalized(&normalizer, &code);
            classifications.insert(code, record);
        }

        Self {
            warehouse,
            resolution,
            classifications,
            raw_validity,
        }
    }

    /// The classification for a (trimmed) code, when any variant resolved.
    pub fn classify(&self, code: &str) -> Option<&LocationRecord> {
        self.classifications.get(code.trim())?.as_ref()
    }

    /// The derived location type for a code; `Unknown` when unresolvable.
    pub fn location_type(&self, code: &str) -> LocationType {
        self.classify(code)
            .map(|record| record.location_type)
            .unwrap_or(LocationType::Unknown)
    }

    /// Validity of the raw rendering, with its failure reason.
    pub fn raw_validity(&self, code: &str) -> Option<&LocationValidity> {
        self.raw_validity.get(code.trim())
    }
}

/// One capability: scan the snapshot for a rule's anomalies.
///
/// Evaluators are read-only over the snapshot and context; a registry maps
/// each [`RuleType`] to its evaluator, so new families plug in without
/// touching dispatch.
pub trait RuleEvaluator: Send + Sync {
    /// Evaluate the rule. Configuration errors fail the rule; data errors
    /// are handled by skipping rows, never by failing.
    fn evaluate(
        &self,
        rule: &Rule,
        snapshot: &InventorySnapshot,
        ctx: &EvaluationContext,
    ) -> Result<Vec<Anomaly>>;
}

/// Dispatches active rules to their evaluators and collects per-rule
/// results. One rule's failure never aborts its siblings.
pub struct RuleEngine {
    evaluators: IndexMap<RuleType, Box<dyn RuleEvaluator>>,
}

impl RuleEngine {
    /// Engine with the built-in evaluator for every rule family.
    pub fn new() -> Self {
        Self {
            evaluators: default_evaluators(),
        }
    }

    /// Register (or replace) the evaluator for a rule family.
    pub fn register(&mut self, rule_type: RuleType, evaluator: Box<dyn RuleEvaluator>) {
        self.evaluators.insert(rule_type, evaluator);
    }

    /// Evaluate a single rule against the snapshot.
    pub fn evaluate_rule(
        &self,
        rule: &Rule,
        snapshot: &InventorySnapshot,
        ctx: &EvaluationContext,
    ) -> RuleEvaluation {
        let started = Instant::now();
        let rows_skipped = snapshot.incomplete_count();

        let outcome = match self.evaluators.get(&rule.rule_type) {
            Some(evaluator) => evaluator.evaluate(rule, snapshot, ctx),
            None => Err(PalletwatchError::UnknownRuleType(
                rule.rule_type.label().to_string(),
            )),
        };

        let execution_time_ms = started.elapsed().as_millis() as u64;
        match outcome {
            Ok(anomalies) => RuleEvaluation {
                rule_id: rule.id.clone(),
                rule_type: rule.rule_type,
                status: RuleStatus::Succeeded,
                anomalies: dedup_by_pallet(anomalies),
                error: None,
                rows_skipped,
                execution_time_ms,
            },
            Err(error) => RuleEvaluation {
                rule_id: rule.id.clone(),
                rule_type: rule.rule_type,
                status: RuleStatus::Failed,
                anomalies: Vec::new(),
                error: Some(error.to_string()),
                rows_skipped,
                execution_time_ms,
            },
        }
    }

    /// Evaluate every active rule in descending priority order.
    pub fn evaluate_all(
        &self,
        rules: &RuleRegistry,
        snapshot: &InventorySnapshot,
        ctx: &EvaluationContext,
    ) -> Vec<RuleEvaluation> {
        rules
            .active_by_priority()
            .into_iter()
            .map(|rule| self.evaluate_rule(rule, snapshot, ctx))
            .collect()
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Suppress duplicate (pallet, rule) pairs within one evaluation, keeping
/// the first finding per pallet. Cross-rule duplicates are intentional.
fn dedup_by_pallet(anomalies: Vec<Anomaly>) -> Vec<Anomaly> {
    let mut seen: IndexSet<String> = IndexSet::new();
    anomalies
        .into_iter()
        .filter(|anomaly| seen.insert(anomaly.pallet_id.clone()))
        .collect()
}
