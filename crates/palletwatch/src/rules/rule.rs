//! Rule definitions and typed condition access.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{PalletwatchError, Result};

fn default_active() -> bool {
    true
}

/// The rule families the engine knows how to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleType {
    /// Pallets sitting too long in the named location types.
    StagnantPallets,
    /// Locations holding more pallets than their capacity.
    Overcapacity,
    /// Pallets on codes the warehouse cannot address.
    InvalidLocation,
    /// Lots whose pallets moved only partially.
    UncoordinatedLots,
    /// Declared location type disagreeing with the derived one.
    LocationMappingError,
}

impl RuleType {
    /// Human-readable label matching the wire form.
    pub fn label(&self) -> &'static str {
        match self {
            RuleType::StagnantPallets => "STAGNANT_PALLETS",
            RuleType::Overcapacity => "OVERCAPACITY",
            RuleType::InvalidLocation => "INVALID_LOCATION",
            RuleType::UncoordinatedLots => "UNCOORDINATED_LOTS",
            RuleType::LocationMappingError => "LOCATION_MAPPING_ERROR",
        }
    }
}

/// Typed parameter bag for a rule.
///
/// Conditions arrive as a JSON object from the rule registry; the accessor
/// methods turn missing or mistyped keys into configuration errors that
/// fail only the owning rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleConditions(Map<String, Value>);

impl RuleConditions {
    /// Empty conditions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter; used by callers assembling rules in code.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Raw access to a parameter.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// A required numeric parameter.
    pub fn require_f64(&self, key: &str) -> Result<f64> {
        match self.0.get(key) {
            None => Err(PalletwatchError::MissingCondition {
                key: key.to_string(),
            }),
            Some(value) => value.as_f64().ok_or_else(|| PalletwatchError::InvalidCondition {
                key: key.to_string(),
                expected: "a number".to_string(),
            }),
        }
    }

    /// A required list-of-strings parameter.
    pub fn require_str_list(&self, key: &str) -> Result<Vec<String>> {
        match self.0.get(key) {
            None => Err(PalletwatchError::MissingCondition {
                key: key.to_string(),
            }),
            Some(value) => str_list(value, key),
        }
    }

    /// An optional numeric parameter.
    pub fn optional_f64(&self, key: &str) -> Result<Option<f64>> {
        match self.0.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_f64()
                .map(Some)
                .ok_or_else(|| PalletwatchError::InvalidCondition {
                    key: key.to_string(),
                    expected: "a number".to_string(),
                }),
        }
    }

    /// An optional list-of-strings parameter.
    pub fn optional_str_list(&self, key: &str) -> Result<Option<Vec<String>>> {
        match self.0.get(key) {
            None => Ok(None),
            Some(value) => str_list(value, key).map(Some),
        }
    }
}

fn str_list(value: &Value, key: &str) -> Result<Vec<String>> {
    let invalid = || PalletwatchError::InvalidCondition {
        key: key.to_string(),
        expected: "a list of strings".to_string(),
    };
    let items = value.as_array().ok_or_else(invalid)?;
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
        .collect()
}

/// One configured rule. Immutable during an evaluation pass; edited
/// externally between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// Unique rule identifier.
    pub id: String,
    /// The evaluator family this rule dispatches to.
    pub rule_type: RuleType,
    /// Display name.
    pub name: String,
    /// Evaluator parameters.
    #[serde(default)]
    pub conditions: RuleConditions,
    /// Evaluation order: higher runs first.
    #[serde(default)]
    pub priority: i32,
    /// Inactive rules are skipped.
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Rule {
    /// Create an active rule with empty conditions and priority 0.
    pub fn new(id: impl Into<String>, rule_type: RuleType, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rule_type,
            name: name.into(),
            conditions: RuleConditions::new(),
            priority: 0,
            active: true,
        }
    }

    /// Set conditions.
    pub fn with_conditions(mut self, conditions: RuleConditions) -> Self {
        self.conditions = conditions;
        self
    }

    /// Set priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// The set of configured rules for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleRegistry {
    /// All configured rules.
    pub rules: Vec<Rule>,
}

impl RuleRegistry {
    /// Create a registry from rules.
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Active rules in descending priority order. Ties keep registry order.
    pub fn active_by_priority(&self) -> Vec<&Rule> {
        let mut active: Vec<&Rule> = self.rules.iter().filter(|r| r.active).collect();
        active.sort_by_key(|r| std::cmp::Reverse(r.priority));
        active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_f64() {
        let conditions = RuleConditions::new().with("time_threshold_hours", 10);
        assert_eq!(conditions.require_f64("time_threshold_hours").unwrap(), 10.0);

        let err = conditions.require_f64("absent").unwrap_err();
        assert!(err.to_string().contains("Missing condition 'absent'"));

        let conditions = RuleConditions::new().with("time_threshold_hours", "ten");
        assert!(conditions.require_f64("time_threshold_hours").is_err());
    }

    #[test]
    fn test_require_str_list() {
        let conditions = RuleConditions::new()
            .with("location_types", serde_json::json!(["RECEIVING", "DOCK"]));
        assert_eq!(
            conditions.require_str_list("location_types").unwrap(),
            vec!["RECEIVING", "DOCK"]
        );

        let conditions = RuleConditions::new().with("location_types", serde_json::json!([1, 2]));
        assert!(conditions.require_str_list("location_types").is_err());
    }

    #[test]
    fn test_optional_accessors() {
        let conditions = RuleConditions::new();
        assert_eq!(conditions.optional_f64("x").unwrap(), None);
        assert_eq!(conditions.optional_str_list("y").unwrap(), None);
    }

    #[test]
    fn test_active_by_priority() {
        let mut low = Rule::new("R1", RuleType::Overcapacity, "low").with_priority(1);
        low.active = true;
        let high = Rule::new("R2", RuleType::StagnantPallets, "high").with_priority(10);
        let mut inactive = Rule::new("R3", RuleType::InvalidLocation, "off").with_priority(99);
        inactive.active = false;

        let registry = RuleRegistry::new(vec![low, high, inactive]);
        let ordered: Vec<&str> = registry
            .active_by_priority()
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ordered, vec!["R2", "R1"]);
    }

    #[test]
    fn test_rule_type_wire_form() {
        let json = serde_json::to_string(&RuleType::StagnantPallets).unwrap();
        assert_eq!(json, "\"STAGNANT_PALLETS\"");
        let parsed: RuleType = serde_json::from_str("\"UNCOORDINATED_LOTS\"").unwrap();
        assert_eq!(parsed, RuleType::UncoordinatedLots);
    }
}
