//! Error types for the Palletwatch library.

use thiserror::Error;

/// Main error type for Palletwatch operations.
#[derive(Debug, Error)]
pub enum PalletwatchError {
    /// A warehouse grammar failed its structural invariants.
    #[error("Invalid grammar for warehouse '{warehouse_id}': {message}")]
    InvalidGrammar {
        warehouse_id: String,
        message: String,
    },

    /// Lookup of a warehouse id that is not in the registry.
    #[error("Unknown warehouse: {0}")]
    UnknownWarehouse(String),

    /// A rule's conditions are missing a required key.
    #[error("Missing condition '{key}'")]
    MissingCondition { key: String },

    /// A rule's conditions carry a value of the wrong type.
    #[error("Condition '{key}' is invalid: expected {expected}")]
    InvalidCondition { key: String, expected: String },

    /// No evaluator is registered for a rule type.
    #[error("No evaluator registered for rule type {0}")]
    UnknownRuleType(String),

    /// Configuration error outside of rule conditions.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// Result type alias for Palletwatch operations.
pub type Result<T> = std::result::Result<T, PalletwatchError>;
