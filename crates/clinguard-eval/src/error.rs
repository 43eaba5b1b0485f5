//! Evaluation and configuration errors

use std::path::PathBuf;
use thiserror::Error;

/// Result type for evaluation operations
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors that can occur while evaluating a logic tree.
///
/// These never escape the engine: they are caught and reported as an
/// `evaluation_failed` skip for the offending protocol.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    /// Operand of the wrong type in a typed slot
    #[error("Type mismatch in {operator}: expected {expected}, found {found}")]
    TypeMismatch {
        operator: String,
        expected: String,
        found: String,
    },

    /// Logic tree nested deeper than the configured limit
    #[error("Maximum expression depth {limit} exceeded")]
    DepthLimitExceeded { limit: usize },
}

impl EvalError {
    /// Create a type mismatch error
    pub fn type_mismatch(
        operator: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            operator: operator.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Errors raised while loading or validating an [`crate::EngineConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration document could not be decoded
    #[error("Malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Configuration value out of range
    #[error("Invalid config value for {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

impl ConfigError {
    /// Create an invalid value error
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}
