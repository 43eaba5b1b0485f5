//! Load-time errors for protocol logic

use crate::operator::{Arity, OperatorKind};
use thiserror::Error;

/// Result type for loading logic and protocols
pub type LogicResult<T> = Result<T, LogicError>;

/// Errors that can occur while resolving logic JSON into an [`crate::Expression`]
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LogicError {
    /// Operator name not present in the operator table
    #[error("Unknown operator: {name}")]
    UnknownOperator { name: String },

    /// Operator applied to the wrong number of arguments
    #[error("Operator '{operator}' expects {expected} arguments, found {found}")]
    Arity {
        operator: OperatorKind,
        expected: Arity,
        found: usize,
    },

    /// `var` node without a usable path
    #[error("Invalid variable reference: {message}")]
    InvalidVariable { message: String },

    /// JSON that is not a valid logic node
    #[error("Invalid logic node: {message}")]
    InvalidShape { message: String },

    /// Operator table registration conflict
    #[error("Operator name '{name}' is already registered")]
    DuplicateOperator { name: String },

    /// Protocol document that could not be decoded
    #[error("Invalid protocol: {message}")]
    InvalidProtocol { message: String },
}

impl LogicError {
    /// Create an unknown operator error
    pub fn unknown_operator(name: impl Into<String>) -> Self {
        Self::UnknownOperator { name: name.into() }
    }

    /// Create an arity error
    pub fn arity(operator: OperatorKind, found: usize) -> Self {
        Self::Arity {
            operator,
            expected: operator.arity(),
            found,
        }
    }

    /// Create an invalid variable error
    pub fn invalid_variable(message: impl Into<String>) -> Self {
        Self::InvalidVariable {
            message: message.into(),
        }
    }

    /// Create an invalid shape error
    pub fn invalid_shape(message: impl Into<String>) -> Self {
        Self::InvalidShape {
            message: message.into(),
        }
    }

    /// Create an invalid protocol error
    pub fn invalid_protocol(message: impl Into<String>) -> Self {
        Self::InvalidProtocol {
            message: message.into(),
        }
    }
}
