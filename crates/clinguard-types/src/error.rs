//! Errors raised while constructing patient-state snapshots

use thiserror::Error;

/// Result type for patient-state construction
pub type StateResult<T> = Result<T, StateError>;

/// Errors that can occur while building a [`crate::PatientState`]
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StateError {
    /// Extraction confidence outside of `[0, 1]`
    #[error("Confidence {value} is outside of [0, 1]")]
    ConfidenceOutOfRange { value: f64 },

    /// Vital sign name that cannot be addressed by a dot-path
    #[error("Invalid vital name: {name:?}")]
    InvalidVitalName { name: String },
}

impl StateError {
    /// Create a confidence range error
    pub fn confidence_out_of_range(value: f64) -> Self {
        Self::ConfidenceOutOfRange { value }
    }

    /// Create an invalid vital name error
    pub fn invalid_vital_name(name: impl Into<String>) -> Self {
        Self::InvalidVitalName { name: name.into() }
    }
}
