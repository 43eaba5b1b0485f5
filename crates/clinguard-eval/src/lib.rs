//! Clinical Protocol Evaluation Engine
//!
//! This crate evaluates clinical protocols against a patient-state snapshot.
//! From leaf to root:
//!
//! - **Operators**: pure predicates (`between`, `has_medication`,
//!   `has_condition_icd`, `age_between`, `array_contains_any`) and comparisons
//! - **Expression evaluation**: recursive interpretation of a logic tree
//!   against a flattened [`EvaluationContext`]
//! - **Validation**: confidence, staleness and required-field gates
//! - **Rule evaluation**: validation + logic → [`EvaluationOutcome`]
//! - **Aggregation**: an ordered protocol batch → [`ProtocolSetOutput`]
//!
//! # Example
//!
//! ```
//! use clinguard_eval::ProtocolEngine;
//! use clinguard_logic::ClinicalProtocolRule;
//! use clinguard_types::PatientState;
//! use chrono::Utc;
//!
//! let protocol: ClinicalProtocolRule = serde_json::from_value(serde_json::json!({
//!     "ruleId": "dm-a1c-001",
//!     "name": "Elevated A1c referral",
//!     "logic": {"if": [{">": [{"var": "a1c"}, 6.5]}, "refer_endocrinology", "no_action"]},
//!     "validation": {"minConfidence": 0.85}
//! })).unwrap();
//!
//! let state = PatientState::new(0.95, Utc::now()).unwrap().with_vital("a1c", 7.5).unwrap();
//! let output = ProtocolEngine::new().evaluate_protocols(&state, &[protocol]);
//! assert_eq!(output.actions[0].action, "refer_endocrinology");
//! ```
//!
//! # Failure isolation
//!
//! Evaluation never panics and never returns an error for a well-typed
//! input. A protocol whose logic cannot be evaluated is reported as a skip
//! with reason `evaluation_failed`; the rest of the batch is unaffected.

pub mod aggregate;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod operators;
pub mod rule;
pub mod validator;

pub use config::{ActionPolicy, EngineConfig};
pub use context::EvaluationContext;
pub use engine::{EvalOutcome, ProtocolEngine};
pub use error::{ConfigError, EvalError, EvalResult};
pub use validator::validate_at;

pub use clinguard_types::{
    ActionResult, EvaluationOutcome, ProtocolSetOutput, SkipReason, SkipResult, ValidationResult,
};

pub use operators::{
    age_between, array_contains_any, between, compare_values, has_condition_icd, has_medication,
};
