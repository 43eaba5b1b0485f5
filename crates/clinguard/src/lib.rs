//! Clinical protocol rule evaluation
//!
//! Evaluates versioned clinical protocols against an AI-extracted patient
//! snapshot and produces an auditable report of triggered actions and skipped
//! rules. This crate ties together:
//! - Patient-state and outcome types ([`types`])
//! - The protocol logic language and loader ([`logic`])
//! - The evaluation engine ([`eval`])
//! - Protocol builders for authoring rules in code ([`builder`])
//!
//! # Example
//!
//! ```
//! use clinguard::builder::threshold_protocol;
//! use clinguard::{ComparisonOp, PatientState, ProtocolEngine};
//! use chrono::Utc;
//!
//! let protocol = threshold_protocol(
//!     "dm-a1c-001",
//!     "Elevated A1c referral",
//!     "vitals.a1c",
//!     ComparisonOp::Greater,
//!     6.5,
//!     "refer_endocrinology",
//! )
//! .min_confidence(0.85)
//! .build()
//! .unwrap();
//!
//! let state = PatientState::new(0.95, Utc::now()).unwrap().with_vital("a1c", 7.5).unwrap();
//! let output = ProtocolEngine::new().evaluate_protocols(&state, [&protocol]);
//! assert!(output.is_triggered("dm-a1c-001"));
//! ```

// Re-export all public APIs from internal crates
pub use clinguard_eval as eval;
pub use clinguard_logic as logic;
pub use clinguard_types as types;

// Convenience re-exports
pub use clinguard_eval::{ActionPolicy, EngineConfig, EvaluationContext, ProtocolEngine};
pub use clinguard_logic::{ClinicalProtocolRule, ComparisonOp, Expression, OperatorTable};
pub use clinguard_types::{
    ActionResult, EvaluationOutcome, PatientState, ProtocolSetOutput, SkipReason, SkipResult,
    ValidationResult, Value,
};

pub mod builder;

// CLI module (only available with cli feature)
#[cfg(feature = "cli")]
pub mod cli;
