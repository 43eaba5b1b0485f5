//! Clinguard core types
//!
//! This crate defines the data model shared by every layer of the protocol
//! evaluation engine:
//!
//! - [`Value`]: runtime value of the logic expression language
//! - [`PatientState`]: point-in-time patient snapshot evaluated by protocols
//! - [`ValidationResult`]: precondition check results for one protocol
//! - [`EvaluationOutcome`]: action or skip decision for one protocol
//! - [`ProtocolSetOutput`]: audit report for a whole protocol batch

pub mod error;
pub mod outcome;
pub mod state;
pub mod value;

pub use error::{StateError, StateResult};
pub use outcome::{
    ActionResult, EvaluationOutcome, ProtocolSetOutput, SkipReason, SkipResult, ValidationResult,
};
pub use state::PatientState;
pub use value::Value;
