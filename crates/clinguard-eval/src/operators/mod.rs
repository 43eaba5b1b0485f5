//! Operator implementations
//!
//! - Comparison operators (`>`, `<`, `>=`, `<=`, `==`, `!=`, `between`, `age_between`)
//! - Logical operators (`and`, `or`, `!`, `if`)
//! - Clinical operators (`has_medication`, `has_condition_icd`, `array_contains_any`)
//!
//! The value-level functions are total: malformed input yields `false`.

pub mod clinical;
pub mod comparison;
pub mod logical;

pub use clinical::{array_contains_any, has_condition_icd, has_medication};
pub use comparison::{age_between, between, compare_values};
