//! Protocol logic model
//!
//! This crate defines how clinical protocols are represented once loaded:
//!
//! - [`Expression`]: owned recursive logic tree (conditionals, boolean
//!   combinators, comparisons, variable lookups, domain operators)
//! - [`Operator`]: closed set of domain operators with typed argument slots
//! - [`OperatorTable`]: immutable name table used to resolve operators when
//!   logic is loaded
//! - [`ClinicalProtocolRule`]: a versioned protocol with preconditions
//!
//! Logic is authored as JsonLogic-style JSON and resolved at load time, so an
//! unknown operator or a wrong argument count is a [`LogicError`] rather than
//! an evaluation-time surprise.
//!
//! # Example
//!
//! ```
//! use clinguard_logic::{Expression, OperatorTable};
//! use serde_json::json;
//!
//! let logic = json!({"if": [{">": [{"var": "a1c"}, 6.5]}, "refer_endocrinology", "no_action"]});
//! let expr = Expression::from_json(&logic, &OperatorTable::standard()).unwrap();
//! assert_eq!(expr.to_json(), logic);
//! ```

pub mod error;
pub mod expression;
pub mod loader;
pub mod operator;
pub mod protocol;
pub mod table;

pub use error::{LogicError, LogicResult};
pub use expression::Expression;
pub use operator::{Arity, ComparisonOp, Operator, OperatorKind};
pub use protocol::{
    ClinicalProtocolRule, ProtocolEntry, ProtocolMetadata, RejectedProtocol, ValidationRules,
};
pub use table::{OperatorTable, OperatorTableBuilder};
