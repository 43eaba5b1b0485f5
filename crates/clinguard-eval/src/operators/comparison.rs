//! Comparison Operators
//!
//! Implements: `>`, `<`, `>=`, `<=`, `==`, `!=`, `between`, `age_between`.
//!
//! Comparisons always produce a Boolean. Two operands that both read as
//! numbers (numeric strings included) compare numerically; two strings
//! otherwise compare ordinally. Any other pairing is `false` for ordering
//! operators, and `!=` is always the negation of `==`.

use crate::context::EvaluationContext;
use crate::engine::ProtocolEngine;
use crate::error::EvalResult;
use clinguard_logic::{ComparisonOp, Expression};
use clinguard_types::Value;
use std::cmp::Ordering;

/// Inclusive numeric range check: `low <= value <= high`.
///
/// Non-numeric operands and an inverted range yield `false`.
pub fn between(value: &Value, low: &Value, high: &Value) -> bool {
    match (value.as_number(), low.as_number(), high.as_number()) {
        (Some(v), Some(lo), Some(hi)) => lo <= v && v <= hi,
        _ => false,
    }
}

/// Age range check, identical to [`between`]
pub fn age_between(age: &Value, low: &Value, high: &Value) -> bool {
    between(age, low, high)
}

/// Compare two values with the given operator
pub fn compare_values(op: ComparisonOp, left: &Value, right: &Value) -> bool {
    match op {
        ComparisonOp::Equal => equals(left, right),
        ComparisonOp::NotEqual => !equals(left, right),
        ComparisonOp::Greater => ordering(left, right).is_some_and(Ordering::is_gt),
        ComparisonOp::Less => ordering(left, right).is_some_and(Ordering::is_lt),
        ComparisonOp::GreaterOrEqual => ordering(left, right).is_some_and(Ordering::is_ge),
        ComparisonOp::LessOrEqual => ordering(left, right).is_some_and(Ordering::is_le),
    }
}

fn ordering(left: &Value, right: &Value) -> Option<Ordering> {
    if let (Some(l), Some(r)) = (left.as_number(), right.as_number()) {
        return l.partial_cmp(&r);
    }
    match (left, right) {
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        _ => None,
    }
}

fn equals(left: &Value, right: &Value) -> bool {
    if let (Some(l), Some(r)) = (left.as_number(), right.as_number()) {
        return l == r;
    }
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Boolean(l), Value::Boolean(r)) => l == r,
        (Value::String(l), Value::String(r)) => l == r,
        (Value::List(l), Value::List(r)) => {
            l.len() == r.len() && l.iter().zip(r).all(|(a, b)| equals(a, b))
        }
        _ => false,
    }
}

impl ProtocolEngine {
    /// Evaluate a binary comparison
    pub(crate) fn eval_compare(
        &self,
        op: ComparisonOp,
        left: &Expression,
        right: &Expression,
        ctx: &EvaluationContext,
        depth: usize,
    ) -> EvalResult<Value> {
        let left = self.eval(left, ctx, depth)?;
        let right = self.eval(right, ctx, depth)?;
        Ok(Value::Boolean(compare_values(op, &left, &right)))
    }
}
