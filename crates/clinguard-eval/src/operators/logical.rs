//! Logical Operators
//!
//! Implements: And, Or, Not, If.
//!
//! `and`/`or` are two-valued: each child must evaluate to a Boolean, with
//! `Null` (an absent variable) counting as `false`. Every child is evaluated,
//! so a type error anywhere in the list is reported.

use crate::context::EvaluationContext;
use crate::engine::ProtocolEngine;
use crate::error::{EvalError, EvalResult};
use clinguard_logic::Expression;
use clinguard_types::Value;

impl ProtocolEngine {
    /// Evaluate a conjunction. The empty conjunction is `true`.
    pub(crate) fn eval_and(
        &self,
        children: &[Expression],
        ctx: &EvaluationContext,
        depth: usize,
    ) -> EvalResult<Value> {
        let flags = self.eval_boolean_children("and", children, ctx, depth)?;
        Ok(Value::Boolean(flags.into_iter().all(|b| b)))
    }

    /// Evaluate a disjunction. The empty disjunction is `false`.
    pub(crate) fn eval_or(
        &self,
        children: &[Expression],
        ctx: &EvaluationContext,
        depth: usize,
    ) -> EvalResult<Value> {
        let flags = self.eval_boolean_children("or", children, ctx, depth)?;
        Ok(Value::Boolean(flags.into_iter().any(|b| b)))
    }

    /// Evaluate Not operator
    ///
    /// Negates truthiness, so `!null` and `!""` are `true`.
    pub(crate) fn eval_not(
        &self,
        operand: &Expression,
        ctx: &EvaluationContext,
        depth: usize,
    ) -> EvalResult<Value> {
        let operand = self.eval(operand, ctx, depth)?;
        Ok(Value::Boolean(!operand.is_truthy()))
    }

    /// Evaluate If operator
    ///
    /// Only the selected branch is evaluated.
    pub(crate) fn eval_if(
        &self,
        condition: &Expression,
        then: &Expression,
        otherwise: &Expression,
        ctx: &EvaluationContext,
        depth: usize,
    ) -> EvalResult<Value> {
        if self.eval(condition, ctx, depth)?.is_truthy() {
            self.eval(then, ctx, depth)
        } else {
            self.eval(otherwise, ctx, depth)
        }
    }

    fn eval_boolean_children(
        &self,
        operator: &str,
        children: &[Expression],
        ctx: &EvaluationContext,
        depth: usize,
    ) -> EvalResult<Vec<bool>> {
        children
            .iter()
            .map(|child| match self.eval(child, ctx, depth)? {
                Value::Boolean(b) => Ok(b),
                Value::Null => Ok(false),
                other => Err(EvalError::type_mismatch(
                    operator,
                    "Boolean",
                    other.type_name(),
                )),
            })
            .collect()
    }
}
