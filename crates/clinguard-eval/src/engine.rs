//! Protocol Evaluation Engine
//!
//! This module provides the [`ProtocolEngine`] struct, which interprets logic
//! trees against an [`EvaluationContext`] and drives validation, rule
//! evaluation and batch aggregation.

use crate::config::EngineConfig;
use crate::context::EvaluationContext;
use crate::error::{EvalError, EvalResult};
use chrono::{DateTime, Utc};
use clinguard_logic::{
    ClinicalProtocolRule, Expression, LogicResult, OperatorTable, ProtocolEntry,
};
use clinguard_types::Value;
use serde_json::Value as JsonValue;

/// Result of evaluating a logic tree.
///
/// Evaluation failure is a value, not an error: callers match on
/// [`EvalOutcome::Failed`] instead of propagating it.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalOutcome {
    /// The tree produced a value
    Value(Value),
    /// The tree could not be evaluated
    Failed(EvalError),
}

impl EvalOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The produced value, if evaluation succeeded
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Failed(_) => None,
        }
    }

    /// The failure, if evaluation failed
    pub fn error(&self) -> Option<&EvalError> {
        match self {
            Self::Value(_) => None,
            Self::Failed(err) => Some(err),
        }
    }

    pub fn into_result(self) -> EvalResult<Value> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Failed(err) => Err(err),
        }
    }
}

impl From<EvalResult<Value>> for EvalOutcome {
    fn from(result: EvalResult<Value>) -> Self {
        match result {
            Ok(value) => Self::Value(value),
            Err(err) => Self::Failed(err),
        }
    }
}

/// The protocol evaluation engine
///
/// Holds only immutable configuration and the operator table, so a single
/// engine can be shared across threads and reused for any number of batches.
#[derive(Debug, Clone, Default)]
pub struct ProtocolEngine {
    config: EngineConfig,
    operators: OperatorTable,
}

impl ProtocolEngine {
    /// Create an engine with default settings and the standard operators
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with the given settings
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            operators: OperatorTable::standard(),
        }
    }

    /// Replace the operator table used to load logic
    pub fn with_operators(mut self, operators: OperatorTable) -> Self {
        self.operators = operators;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn operators(&self) -> &OperatorTable {
        &self.operators
    }

    /// Clock used for staleness checks
    pub fn now(&self) -> DateTime<Utc> {
        self.config.now()
    }

    /// Load a logic tree using this engine's operator table
    pub fn parse_logic(&self, json: &JsonValue) -> LogicResult<Expression> {
        Expression::from_json(json, &self.operators)
    }

    /// Load a protocol document (one object or an array of them)
    pub fn load_protocols(&self, text: &str) -> LogicResult<Vec<ClinicalProtocolRule>> {
        ClinicalProtocolRule::load_all(text, &self.operators)
    }

    /// Load a protocol document entry by entry, keeping entries that fail
    pub fn load_protocol_entries(&self, text: &str) -> LogicResult<Vec<ProtocolEntry>> {
        ClinicalProtocolRule::load_each(text, &self.operators)
    }

    /// Evaluate a logic tree
    pub fn evaluate(&self, expr: &Expression, ctx: &EvaluationContext) -> EvalOutcome {
        self.eval(expr, ctx, 0).into()
    }

    /// Evaluate one node. `depth` is the depth of the parent node.
    pub(crate) fn eval(
        &self,
        expr: &Expression,
        ctx: &EvaluationContext,
        depth: usize,
    ) -> EvalResult<Value> {
        let depth = depth + 1;
        if depth > self.config.max_depth {
            return Err(EvalError::DepthLimitExceeded {
                limit: self.config.max_depth,
            });
        }

        match expr {
            Expression::Literal(value) => Ok(value.clone()),
            Expression::List(items) => items
                .iter()
                .map(|item| self.eval(item, ctx, depth))
                .collect::<EvalResult<Vec<_>>>()
                .map(Value::List),
            Expression::Var { path, default } => {
                let value = ctx.lookup(path);
                Ok(match (value, default) {
                    (Value::Null, Some(default)) => default.clone(),
                    (value, _) => value,
                })
            }
            Expression::If {
                condition,
                then,
                otherwise,
            } => self.eval_if(condition, then, otherwise, ctx, depth),
            Expression::And(children) => self.eval_and(children, ctx, depth),
            Expression::Or(children) => self.eval_or(children, ctx, depth),
            Expression::Not(operand) => self.eval_not(operand, ctx, depth),
            Expression::Compare { op, left, right } => {
                self.eval_compare(*op, left, right, ctx, depth)
            }
            Expression::Call(op) => self.eval_operator(op, ctx, depth),
        }
    }
}
