//! Logic expression trees
//!
//! The value produced by a protocol's top-level expression is its action
//! identifier; there is no separate "matched" flag. A typical protocol is a
//! single conditional:
//!
//! ```text
//! if(a1c > 6.5, "refer_endocrinology", "no_action")
//! ```

use crate::operator::{ComparisonOp, Operator, OperatorKind};
use crate::table::OperatorTable;
use clinguard_types::Value;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Value as JsonValue, json};

/// A node of a protocol logic tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Constant value
    Literal(Value),
    /// List whose elements are computed
    List(Vec<Expression>),
    /// Dot-path lookup into the evaluation context.
    ///
    /// Unknown paths resolve to `default`, or to null when no default is set.
    Var {
        path: String,
        default: Option<Value>,
    },
    /// Conditional; the condition is tested for truthiness
    If {
        condition: Box<Expression>,
        then: Box<Expression>,
        otherwise: Box<Expression>,
    },
    /// Conjunction of boolean children
    And(Vec<Expression>),
    /// Disjunction of boolean children
    Or(Vec<Expression>),
    /// Truthiness negation
    Not(Box<Expression>),
    /// Binary comparison yielding a strict boolean
    Compare {
        op: ComparisonOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// Domain operator application
    Call(Operator),
}

impl Expression {
    /// Constant value
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// Variable lookup
    pub fn var(path: impl Into<String>) -> Self {
        Self::Var {
            path: path.into(),
            default: None,
        }
    }

    /// Variable lookup with a fallback for absent paths
    pub fn var_or(path: impl Into<String>, default: impl Into<Value>) -> Self {
        Self::Var {
            path: path.into(),
            default: Some(default.into()),
        }
    }

    pub fn if_then_else(condition: Expression, then: Expression, otherwise: Expression) -> Self {
        Self::If {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    pub fn and(children: Vec<Expression>) -> Self {
        Self::And(children)
    }

    pub fn or(children: Vec<Expression>) -> Self {
        Self::Or(children)
    }

    pub fn not(operand: Expression) -> Self {
        Self::Not(Box::new(operand))
    }

    pub fn compare(op: ComparisonOp, left: Expression, right: Expression) -> Self {
        Self::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn gt(left: Expression, right: Expression) -> Self {
        Self::compare(ComparisonOp::Greater, left, right)
    }

    pub fn ge(left: Expression, right: Expression) -> Self {
        Self::compare(ComparisonOp::GreaterOrEqual, left, right)
    }

    pub fn lt(left: Expression, right: Expression) -> Self {
        Self::compare(ComparisonOp::Less, left, right)
    }

    pub fn le(left: Expression, right: Expression) -> Self {
        Self::compare(ComparisonOp::LessOrEqual, left, right)
    }

    pub fn equals(left: Expression, right: Expression) -> Self {
        Self::compare(ComparisonOp::Equal, left, right)
    }

    pub fn between(value: Expression, low: Expression, high: Expression) -> Self {
        Self::Call(Operator::Between {
            value: Box::new(value),
            low: Box::new(low),
            high: Box::new(high),
        })
    }

    pub fn age_between(age: Expression, low: Expression, high: Expression) -> Self {
        Self::Call(Operator::AgeBetween {
            age: Box::new(age),
            low: Box::new(low),
            high: Box::new(high),
        })
    }

    pub fn has_medication(list: Expression, target: Expression) -> Self {
        Self::Call(Operator::HasMedication {
            list: Box::new(list),
            target: Box::new(target),
        })
    }

    pub fn has_condition_icd(list: Expression, prefix: Expression) -> Self {
        Self::Call(Operator::HasConditionIcd {
            list: Box::new(list),
            prefix: Box::new(prefix),
        })
    }

    pub fn array_contains_any(haystack: Expression, needles: Expression) -> Self {
        Self::Call(Operator::ArrayContainsAny {
            haystack: Box::new(haystack),
            needles: Box::new(needles),
        })
    }

    /// Direct children of this node
    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Self::Literal(_) | Self::Var { .. } => Vec::new(),
            Self::List(items) | Self::And(items) | Self::Or(items) => items.iter().collect(),
            Self::If {
                condition,
                then,
                otherwise,
            } => vec![&**condition, &**then, &**otherwise],
            Self::Not(operand) => vec![&**operand],
            Self::Compare { left, right, .. } => vec![&**left, &**right],
            Self::Call(op) => op.operands(),
        }
    }

    /// Height of the tree; a leaf has depth 1
    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(Expression::depth)
            .max()
            .unwrap_or(0)
    }

    /// Every variable path referenced by the tree, in first-use order
    pub fn variables(&self) -> Vec<&str> {
        let mut paths = Vec::new();
        self.collect_variables(&mut paths);
        paths
    }

    fn collect_variables<'a>(&'a self, paths: &mut Vec<&'a str>) {
        if let Self::Var { path, .. } = self {
            if !paths.contains(&path.as_str()) {
                paths.push(path);
            }
        }
        for child in self.children() {
            child.collect_variables(paths);
        }
    }

    /// String literals this tree can produce as its result.
    ///
    /// Follows `if` branches from the root; useful for listing the action
    /// identifiers a protocol may emit.
    pub fn result_literals(&self) -> Vec<&str> {
        match self {
            Self::Literal(Value::String(s)) => vec![s.as_str()],
            Self::If {
                then, otherwise, ..
            } => {
                let mut out = then.result_literals();
                for s in otherwise.result_literals() {
                    if !out.contains(&s) {
                        out.push(s);
                    }
                }
                out
            }
            _ => Vec::new(),
        }
    }

    /// Serialize to logic JSON
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Literal(value) => value.to_json(),
            Self::List(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
            Self::Var {
                path,
                default: None,
            } => json!({ "var": path }),
            Self::Var {
                path,
                default: Some(default),
            } => json!({ "var": [path, default.to_json()] }),
            Self::If { .. } => node(OperatorKind::If, self.children()),
            Self::And(children) => node(OperatorKind::And, children.iter().collect()),
            Self::Or(children) => node(OperatorKind::Or, children.iter().collect()),
            Self::Not(_) => node(OperatorKind::Not, self.children()),
            Self::Compare { op, .. } => node(OperatorKind::Compare(*op), self.children()),
            Self::Call(op) => node(op.kind(), op.operands()),
        }
    }

    /// Resolve logic JSON against the standard operator table
    pub fn parse(json: &JsonValue) -> crate::LogicResult<Self> {
        Self::from_json(json, OperatorTable::standard_ref())
    }
}

fn node(kind: OperatorKind, args: Vec<&Expression>) -> JsonValue {
    let args = args.into_iter().map(Expression::to_json).collect();
    let mut object = serde_json::Map::with_capacity(1);
    object.insert(kind.canonical_name().to_string(), JsonValue::Array(args));
    JsonValue::Object(object)
}

impl Serialize for Expression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Expression {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = JsonValue::deserialize(deserializer)?;
        Self::parse(&json).map_err(serde::de::Error::custom)
    }
}

impl From<Value> for Expression {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn a1c_protocol() -> Expression {
        Expression::if_then_else(
            Expression::gt(Expression::var("a1c"), Expression::literal(6.5)),
            Expression::literal("refer_endocrinology"),
            Expression::literal("no_action"),
        )
    }

    #[test]
    fn test_to_json() {
        assert_eq!(
            a1c_protocol().to_json(),
            json!({"if": [{">": [{"var": "a1c"}, 6.5]}, "refer_endocrinology", "no_action"]})
        );
        assert_eq!(
            Expression::var_or("vitals.ldl", 0).to_json(),
            json!({"var": ["vitals.ldl", 0]})
        );
        assert_eq!(
            Expression::not(Expression::var("pregnant")).to_json(),
            json!({"!": [{"var": "pregnant"}]})
        );
    }

    #[test]
    fn test_depth_and_variables() {
        let expr = Expression::if_then_else(
            Expression::and(vec![
                Expression::gt(Expression::var("a1c"), Expression::literal(6.5)),
                Expression::has_medication(
                    Expression::var("meds"),
                    Expression::literal("metformin"),
                ),
                Expression::lt(Expression::var("a1c"), Expression::literal(12)),
            ]),
            Expression::literal("intensify_therapy"),
            Expression::literal("no_action"),
        );
        assert_eq!(expr.depth(), 4);
        assert_eq!(expr.variables(), vec!["a1c", "meds"]);
        assert_eq!(expr.result_literals(), vec!["intensify_therapy", "no_action"]);
    }

    #[test]
    fn test_serde_round_trip() {
        let expr = a1c_protocol();
        let text = serde_json::to_string(&expr).unwrap();
        let back: Expression = serde_json::from_str(&text).unwrap();
        assert_eq!(back, expr);
    }

    #[test]
    fn test_deserialize_rejects_unknown_operator() {
        let err = serde_json::from_value::<Expression>(json!({"fuzzy_match": [1, 2]})).unwrap_err();
        assert!(err.to_string().contains("Unknown operator: fuzzy_match"));
    }
}
