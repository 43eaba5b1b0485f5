//! Logic JSON loader
//!
//! Resolves JsonLogic-style documents into [`Expression`] trees:
//!
//! - scalars are literals; arrays are lists (literal when every element is)
//! - an object with exactly one key is an operator application; its value is
//!   the argument array, or a single argument when not an array
//! - `{"var": "path"}` / `{"var": ["path", default]}` are variable lookups
//! - `{"if": [c1, v1, c2, v2, ..., fallback]}` chains into nested conditionals
//!
//! Operator names are resolved through an [`OperatorTable`] and arity is
//! checked here, so evaluation never sees an unknown operator.

use crate::error::{LogicError, LogicResult};
use crate::expression::Expression;
use crate::operator::OperatorKind;
use crate::table::OperatorTable;
use clinguard_types::Value;
use serde_json::Value as JsonValue;

impl Expression {
    /// Resolve logic JSON against an operator table
    pub fn from_json(json: &JsonValue, table: &OperatorTable) -> LogicResult<Self> {
        Loader { table }.load(json)
    }

    /// Parse and resolve logic JSON text against an operator table
    pub fn from_json_str(text: &str, table: &OperatorTable) -> LogicResult<Self> {
        let json: JsonValue = serde_json::from_str(text)
            .map_err(|e| LogicError::invalid_shape(format!("malformed JSON: {}", e)))?;
        Self::from_json(&json, table)
    }
}

struct Loader<'a> {
    table: &'a OperatorTable,
}

impl Loader<'_> {
    fn load(&self, json: &JsonValue) -> LogicResult<Expression> {
        match json {
            JsonValue::Object(map) => {
                let mut entries = map.iter();
                match (entries.next(), entries.next()) {
                    (Some((name, args)), None) => self.load_operation(name, args),
                    (None, _) => Err(LogicError::invalid_shape("empty object")),
                    (Some(_), Some(_)) => Err(LogicError::invalid_shape(format!(
                        "operator object must have exactly one key, found {}",
                        map.len()
                    ))),
                }
            }
            JsonValue::Array(items) => {
                let items = items
                    .iter()
                    .map(|item| self.load(item))
                    .collect::<LogicResult<Vec<_>>>()?;
                Ok(fold_list(items))
            }
            scalar => Value::from_json(scalar)
                .map(Expression::Literal)
                .ok_or_else(|| {
                    LogicError::invalid_shape(format!("unsupported literal {}", scalar))
                }),
        }
    }

    fn load_operation(&self, name: &str, args: &JsonValue) -> LogicResult<Expression> {
        let kind = self
            .table
            .resolve(name)
            .ok_or_else(|| LogicError::unknown_operator(name))?;

        let raw_args: Vec<&JsonValue> = match args {
            JsonValue::Array(items) => items.iter().collect(),
            single => vec![single],
        };

        if !kind.arity().accepts(raw_args.len()) {
            return Err(LogicError::arity(kind, raw_args.len()));
        }

        if kind == OperatorKind::Var {
            return load_var(&raw_args);
        }

        let args = raw_args
            .iter()
            .map(|arg| self.load(arg))
            .collect::<LogicResult<Vec<_>>>()?;
        let mut args = Operands(args.into_iter());

        let expr = match kind {
            OperatorKind::Var => load_var(&raw_args)?,
            OperatorKind::If => fold_conditional(args.rest()),
            OperatorKind::And => Expression::And(args.rest()),
            OperatorKind::Or => Expression::Or(args.rest()),
            OperatorKind::Not => Expression::not(args.take()),
            OperatorKind::Compare(op) => {
                let left = args.take();
                Expression::compare(op, left, args.take())
            }
            OperatorKind::Between => {
                let (value, low) = (args.take(), args.take());
                Expression::between(value, low, args.take())
            }
            OperatorKind::AgeBetween => {
                let (age, low) = (args.take(), args.take());
                Expression::age_between(age, low, args.take())
            }
            OperatorKind::HasMedication => {
                let list = args.take();
                Expression::has_medication(list, args.take())
            }
            OperatorKind::HasConditionIcd => {
                let list = args.take();
                Expression::has_condition_icd(list, args.take())
            }
            OperatorKind::ArrayContainsAny => {
                let haystack = args.take();
                Expression::array_contains_any(haystack, args.take())
            }
        };

        Ok(expr)
    }
}

/// Loaded arguments, consumed front to back. Arity has already been checked,
/// so `take` never runs out.
struct Operands(std::vec::IntoIter<Expression>);

impl Operands {
    fn take(&mut self) -> Expression {
        self.0.next().unwrap_or(Expression::Literal(Value::Null))
    }

    fn rest(self) -> Vec<Expression> {
        self.0.collect()
    }
}

fn load_var(args: &[&JsonValue]) -> LogicResult<Expression> {
    let path = match args[0] {
        JsonValue::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        JsonValue::Number(n) if n.is_u64() => n.to_string(),
        other => {
            return Err(LogicError::invalid_variable(format!(
                "path must be a non-empty string, found {}",
                other
            )));
        }
    };

    match args.get(1) {
        None => Ok(Expression::var(path)),
        Some(default) => {
            let default = Value::from_json(default).ok_or_else(|| {
                LogicError::invalid_variable(format!("default for '{}' must be a literal", path))
            })?;
            Ok(Expression::var_or(path, default))
        }
    }
}

fn fold_list(items: Vec<Expression>) -> Expression {
    if items.iter().all(|item| matches!(item, Expression::Literal(_))) {
        Expression::Literal(Value::List(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Expression::Literal(value) => Some(value),
                    _ => None,
                })
                .collect(),
        ))
    } else {
        Expression::List(items)
    }
}

/// `[c1, v1, c2, v2, fallback]` becomes `if(c1, v1, if(c2, v2, fallback))`.
fn fold_conditional(mut args: Vec<Expression>) -> Expression {
    let mut result = args.pop().unwrap_or(Expression::Literal(Value::Null));
    while let (Some(then), Some(condition)) = (args.pop(), args.pop()) {
        result = Expression::if_then_else(condition, then, result);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::{Arity, ComparisonOp};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn load(json: JsonValue) -> LogicResult<Expression> {
        Expression::from_json(&json, &OperatorTable::standard())
    }

    #[test]
    fn test_load_conditional() {
        let expr = load(json!({
            "if": [{">": [{"var": "a1c"}, 6.5]}, "refer_endocrinology", "no_action"]
        }))
        .unwrap();
        assert_eq!(
            expr,
            Expression::if_then_else(
                Expression::gt(Expression::var("a1c"), Expression::literal(6.5)),
                Expression::literal("refer_endocrinology"),
                Expression::literal("no_action"),
            )
        );
    }

    #[test]
    fn test_load_chained_conditional() {
        let expr = load(json!({
            "if": [
                {">=": [{"var": "a1c"}, 9]}, "urgent_referral",
                {">": [{"var": "a1c"}, 6.5]}, "refer_endocrinology",
                "no_action"
            ]
        }))
        .unwrap();
        assert_eq!(
            expr,
            Expression::if_then_else(
                Expression::ge(Expression::var("a1c"), Expression::literal(9)),
                Expression::literal("urgent_referral"),
                Expression::if_then_else(
                    Expression::gt(Expression::var("a1c"), Expression::literal(6.5)),
                    Expression::literal("refer_endocrinology"),
                    Expression::literal("no_action"),
                ),
            )
        );
    }

    #[test]
    fn test_load_domain_operators() {
        let expr = load(json!({"and": [
            {"has_medication": [{"var": "meds"}, "Metformin"]},
            {"has_condition_icd": [{"var": "conditions"}, "E11"]},
            {"array_contains_any": [{"var": "symptoms"}, ["polyuria", "polydipsia"]]},
            {"age_between": [{"var": "age"}, 40, 75]},
            {"between": [{"var": "vitals.bmi"}, 25, 40]}
        ]}))
        .unwrap();

        let Expression::And(children) = expr else {
            panic!("expected and");
        };
        let kinds: Vec<_> = children
            .iter()
            .map(|c| match c {
                Expression::Call(op) => op.kind(),
                other => panic!("unexpected node {:?}", other),
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                OperatorKind::HasMedication,
                OperatorKind::HasConditionIcd,
                OperatorKind::ArrayContainsAny,
                OperatorKind::AgeBetween,
                OperatorKind::Between,
            ]
        );
    }

    #[test]
    fn test_unary_sugar_and_aliases() {
        assert_eq!(
            load(json!({"!": {"var": "pregnant"}})).unwrap(),
            Expression::not(Expression::var("pregnant"))
        );
        assert_eq!(
            load(json!({"===": [{"var": "sex"}, "F"]})).unwrap(),
            Expression::compare(
                ComparisonOp::Equal,
                Expression::var("sex"),
                Expression::literal("F")
            )
        );
    }

    #[test]
    fn test_var_forms() {
        assert_eq!(load(json!({"var": "vitals.a1c"})).unwrap(), Expression::var("vitals.a1c"));
        assert_eq!(
            load(json!({"var": ["vitals.ldl", 0]})).unwrap(),
            Expression::var_or("vitals.ldl", 0)
        );
        assert!(matches!(
            load(json!({"var": ""})),
            Err(LogicError::InvalidVariable { .. })
        ));
        assert!(matches!(
            load(json!({"var": ["a1c", {"nested": true}]})),
            Err(LogicError::InvalidVariable { .. })
        ));
    }

    #[test]
    fn test_computed_list() {
        let expr = load(json!([{"var": "primary_med"}, "aspirin"])).unwrap();
        assert_eq!(
            expr,
            Expression::List(vec![Expression::var("primary_med"), Expression::literal("aspirin")])
        );
        assert_eq!(
            load(json!(["aspirin", 81])).unwrap(),
            Expression::Literal(Value::List(vec![Value::string("aspirin"), Value::Number(81.0)]))
        );
    }

    #[test]
    fn test_unknown_operator_is_load_error() {
        assert_eq!(
            load(json!({"if": [{"soundex": ["a", "b"]}, "x", "y"]})),
            Err(LogicError::unknown_operator("soundex"))
        );
    }

    #[test]
    fn test_wrong_arity_is_load_error() {
        assert_eq!(
            load(json!({"between": [{"var": "a1c"}, 5]})),
            Err(LogicError::Arity {
                operator: OperatorKind::Between,
                expected: Arity::Exact(3),
                found: 2,
            })
        );
        assert!(matches!(
            load(json!({"if": [true, "a"]})),
            Err(LogicError::Arity { found: 2, .. })
        ));
        assert!(matches!(load(json!({"and": []})), Err(LogicError::Arity { .. })));
    }

    #[test]
    fn test_invalid_shapes() {
        assert!(matches!(load(json!({})), Err(LogicError::InvalidShape { .. })));
        assert!(matches!(
            load(json!({"and": [true], "or": [false]})),
            Err(LogicError::InvalidShape { .. })
        ));
        assert!(matches!(
            Expression::from_json_str("{\"if\": [", &OperatorTable::standard()),
            Err(LogicError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_custom_table() {
        let table = OperatorTable::builder()
            .alias("on_medication", "has_medication")
            .unwrap()
            .remove("between")
            .build();
        let logic = json!({"on_medication": [{"var": "meds"}, "statin"]});
        assert!(Expression::from_json(&logic, &table).is_ok());
        assert_eq!(
            Expression::from_json(&json!({"between": [1, 0, 2]}), &table),
            Err(LogicError::unknown_operator("between"))
        );
    }
}
