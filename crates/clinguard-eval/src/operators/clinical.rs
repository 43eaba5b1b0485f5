//! Clinical membership operators
//!
//! Upstream extraction (OCR, EHR screen capture) does not normalize case, so
//! every match here is case-insensitive. Inputs that are not lists of strings
//! (or an empty target) never match.

use crate::context::EvaluationContext;
use crate::engine::ProtocolEngine;
use crate::error::EvalResult;
use clinguard_logic::Operator;
use clinguard_types::Value;

/// True if any medication equals `target` or contains it as a substring.
///
/// `has_medication(["Metformin 500mg"], "metformin")` is true.
pub fn has_medication(list: &Value, target: &Value) -> bool {
    let Some(target) = normalized(target) else {
        return false;
    };
    string_entries(list).any(|med| med.contains(&target))
}

/// True if any condition code starts with `prefix`.
///
/// Dots are ignored in condition codes, so `E11` matches `E11.9` and `e119`.
/// A dot in `prefix` is only accepted after the three-character category
/// (`E11.9`); any other dot placement never matches.
pub fn has_condition_icd(list: &Value, prefix: &Value) -> bool {
    let Some(prefix) = icd_prefix(prefix) else {
        return false;
    };
    string_entries(list).any(|code| strip_dots(&code).starts_with(&prefix))
}

/// True if any needle equals, or is a substring of, any haystack entry
pub fn array_contains_any(haystack: &Value, needles: &Value) -> bool {
    let Some(needles) = needles.as_list() else {
        return false;
    };
    let needles: Vec<String> = needles.iter().filter_map(normalized).collect();
    if needles.is_empty() {
        return false;
    }
    string_entries(haystack)
        .any(|entry| needles.iter().any(|needle| entry.contains(needle.as_str())))
}

/// Lower-cased, trimmed, non-empty string
fn normalized(value: &Value) -> Option<String> {
    let s = value.as_str()?.trim();
    (!s.is_empty()).then(|| s.to_lowercase())
}

fn string_entries(list: &Value) -> impl Iterator<Item = String> + '_ {
    list.as_list()
        .unwrap_or_default()
        .iter()
        .filter_map(normalized)
}

/// Normalized prefix with its category dot removed
fn icd_prefix(value: &Value) -> Option<String> {
    let prefix = normalized(value)?;
    let prefix = match prefix.split_once('.') {
        None => prefix,
        Some((category, rest)) if category.chars().count() == 3 && !rest.contains('.') => {
            format!("{}{}", category, rest)
        }
        Some(_) => return None,
    };
    (!prefix.is_empty()).then_some(prefix)
}

fn strip_dots(code: &str) -> String {
    code.chars().filter(|c| *c != '.').collect()
}

impl ProtocolEngine {
    /// Evaluate a domain operator application
    pub(crate) fn eval_operator(
        &self,
        op: &Operator,
        ctx: &EvaluationContext,
        depth: usize,
    ) -> EvalResult<Value> {
        let result = match op {
            Operator::Between { value, low, high } => super::comparison::between(
                &self.eval(value, ctx, depth)?,
                &self.eval(low, ctx, depth)?,
                &self.eval(high, ctx, depth)?,
            ),
            Operator::AgeBetween { age, low, high } => super::comparison::age_between(
                &self.eval(age, ctx, depth)?,
                &self.eval(low, ctx, depth)?,
                &self.eval(high, ctx, depth)?,
            ),
            Operator::HasMedication { list, target } => has_medication(
                &self.eval(list, ctx, depth)?,
                &self.eval(target, ctx, depth)?,
            ),
            Operator::HasConditionIcd { list, prefix } => has_condition_icd(
                &self.eval(list, ctx, depth)?,
                &self.eval(prefix, ctx, depth)?,
            ),
            Operator::ArrayContainsAny { haystack, needles } => array_contains_any(
                &self.eval(haystack, ctx, depth)?,
                &self.eval(needles, ctx, depth)?,
            ),
        };
        Ok(Value::Boolean(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn meds() -> Value {
        Value::string_list(["Metformin 500mg BID", "LISINOPRIL", "atorvastatin"])
    }

    #[rstest]
    #[case("metformin", true)]
    #[case("METFORMIN 500MG BID", true)]
    #[case("Lisinopril", true)]
    #[case("  atorvastatin ", true)]
    #[case("insulin", false)]
    #[case("", false)]
    fn test_has_medication(#[case] target: &str, #[case] expected: bool) {
        assert_eq!(has_medication(&meds(), &Value::string(target)), expected);
    }

    #[test]
    fn test_has_medication_malformed_input() {
        assert!(!has_medication(&Value::List(vec![]), &Value::string("metformin")));
        assert!(!has_medication(&Value::string("metformin"), &Value::string("metformin")));
        assert!(!has_medication(&Value::Null, &Value::string("metformin")));
        assert!(!has_medication(&meds(), &Value::Number(500.0)));
        assert!(!has_medication(
            &Value::List(vec![Value::Number(1.0), Value::Null]),
            &Value::string("1")
        ));
    }

    #[rstest]
    #[case("E11", true)]
    #[case("e11.9", true)]
    #[case("E119", true)]
    #[case("I10", true)]
    #[case("I1", true)]
    #[case("E11.", true)]
    #[case("E10", false)]
    #[case("11", false)]
    #[case(".", false)]
    #[case("E1.1", false)]
    #[case("E11.9.", false)]
    #[case(".E11", false)]
    fn test_has_condition_icd(#[case] prefix: &str, #[case] expected: bool) {
        let conditions = Value::string_list(["E11.9", "i10"]);
        assert_eq!(has_condition_icd(&conditions, &Value::string(prefix)), expected);
    }

    #[test]
    fn test_has_condition_icd_malformed_input() {
        assert!(!has_condition_icd(&Value::List(vec![]), &Value::string("E11")));
        assert!(!has_condition_icd(&Value::Boolean(true), &Value::string("E11")));
        assert!(!has_condition_icd(&Value::string_list(["E11"]), &Value::Null));
    }

    #[test]
    fn test_array_contains_any() {
        let symptoms = Value::string_list(["Crushing chest pain", "Diaphoresis"]);
        assert!(array_contains_any(
            &symptoms,
            &Value::string_list(["syncope", "CHEST PAIN"])
        ));
        assert!(array_contains_any(&symptoms, &Value::string_list(["diaphoresis"])));
        assert!(!array_contains_any(&symptoms, &Value::string_list(["dyspnea"])));
        assert!(!array_contains_any(&symptoms, &Value::List(vec![])));
        assert!(!array_contains_any(&symptoms, &Value::string("chest pain")));
        assert!(!array_contains_any(&Value::Null, &Value::string_list(["chest pain"])));
        assert!(!array_contains_any(&symptoms, &Value::string_list([""])));
    }
}
