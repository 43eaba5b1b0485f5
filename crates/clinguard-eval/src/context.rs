//! Evaluation context for protocol logic

use clinguard_types::{PatientState, Value};
use indexmap::IndexMap;

/// Flattened dot-path → value map that `var` nodes read from.
///
/// Built once per snapshot and shared by every protocol in a batch. Missing
/// paths are not errors; they resolve to [`Value::Null`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationContext {
    values: IndexMap<String, Value>,
}

impl EvaluationContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten a patient snapshot
    pub fn from_state(state: &PatientState) -> Self {
        Self {
            values: state.flatten(),
        }
    }

    /// Set a value, e.g. a field derived by the caller
    pub fn set(&mut self, path: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(path.into(), value.into());
    }

    /// Builder-style [`EvaluationContext::set`]
    pub fn with(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(path, value);
        self
    }

    /// Look up a dot-path.
    ///
    /// `<path>.<index>` addresses one element of a list-valued path.
    pub fn lookup(&self, path: &str) -> Value {
        if let Some(value) = self.values.get(path) {
            return value.clone();
        }
        path.rsplit_once('.')
            .and_then(|(list, index)| {
                let index = index.parse::<usize>().ok()?;
                self.values.get(list)?.as_list()?.get(index).cloned()
            })
            .unwrap_or_default()
    }

    /// Check whether a path resolves to a present value
    pub fn contains(&self, path: &str) -> bool {
        !self.lookup(path).is_null()
    }

    /// All flattened paths
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_from_state() {
        let state = PatientState::new(0.9, Utc::now())
            .unwrap()
            .with_vital("age", 54)
            .unwrap()
            .with_symptom("Fatigue");
        let ctx = EvaluationContext::from_state(&state);

        assert_eq!(ctx.lookup("age"), Value::Number(54.0));
        assert_eq!(ctx.lookup("vitals.age"), Value::Number(54.0));
        assert_eq!(ctx.lookup("symptoms.0"), Value::string("Fatigue"));
        assert_eq!(ctx.lookup("symptoms.1"), Value::Null);
        assert_eq!(ctx.lookup("vitals.egfr"), Value::Null);
        assert!(ctx.contains("meds"));
        assert!(!ctx.contains("egfr"));
    }

    #[test]
    fn test_set_overrides() {
        let ctx = EvaluationContext::new()
            .with("age", 70)
            .with("flags", Value::string_list(["fall_risk"]));
        assert_eq!(ctx.lookup("age"), Value::Number(70.0));
        assert_eq!(ctx.lookup("flags.0"), Value::string("fall_risk"));
        assert_eq!(ctx.paths().collect::<Vec<_>>(), vec!["age", "flags"]);
    }
}
