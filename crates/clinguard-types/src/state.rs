//! Patient-state snapshot
//!
//! A [`PatientState`] is the point-in-time summary of a patient's clinical
//! facts that protocols are evaluated against. Every field is addressable by
//! a dot-path:
//!
//! | path                      | value                          |
//! |---------------------------|--------------------------------|
//! | `vitals.<name>` / `<name>`| the named vital                |
//! | `meds`                    | list of medication strings     |
//! | `conditions`              | list of ICD-10-like codes      |
//! | `symptoms`                | list of symptom strings        |
//! | `<list>.<index>`          | one element of a list field    |
//! | `confidence`              | extraction confidence          |
//! | `timestamp`               | RFC 3339 snapshot time         |

use crate::error::{StateError, StateResult};
use crate::value::Value;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Canonical top-level field names. These shadow vitals of the same name
/// when addressed without the `vitals.` prefix.
const LIST_FIELDS: [&str; 3] = ["meds", "conditions", "symptoms"];

/// Point-in-time patient snapshot.
///
/// Collections default to empty and are never absent. `confidence` is always
/// within `[0, 1]` when built through [`PatientState::new`] or
/// deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientState {
    /// Named numeric or categorical measurements, in extraction order
    #[serde(default)]
    pub vitals: IndexMap<String, Value>,
    /// Medications, in extraction order
    #[serde(default, alias = "medications")]
    pub meds: Vec<String>,
    /// ICD-10-like condition codes
    #[serde(default)]
    pub conditions: Vec<String>,
    /// Reported symptoms
    #[serde(default)]
    pub symptoms: Vec<String>,
    /// Extraction confidence in `[0, 1]`
    #[serde(deserialize_with = "deserialize_confidence")]
    pub confidence: f64,
    /// When the snapshot was taken
    pub timestamp: DateTime<Utc>,
}

impl PatientState {
    /// Create an empty snapshot
    pub fn new(confidence: f64, timestamp: DateTime<Utc>) -> StateResult<Self> {
        check_confidence(confidence)?;
        Ok(Self {
            vitals: IndexMap::new(),
            meds: Vec::new(),
            conditions: Vec::new(),
            symptoms: Vec::new(),
            confidence,
            timestamp,
        })
    }

    /// Add a vital sign
    pub fn with_vital(
        mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> StateResult<Self> {
        let name = name.into();
        if name.is_empty() || name.starts_with('.') || name.ends_with('.') {
            return Err(StateError::invalid_vital_name(name));
        }
        self.vitals.insert(name, value.into());
        Ok(self)
    }

    /// Add a medication
    pub fn with_medication(mut self, medication: impl Into<String>) -> Self {
        self.meds.push(medication.into());
        self
    }

    /// Add a condition code
    pub fn with_condition(mut self, code: impl Into<String>) -> Self {
        self.conditions.push(code.into());
        self
    }

    /// Add a symptom
    pub fn with_symptom(mut self, symptom: impl Into<String>) -> Self {
        self.symptoms.push(symptom.into());
        self
    }

    /// Age of the snapshot in hours relative to `now`.
    ///
    /// Negative when the snapshot is timestamped in the future.
    pub fn age_hours(&self, now: DateTime<Utc>) -> f64 {
        (now - self.timestamp).num_milliseconds() as f64 / 3_600_000.0
    }

    /// Resolve a dot-path. Unknown paths and null vitals resolve to
    /// [`Value::Null`].
    ///
    /// `<path>.<index>` addresses one element of any list-valued path, the
    /// same way [`PatientState::flatten`] output is read during evaluation.
    pub fn resolve(&self, path: &str) -> Value {
        let value = self.resolve_field(path);
        if !value.is_null() {
            return value;
        }
        path.rsplit_once('.')
            .and_then(|(list, index)| {
                let index = index.parse::<usize>().ok()?;
                self.resolve_field(list).as_list()?.get(index).cloned()
            })
            .unwrap_or_default()
    }

    /// Check whether a dot-path resolves to a present value
    pub fn has_field(&self, path: &str) -> bool {
        !self.resolve(path).is_null()
    }

    /// Flatten the snapshot into `(dot-path, value)` pairs.
    ///
    /// Vitals appear both under `vitals.<name>` and under their bare name,
    /// unless the bare name collides with a canonical field.
    pub fn flatten(&self) -> IndexMap<String, Value> {
        let mut fields = IndexMap::with_capacity(self.vitals.len() * 2 + 5);

        for field in LIST_FIELDS {
            fields.insert(field.to_string(), self.resolve(field));
        }
        fields.insert("confidence".to_string(), Value::Number(self.confidence));
        fields.insert("timestamp".to_string(), Value::String(self.timestamp.to_rfc3339()));

        for (name, value) in &self.vitals {
            fields.insert(format!("vitals.{}", name), value.clone());
            if !fields.contains_key(name.as_str()) {
                fields.insert(name.clone(), value.clone());
            }
        }

        fields
    }

    fn resolve_field(&self, path: &str) -> Value {
        match path {
            "meds" => Value::string_list(self.meds.iter().cloned()),
            "conditions" => Value::string_list(self.conditions.iter().cloned()),
            "symptoms" => Value::string_list(self.symptoms.iter().cloned()),
            "confidence" => Value::Number(self.confidence),
            "timestamp" => Value::String(self.timestamp.to_rfc3339()),
            _ => {
                let name = path.strip_prefix("vitals.").unwrap_or(path);
                self.vitals.get(name).cloned().unwrap_or_default()
            }
        }
    }
}

fn check_confidence(confidence: f64) -> StateResult<()> {
    if (0.0..=1.0).contains(&confidence) {
        Ok(())
    } else {
        Err(StateError::confidence_out_of_range(confidence))
    }
}

fn deserialize_confidence<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let confidence = f64::deserialize(deserializer)?;
    check_confidence(confidence).map_err(serde::de::Error::custom)?;
    Ok(confidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn snapshot_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn state() -> PatientState {
        PatientState::new(0.9, snapshot_time())
            .unwrap()
            .with_vital("a1c", 7.5)
            .unwrap()
            .with_vital("smoking_status", "former")
            .unwrap()
            .with_vital("ldl", Value::Null)
            .unwrap()
            .with_medication("Metformin 500mg")
            .with_condition("E11.9")
    }

    #[test]
    fn test_confidence_range() {
        assert!(PatientState::new(0.0, snapshot_time()).is_ok());
        assert!(PatientState::new(1.0, snapshot_time()).is_ok());
        assert_eq!(
            PatientState::new(1.2, snapshot_time()),
            Err(StateError::ConfidenceOutOfRange { value: 1.2 })
        );
        assert!(PatientState::new(f64::NAN, snapshot_time()).is_err());
    }

    #[test]
    fn test_resolve_paths() {
        let s = state();
        assert_eq!(s.resolve("vitals.a1c"), Value::Number(7.5));
        assert_eq!(s.resolve("a1c"), Value::Number(7.5));
        assert_eq!(s.resolve("smoking_status"), Value::string("former"));
        assert_eq!(s.resolve("meds"), Value::string_list(["Metformin 500mg"]));
        assert_eq!(s.resolve("meds.0"), Value::string("Metformin 500mg"));
        assert_eq!(s.resolve("meds.3"), Value::Null);
        assert_eq!(s.resolve("symptoms"), Value::List(vec![]));
        assert_eq!(s.resolve("confidence"), Value::Number(0.9));
        assert_eq!(s.resolve("vitals.bmi"), Value::Null);
        assert_eq!(s.resolve("ldl"), Value::Null);
    }

    #[test]
    fn test_resolve_list_vital_index() {
        let s = state().with_vital("bp", Value::List(vec![150.into(), 95.into()])).unwrap();
        assert_eq!(s.resolve("bp.0"), Value::Number(150.0));
        assert_eq!(s.resolve("vitals.bp.1"), Value::Number(95.0));
        assert_eq!(s.resolve("bp.2"), Value::Null);
        assert_eq!(s.resolve("a1c.0"), Value::Null);
        assert!(s.has_field("bp.0"));
    }

    #[test]
    fn test_empty_collections_are_present() {
        let s = PatientState::new(0.5, snapshot_time()).unwrap();
        assert!(s.has_field("symptoms"));
        assert!(s.has_field("meds"));
        assert!(!s.has_field("vitals.a1c"));
    }

    #[test]
    fn test_flatten_matches_resolve() {
        let s = state();
        for (path, value) in s.flatten() {
            assert_eq!(s.resolve(&path), value, "path {}", path);
        }
    }

    #[test]
    fn test_invalid_vital_name() {
        let result = PatientState::new(0.5, snapshot_time()).unwrap().with_vital("", 1);
        assert!(matches!(result, Err(StateError::InvalidVitalName { .. })));
    }

    #[test]
    fn test_age_hours() {
        let s = state();
        assert_eq!(s.age_hours(snapshot_time() + Duration::hours(48)), 48.0);
        assert_eq!(s.age_hours(snapshot_time() - Duration::minutes(30)), -0.5);
    }

    #[test]
    fn test_deserialize_defaults_and_validation() {
        let s: PatientState = serde_json::from_value(json!({
            "vitals": {"a1c": 7.5},
            "confidence": 0.95,
            "timestamp": "2025-03-01T12:00:00Z"
        }))
        .unwrap();
        assert!(s.meds.is_empty());
        assert!(s.conditions.is_empty());
        assert_eq!(s.timestamp, snapshot_time());

        let err = serde_json::from_value::<PatientState>(json!({
            "confidence": 1.5,
            "timestamp": "2025-03-01T12:00:00Z"
        }));
        assert!(err.is_err());
    }
}
