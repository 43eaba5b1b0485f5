//! Patient-state validation
//!
//! Checks a snapshot against a protocol's preconditions before its logic is
//! evaluated. All checks are computed independently so callers see every
//! data-quality problem, not just the one that decides the skip reason.

use crate::context::EvaluationContext;
use crate::engine::ProtocolEngine;
use chrono::{DateTime, Utc};
use clinguard_logic::ClinicalProtocolRule;
use clinguard_types::{PatientState, ValidationResult};
use std::cmp::Ordering;

/// Validate `state` against `protocol` as of `now`.
///
/// Required fields are looked up in `ctx`, the same context the logic reads
/// from. Comparisons fail closed: a NaN confidence or age never passes.
pub fn validate_at(
    state: &PatientState,
    protocol: &ClinicalProtocolRule,
    ctx: &EvaluationContext,
    now: DateTime<Utc>,
) -> ValidationResult {
    let rules = &protocol.validation;

    let low_confidence = !(0.0..=1.0).contains(&state.confidence)
        || !at_most(rules.min_confidence, state.confidence);
    let stale_data = rules
        .max_data_age_hours
        .is_some_and(|max_age| !at_most(state.age_hours(now), max_age));
    let missing_fields = rules
        .required_fields
        .iter()
        .filter(|path| !ctx.contains(path))
        .cloned()
        .collect();

    ValidationResult::new(low_confidence, stale_data, missing_fields)
}

/// `a <= b`, false when either side is NaN
fn at_most(a: f64, b: f64) -> bool {
    matches!(a.partial_cmp(&b), Some(Ordering::Less | Ordering::Equal))
}

impl ProtocolEngine {
    /// Validate `state` against `protocol` using the engine clock
    pub fn validate(
        &self,
        state: &PatientState,
        protocol: &ClinicalProtocolRule,
    ) -> ValidationResult {
        let ctx = EvaluationContext::from_state(state);
        validate_at(state, protocol, &ctx, self.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use clinguard_logic::{Expression, ValidationRules};
    use clinguard_types::Value;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn validate(state: &PatientState, protocol: &ClinicalProtocolRule) -> ValidationResult {
        validate_at(state, protocol, &EvaluationContext::from_state(state), now())
    }

    fn protocol(validation: ValidationRules) -> ClinicalProtocolRule {
        ClinicalProtocolRule {
            rule_id: "test-001".to_string(),
            name: "Test".to_string(),
            category: String::new(),
            version: String::new(),
            source: String::new(),
            logic: Expression::literal("no_action"),
            validation,
            metadata: Default::default(),
        }
    }

    #[test]
    fn test_valid_state() {
        let state = PatientState::new(0.9, now() - Duration::hours(1))
            .unwrap()
            .with_vital("a1c", 7.0)
            .unwrap();
        let rules = ValidationRules {
            min_confidence: 0.8,
            max_data_age_hours: Some(24.0),
            required_fields: vec!["vitals.a1c".to_string()],
            ..Default::default()
        };
        let result = validate(&state, &protocol(rules));
        assert!(result.is_valid);
        assert_eq!(result.skip_reason(), None);
    }

    #[test]
    fn test_all_checks_reported() {
        let state = PatientState::new(0.5, now() - Duration::hours(48)).unwrap();
        let rules = ValidationRules {
            min_confidence: 0.8,
            max_data_age_hours: Some(24.0),
            required_fields: vec!["vitals.a1c".to_string(), "meds".to_string()],
            ..Default::default()
        };
        let result = validate(&state, &protocol(rules));
        assert!(!result.is_valid);
        assert!(result.low_confidence);
        assert!(result.stale_data);
        // Empty list is present
        assert_eq!(result.missing_fields, vec!["vitals.a1c".to_string()]);
    }

    #[test]
    fn test_confidence_boundary_is_inclusive() {
        let state = PatientState::new(0.85, now()).unwrap();
        let rules = ValidationRules {
            min_confidence: 0.85,
            ..Default::default()
        };
        assert!(!validate(&state, &protocol(rules)).low_confidence);
    }

    #[test]
    fn test_age_boundary_is_inclusive() {
        let state = PatientState::new(0.9, now() - Duration::hours(24)).unwrap();
        let rules = ValidationRules {
            max_data_age_hours: Some(24.0),
            ..Default::default()
        };
        assert!(!validate(&state, &protocol(rules)).stale_data);
    }

    #[test]
    fn test_no_age_limit() {
        let state = PatientState::new(0.9, now() - Duration::days(3650)).unwrap();
        assert!(validate(&state, &protocol(ValidationRules::default())).is_valid);
    }

    #[test]
    fn test_nan_confidence_is_low() {
        let mut state = PatientState::new(0.9, now()).unwrap();
        state.confidence = f64::NAN;
        let rules = ValidationRules {
            min_confidence: 0.5,
            ..Default::default()
        };
        assert!(validate(&state, &protocol(rules)).low_confidence);

        let mut state = PatientState::new(0.9, now()).unwrap();
        state.confidence = f64::INFINITY;
        assert!(validate(&state, &protocol(ValidationRules::default())).low_confidence);
    }

    #[test]
    fn test_nan_limits_fail_closed() {
        let state = PatientState::new(0.9, now()).unwrap();
        let rules = ValidationRules {
            min_confidence: f64::NAN,
            max_data_age_hours: Some(f64::NAN),
            ..Default::default()
        };
        let result = validate(&state, &protocol(rules));
        assert!(result.low_confidence);
        assert!(result.stale_data);
    }

    #[test]
    fn test_required_fields_agree_with_context() {
        let state = PatientState::new(0.9, now())
            .unwrap()
            .with_vital("bp", Value::List(vec![150.into(), 95.into()]))
            .unwrap()
            .with_vital("ldl", Value::Null)
            .unwrap()
            .with_medication("Metformin 500mg");
        let ctx = EvaluationContext::from_state(&state).with("derived.score", 3);
        let paths = [
            "bp.0", "bp.1", "bp.2", "vitals.bp.0", "bp", "ldl", "meds.0", "meds.1", "symptoms",
            "confidence", "derived.score", "derived", "a1c", "vitals.a1c",
        ];
        let rules = ValidationRules {
            required_fields: paths.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        };

        let result = validate_at(&state, &protocol(rules), &ctx, now());
        for path in paths {
            let missing = result.missing_fields.iter().any(|f| f == path);
            assert_eq!(missing, ctx.lookup(path).is_null(), "path {}", path);
        }
        assert_eq!(
            result.missing_fields,
            vec!["bp.2", "ldl", "meds.1", "derived", "a1c", "vitals.a1c"]
        );
    }
}
