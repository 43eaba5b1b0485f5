//! Single-protocol evaluation
//!
//! Order of checks for one protocol:
//!
//! 1. inactive protocols are skipped without looking at the snapshot
//! 2. failed preconditions skip with the highest-priority reason
//! 3. the logic is evaluated; a failure skips with `evaluation_failed`
//! 4. the result must be an action identifier the protocol permits
//! 5. the no-action token is silent unless the protocol requires review

use crate::config::ActionPolicy;
use crate::context::EvaluationContext;
use crate::engine::{EvalOutcome, ProtocolEngine};
use crate::validator::validate_at;
use chrono::{DateTime, Utc};
use clinguard_logic::ClinicalProtocolRule;
use clinguard_types::{ActionResult, EvaluationOutcome, PatientState, SkipReason, Value};
use log::{debug, warn};

impl ProtocolEngine {
    /// Evaluate one protocol against a snapshot.
    ///
    /// Never panics and never fails: every problem is reported as a skip.
    pub fn evaluate_rule(
        &self,
        state: &PatientState,
        protocol: &ClinicalProtocolRule,
    ) -> EvaluationOutcome {
        let ctx = EvaluationContext::from_state(state);
        self.evaluate_rule_with(state, protocol, &ctx, self.now())
    }

    /// Evaluate one protocol with a prepared context and clock
    pub(crate) fn evaluate_rule_with(
        &self,
        state: &PatientState,
        protocol: &ClinicalProtocolRule,
        ctx: &EvaluationContext,
        now: DateTime<Utc>,
    ) -> EvaluationOutcome {
        let rule_id = protocol.rule_id.as_str();

        if !protocol.is_active() {
            debug!("{}: inactive", rule_id);
            return EvaluationOutcome::skip(rule_id, SkipReason::Inactive);
        }

        let validation = validate_at(state, protocol, ctx, now);
        if let Some(reason) = validation.skip_reason() {
            debug!(
                "{}: skipped ({}), missing fields {:?}",
                rule_id, reason, validation.missing_fields
            );
            return EvaluationOutcome::skip(rule_id, reason);
        }

        let value = match self.evaluate(&protocol.logic, ctx) {
            EvalOutcome::Value(value) => value,
            EvalOutcome::Failed(err) => {
                warn!("{}: evaluation failed: {}", rule_id, err);
                return EvaluationOutcome::skip(rule_id, SkipReason::EvaluationFailed);
            }
        };

        let Some(action) = self.action_identifier(value, rule_id) else {
            return EvaluationOutcome::skip(rule_id, SkipReason::InvalidAction);
        };

        let no_action = action == self.config().no_action_token;
        if !no_action && !protocol.allows_action(&action) {
            warn!("{}: action '{}' is not in allowedActions", rule_id, action);
            return EvaluationOutcome::skip(rule_id, SkipReason::InvalidAction);
        }

        let requires_review = protocol.validation.require_human_review;
        if no_action && !requires_review {
            debug!("{}: no action", rule_id);
            return EvaluationOutcome::skip(rule_id, SkipReason::NoAction);
        }

        debug!("{}: triggered '{}' (review: {})", rule_id, action, requires_review);
        EvaluationOutcome::Action(ActionResult {
            action,
            protocol: rule_id.to_string(),
            requires_review,
            confidence: state.confidence,
        })
    }

    /// Turn a top-level result into an action identifier
    fn action_identifier(&self, value: Value, rule_id: &str) -> Option<String> {
        let action = match (value, self.config().action_policy) {
            (Value::String(s), _) => s,
            (value @ (Value::Boolean(_) | Value::Number(_)), ActionPolicy::Lenient) => {
                value.to_string()
            }
            (value, _) => {
                warn!(
                    "{}: logic produced {} instead of an action identifier",
                    rule_id,
                    value.type_name()
                );
                return None;
            }
        };

        if action.trim().is_empty() {
            warn!("{}: logic produced an empty action identifier", rule_id);
            return None;
        }
        Some(action)
    }
}
