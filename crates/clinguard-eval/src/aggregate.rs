//! Protocol-set evaluation

use crate::context::EvaluationContext;
use crate::engine::ProtocolEngine;
use clinguard_logic::{ClinicalProtocolRule, RejectedProtocol};
use clinguard_types::{EvaluationOutcome, PatientState, ProtocolSetOutput, SkipReason};
use log::{debug, trace, warn};
use std::time::Instant;

impl ProtocolEngine {
    /// Evaluate protocols in the order given.
    ///
    /// The snapshot is flattened once and one clock reading is used for every
    /// staleness check in the batch. A protocol that fails is reported in
    /// `skipped_rules` and does not affect the others.
    pub fn evaluate_protocols<'a, I>(
        &self,
        state: &PatientState,
        protocols: I,
    ) -> ProtocolSetOutput
    where
        I: IntoIterator<Item = &'a ClinicalProtocolRule>,
    {
        self.evaluate_entries(state, protocols.into_iter().map(Ok))
    }

    /// Evaluate a batch in which some entries failed to load.
    ///
    /// A rejected entry is reported as `invalid_protocol` in its position and
    /// the remaining protocols are evaluated as usual.
    pub fn evaluate_entries<'a, I>(&self, state: &PatientState, entries: I) -> ProtocolSetOutput
    where
        I: IntoIterator<Item = Result<&'a ClinicalProtocolRule, &'a RejectedProtocol>>,
    {
        let start = Instant::now();
        let ctx = EvaluationContext::from_state(state);
        let now = self.now();

        let mut output = ProtocolSetOutput::new();
        for entry in entries {
            let outcome = match entry {
                Ok(protocol) => self.evaluate_rule_with(state, protocol, &ctx, now),
                Err(rejected) => {
                    warn!("{}: not loaded: {}", rejected.rule_id, rejected.error);
                    EvaluationOutcome::skip(&rejected.rule_id, SkipReason::InvalidProtocol)
                }
            };
            output.record(outcome);
        }

        output.evaluation_time_ms = start.elapsed().as_secs_f64() * 1000.0;
        trace!("batch evaluated in {:.3} ms", output.evaluation_time_ms);
        debug!(
            "{} protocols: {} triggered, {} skipped",
            output.len(),
            output.actions.len(),
            output.skipped_rules.len()
        );
        output
    }
}
