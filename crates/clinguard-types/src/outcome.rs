//! Validation and evaluation outcomes

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of checking one protocol's preconditions against a snapshot.
///
/// All three checks are always computed so every failing reason can be
/// reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub missing_fields: Vec<String>,
    pub stale_data: bool,
    pub low_confidence: bool,
}

impl ValidationResult {
    /// Combine the individual checks
    pub fn new(low_confidence: bool, stale_data: bool, missing_fields: Vec<String>) -> Self {
        Self {
            is_valid: !low_confidence && !stale_data && missing_fields.is_empty(),
            missing_fields,
            stale_data,
            low_confidence,
        }
    }

    /// The skip reason reported for an invalid result.
    ///
    /// Priority: low confidence, then stale data, then missing fields.
    pub fn skip_reason(&self) -> Option<SkipReason> {
        if self.low_confidence {
            Some(SkipReason::LowConfidence)
        } else if self.stale_data {
            Some(SkipReason::StaleData)
        } else if !self.missing_fields.is_empty() {
            Some(SkipReason::MissingFields)
        } else {
            None
        }
    }
}

/// Why a protocol produced no action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Snapshot confidence below the protocol's minimum
    LowConfidence,
    /// Snapshot older than the protocol's maximum data age
    StaleData,
    /// Required fields absent from the snapshot
    MissingFields,
    /// Protocol retired from evaluation
    Inactive,
    /// Logic resolved to the no-action token
    NoAction,
    /// Logic could not be evaluated
    EvaluationFailed,
    /// Logic resolved to something that is not a usable action identifier
    InvalidAction,
    /// Protocol definition could not be loaded
    InvalidProtocol,
}

impl SkipReason {
    /// Wire name of the reason
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LowConfidence => "low_confidence",
            Self::StaleData => "stale_data",
            Self::MissingFields => "missing_fields",
            Self::Inactive => "inactive",
            Self::NoAction => "no_action",
            Self::EvaluationFailed => "evaluation_failed",
            Self::InvalidAction => "invalid_action",
            Self::InvalidProtocol => "invalid_protocol",
        }
    }

    /// Whether the reason is a data-quality gate failure
    pub fn is_data_quality(&self) -> bool {
        matches!(
            self,
            Self::LowConfidence | Self::StaleData | Self::MissingFields
        )
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A protocol that resolved to an action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    /// Action identifier returned by the protocol logic
    pub action: String,
    /// Rule id of the protocol that produced the action
    pub protocol: String,
    pub requires_review: bool,
    /// Confidence of the snapshot the action was derived from
    pub confidence: f64,
}

/// A protocol that produced no action
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipResult {
    pub rule_id: String,
    pub reason: SkipReason,
}

impl SkipResult {
    pub fn new(rule_id: impl Into<String>, reason: SkipReason) -> Self {
        Self {
            rule_id: rule_id.into(),
            reason,
        }
    }
}

/// Outcome of evaluating one protocol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EvaluationOutcome {
    Action(ActionResult),
    Skip(SkipResult),
}

impl EvaluationOutcome {
    /// Create a skip outcome
    pub fn skip(rule_id: impl Into<String>, reason: SkipReason) -> Self {
        Self::Skip(SkipResult::new(rule_id, reason))
    }

    /// Rule id of the protocol this outcome belongs to
    pub fn rule_id(&self) -> &str {
        match self {
            Self::Action(a) => &a.protocol,
            Self::Skip(s) => &s.rule_id,
        }
    }

    /// Try to get as an action
    pub fn as_action(&self) -> Option<&ActionResult> {
        match self {
            Self::Action(a) => Some(a),
            Self::Skip(_) => None,
        }
    }

    /// Skip reason, if this outcome is a skip
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Self::Action(_) => None,
            Self::Skip(s) => Some(s.reason),
        }
    }
}

/// Audit report for a batch of protocols.
///
/// `actions`, `triggered_rules` and `skipped_rules` preserve the order in
/// which protocols were supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolSetOutput {
    pub actions: Vec<ActionResult>,
    pub triggered_rules: IndexSet<String>,
    pub skipped_rules: Vec<SkipResult>,
    /// Wall-clock duration of the full pass
    pub evaluation_time_ms: f64,
}

impl ProtocolSetOutput {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one outcome
    pub fn record(&mut self, outcome: EvaluationOutcome) {
        match outcome {
            EvaluationOutcome::Action(action) => {
                self.triggered_rules.insert(action.protocol.clone());
                self.actions.push(action);
            }
            EvaluationOutcome::Skip(skip) => self.skipped_rules.push(skip),
        }
    }

    /// Check whether a rule produced an action
    pub fn is_triggered(&self, rule_id: &str) -> bool {
        self.triggered_rules.contains(rule_id)
    }

    /// Skip reason recorded for a rule, if any
    pub fn skip_reason(&self, rule_id: &str) -> Option<SkipReason> {
        self.skipped_rules
            .iter()
            .find(|s| s.rule_id == rule_id)
            .map(|s| s.reason)
    }

    /// Actions routed to human review
    pub fn review_queue(&self) -> impl Iterator<Item = &ActionResult> {
        self.actions.iter().filter(|a| a.requires_review)
    }

    /// Total number of protocols accounted for
    pub fn len(&self) -> usize {
        self.actions.len() + self.skipped_rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
