//! Clinical protocol definitions
//!
//! A [`ClinicalProtocolRule`] pairs a logic tree with the preconditions a
//! snapshot must meet before the logic is trusted. Protocols are supplied by
//! an external registry as JSON:
//!
//! ```json
//! {
//!   "ruleId": "dm-a1c-001",
//!   "name": "Elevated A1c referral",
//!   "category": "diabetes",
//!   "version": "1.2.0",
//!   "source": "ADA Standards of Care",
//!   "logic": {"if": [{">": [{"var": "a1c"}, 6.5]}, "refer_endocrinology", "no_action"]},
//!   "validation": {"minConfidence": 0.85, "requireHumanReview": false, "maxDataAgeHours": 24},
//!   "metadata": {"createdBy": "clinical-informatics", "isActive": true}
//! }
//! ```

use crate::error::{LogicError, LogicResult};
use crate::expression::Expression;
use crate::table::OperatorTable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Preconditions checked before a protocol's logic is evaluated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    /// Minimum snapshot confidence
    pub min_confidence: f64,
    /// Route every non-silent outcome to a human
    #[serde(default)]
    pub require_human_review: bool,
    /// Maximum snapshot age in hours
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_data_age_hours: Option<f64>,
    /// Dot-paths that must be present in the snapshot
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_fields: Vec<String>,
    /// Action identifiers the logic may produce. Unrestricted when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_actions: Option<Vec<String>>,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            min_confidence: 0.0,
            require_human_review: false,
            max_data_age_hours: None,
            required_fields: Vec::new(),
            allowed_actions: None,
        }
    }
}

/// Authoring metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_level: Option<String>,
    #[serde(default)]
    pub references: Vec<String>,
    /// Inactive protocols are never evaluated
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl Default for ProtocolMetadata {
    fn default() -> Self {
        Self {
            created_at: None,
            updated_at: None,
            created_by: String::new(),
            evidence_level: None,
            references: Vec::new(),
            is_active: true,
        }
    }
}

fn default_active() -> bool {
    true
}

/// A versioned clinical decision rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalProtocolRule {
    /// Unique rule identifier
    pub rule_id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub source: String,
    /// Logic tree; its result is the action identifier
    pub logic: Expression,
    #[serde(default)]
    pub validation: ValidationRules,
    #[serde(default)]
    pub metadata: ProtocolMetadata,
}

impl ClinicalProtocolRule {
    pub fn is_active(&self) -> bool {
        self.metadata.is_active
    }

    /// Whether `action` is permitted by `allowedActions`
    pub fn allows_action(&self, action: &str) -> bool {
        self.validation
            .allowed_actions
            .as_ref()
            .is_none_or(|allowed| allowed.iter().any(|a| a == action))
    }

    /// Check the definition itself for authoring mistakes
    pub fn check(&self) -> LogicResult<()> {
        if self.rule_id.trim().is_empty() {
            return Err(LogicError::invalid_protocol("ruleId must not be empty"));
        }
        let min = self.validation.min_confidence;
        if !(0.0..=1.0).contains(&min) {
            return Err(LogicError::invalid_protocol(format!(
                "{}: minConfidence {} is outside of [0, 1]",
                self.rule_id, min
            )));
        }
        if let Some(hours) = self.validation.max_data_age_hours {
            if !hours.is_finite() || hours < 0.0 {
                return Err(LogicError::invalid_protocol(format!(
                    "{}: maxDataAgeHours must be a non-negative number, found {}",
                    self.rule_id, hours
                )));
            }
        }
        if let Some(field) = self
            .validation
            .required_fields
            .iter()
            .find(|f| f.trim().is_empty())
        {
            return Err(LogicError::invalid_protocol(format!(
                "{}: invalid required field {:?}",
                self.rule_id, field
            )));
        }
        Ok(())
    }

    /// Decode a protocol document, resolving its logic against `table`
    pub fn from_json_value(json: &JsonValue, table: &OperatorTable) -> LogicResult<Self> {
        let mut document = json.clone();
        let logic = document
            .get_mut("logic")
            .map(JsonValue::take)
            .ok_or_else(|| LogicError::invalid_protocol("missing field `logic`"))?;

        let mut rule: Self = serde_json::from_value(document)
            .map_err(|e| LogicError::invalid_protocol(e.to_string()))?;
        rule.logic = Expression::from_json(&logic, table)?;
        rule.check()?;
        Ok(rule)
    }

    /// Decode a JSON array of protocols, or a single protocol object
    pub fn load_all(text: &str, table: &OperatorTable) -> LogicResult<Vec<Self>> {
        parse_document(text)?
            .iter()
            .map(|item| Self::from_json_value(item, table))
            .collect()
    }

    /// Decode a protocol document entry by entry.
    ///
    /// Only malformed JSON fails the whole document. An entry that does not
    /// load is returned as a [`RejectedProtocol`] in its original position.
    pub fn load_each(text: &str, table: &OperatorTable) -> LogicResult<Vec<ProtocolEntry>> {
        let entries = parse_document(text)?
            .iter()
            .enumerate()
            .map(|(index, item)| {
                Self::from_json_value(item, table).map_err(|error| RejectedProtocol {
                    index,
                    rule_id: item
                        .get("ruleId")
                        .and_then(JsonValue::as_str)
                        .filter(|id| !id.trim().is_empty())
                        .map_or_else(|| format!("#{}", index), str::to_string),
                    error,
                })
            })
            .collect();
        Ok(entries)
    }
}

/// A document entry that failed to load
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedProtocol {
    /// Position of the entry in its document
    pub index: usize,
    /// The entry's `ruleId`, or `#<index>` when it has none
    pub rule_id: String,
    pub error: LogicError,
}

/// One entry of a protocol document
pub type ProtocolEntry = Result<ClinicalProtocolRule, RejectedProtocol>;

fn parse_document(text: &str) -> LogicResult<Vec<JsonValue>> {
    let json: JsonValue = serde_json::from_str(text)
        .map_err(|e| LogicError::invalid_protocol(format!("malformed JSON: {}", e)))?;
    Ok(match json {
        JsonValue::Array(items) => items,
        single => vec![single],
    })
}
