//! Engine configuration

use crate::error::ConfigError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How a protocol's top-level result is turned into an action identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionPolicy {
    /// Only string results are action identifiers; anything else is reported
    /// as `invalid_action`
    #[default]
    Strict,
    /// Booleans and numbers are converted to their text form; null and lists
    /// are still `invalid_action`
    Lenient,
}

/// Evaluation engine settings.
///
/// Every field has a default, so a config document only needs the settings
/// it changes:
///
/// ```json
/// {"noActionToken": "no_action", "maxDepth": 64, "actionPolicy": "strict"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Result that means "nothing to do"
    pub no_action_token: String,
    /// Maximum logic tree depth evaluated before giving up
    pub max_depth: usize,
    pub action_policy: ActionPolicy,
    /// Fixed "now" for staleness checks; the system clock when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_time: Option<DateTime<Utc>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            no_action_token: "no_action".to_string(),
            max_depth: 64,
            action_policy: ActionPolicy::Strict,
            reference_time: None,
        }
    }
}

impl EngineConfig {
    /// Decode and validate a JSON config document
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, decode and validate a JSON config file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.no_action_token.trim().is_empty() {
            return Err(ConfigError::invalid("noActionToken", "must not be empty"));
        }
        if self.max_depth == 0 {
            return Err(ConfigError::invalid("maxDepth", "must be at least 1"));
        }
        Ok(())
    }

    pub fn with_no_action_token(mut self, token: impl Into<String>) -> Self {
        self.no_action_token = token.into();
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_action_policy(mut self, policy: ActionPolicy) -> Self {
        self.action_policy = policy;
        self
    }

    pub fn with_reference_time(mut self, now: DateTime<Utc>) -> Self {
        self.reference_time = Some(now);
        self
    }

    /// Current time for staleness checks
    pub fn now(&self) -> DateTime<Utc> {
        self.reference_time.unwrap_or_else(Utc::now)
    }
}
