//! Dialogue engine configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Configuration for conversation handling.
#[derive(Debug, Clone, Deserialize)]
pub struct DialogueConfig {
    /// Path to the intent/entity catalog file
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Seconds of inactivity after which a session expires
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,

    /// What happens to collected entities when the user asks a follow-up
    /// on the same intent after a completed search
    #[serde(default)]
    pub completion_policy: CompletionPolicy,
}

/// Policy for collected entities after a completed search, when the next
/// turn stays on the same intent.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompletionPolicy {
    /// Keep collected entities so follow-ups search immediately.
    #[default]
    Retain,
    /// Start collection over from scratch.
    Clear,
}

impl DialogueConfig {
    /// Get the session TTL as a Duration
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// Validate dialogue configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.catalog_path.trim().is_empty() {
            return Err(ValidationError::EmptyCatalogPath);
        }
        if self.session_ttl_secs == 0 {
            return Err(ValidationError::InvalidSessionTtl);
        }
        Ok(())
    }
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            session_ttl_secs: default_session_ttl(),
            completion_policy: CompletionPolicy::default(),
        }
    }
}

fn default_catalog_path() -> String {
    "config/intents.json".to_string()
}

fn default_session_ttl() -> u64 {
    3600
}
