//! Engine settings

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Backend used to persist learner progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StateBackend {
    /// One JSON file per learner
    #[default]
    Json,
    /// Single SQLite database for all learners
    Sqlite,
}

/// General settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Maximum number of scenarios with badges waiting for their reflection step.
    /// The oldest entry is dropped when the bound is exceeded.
    #[serde(default = "default_max_pending_entries")]
    pub max_pending_entries: usize,

    /// Drop pending badges whose reflection never happened after this many seconds.
    /// Unset means pending badges live until the session ends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_ttl_secs: Option<u64>,

    /// Where learner progress is stored
    #[serde(default)]
    pub state_backend: StateBackend,
}

fn default_max_pending_entries() -> usize {
    32
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_pending_entries: default_max_pending_entries(),
            pending_ttl_secs: None,
            state_backend: StateBackend::default(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_pending_entries == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "max_pending_entries",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.pending_ttl_secs == Some(0) {
            return Err(ConfigError::InvalidSetting {
                name: "pending_ttl_secs",
                reason: "must be at least 1 when set".to_string(),
            });
        }
        Ok(())
    }

    /// Maximum age of a pending entry, if age-based expiry is enabled
    pub fn pending_ttl(&self) -> Option<chrono::Duration> {
        self.pending_ttl_secs
            .and_then(|secs| i64::try_from(secs).ok())
            .map(chrono::Duration::seconds)
    }
}
