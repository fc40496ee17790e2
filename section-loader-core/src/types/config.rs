//! Loader configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LoaderError, LoaderResult};

/// Default bound on consecutive failed attempts per section
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

/// Coordinator tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoaderConfig {
    /// Failed attempts after which a section becomes terminally failed
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Optional upper bound on one content fetch, in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_timeout_ms: Option<u64>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            fetch_timeout_ms: None,
        }
    }
}

impl LoaderConfig {
    /// Check value ranges
    pub fn validate(&self) -> LoaderResult<()> {
        if self.max_attempts == 0 {
            return Err(LoaderError::Validation(
                "maxAttempts must be at least 1".to_string(),
            ));
        }
        if self.fetch_timeout_ms == Some(0) {
            return Err(LoaderError::Validation(
                "fetchTimeoutMs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }
}
