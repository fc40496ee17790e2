//! Content source abstract Trait

use async_trait::async_trait;
use thiserror::Error;

/// Raw response of one content fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport-level fetch failure (no response was received)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{detail}")]
pub struct FetchError {
    pub detail: String,
    pub timed_out: bool,
}

impl FetchError {
    #[must_use]
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            timed_out: false,
        }
    }

    #[must_use]
    pub fn timeout(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            timed_out: true,
        }
    }
}

/// Content Source Trait
///
/// Platform implementations:
/// - `HttpContentSource` (`reqwest`, in the app crate)
/// - test mocks with call counting
///
/// Any response is returned as-is; the caller decides what a non-2xx status means.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch raw content for a locator
    ///
    /// # Arguments
    /// * `locator` - Section content locator (path or URL)
    async fn fetch(&self, locator: &str) -> Result<FetchResponse, FetchError>;
}
