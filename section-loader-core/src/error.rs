//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

/// Core layer error type
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum LoaderError {
    /// The requested section id is not in the catalog
    #[error("Unknown section: {0}")]
    UnknownSection(String),

    /// Content fetch failed (non-2xx status, transport error or timeout)
    #[error("Failed to fetch content for section {id}: {detail}")]
    ContentFetch {
        id: String,
        status: Option<u16>,
        detail: String,
    },

    /// Controller `initialize`/`refresh` failed
    #[error("Controller for section {id} failed: {detail}")]
    ControllerInit { id: String, detail: String },

    /// Another load pipeline holds the gate
    #[error("Section {requested} rejected: pipeline for {in_flight} is still running")]
    ConcurrencyRejected { requested: String, in_flight: String },

    /// Bounded retries exhausted; requires an explicit reset
    #[error("Section {id} failed after {attempts} attempts: {last_error}")]
    TerminalFailure {
        id: String,
        attempts: u32,
        last_error: String,
    },

    /// Activation requested for a section with no materialized container
    #[error("No container materialized for section: {0}")]
    ContainerMissing(String),

    /// The leading pipeline was dropped before it reached an outcome
    #[error("Load pipeline for section {0} was aborted")]
    PipelineAborted(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration loading error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LoaderError {
    /// Whether it is expected behavior (user input, busy gate, exhausted retries), used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::UnknownSection(_)
            | Self::ConcurrencyRejected { .. }
            | Self::ContentFetch { .. }
            | Self::TerminalFailure { .. }
            | Self::Validation(_) => true,
            Self::ControllerInit { .. }
            | Self::ContainerMissing(_)
            | Self::PipelineAborted(_)
            | Self::Config(_) => false,
        }
    }

    /// Whether the error counts against the per-section attempt budget.
    ///
    /// Only fetch and controller failures are retryable; a busy gate is a
    /// "try again" signal and never consumes an attempt.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ContentFetch { .. } | Self::ControllerInit { .. })
    }

    /// Stable error code, identical to the serialized `code` tag
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownSection(_) => "UnknownSection",
            Self::ContentFetch { .. } => "ContentFetch",
            Self::ControllerInit { .. } => "ControllerInit",
            Self::ConcurrencyRejected { .. } => "ConcurrencyRejected",
            Self::TerminalFailure { .. } => "TerminalFailure",
            Self::ContainerMissing(_) => "ContainerMissing",
            Self::PipelineAborted(_) => "PipelineAborted",
            Self::Validation(_) => "Validation",
            Self::Config(_) => "Config",
        }
    }
}

/// Core layer Result type alias
pub type LoaderResult<T> = std::result::Result<T, LoaderError>;
