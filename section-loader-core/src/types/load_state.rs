//! Per-section load bookkeeping types

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Load state of one section
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum LoadState {
    /// Never loaded, invalidated, or failed with attempts remaining
    #[default]
    NotLoaded,
    /// A pipeline for this section is in flight
    Loading,
    /// Content, controller and activation succeeded
    Loaded,
    /// Terminal failure; needs an explicit reset
    Failed { attempts: u32 },
}

impl LoadState {
    /// Whether the section is in the terminal failure state
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Read-only view of one section's bookkeeping
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SectionStatus {
    pub state: LoadState,
    /// Consecutive failed attempts since the last success or reset
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_loaded_at: Option<DateTime<Utc>>,
}

/// Snapshot entry for diagnostics output
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionSnapshot {
    pub id: String,
    pub display_title: String,
    pub active: bool,
    #[serde(flatten)]
    pub status: SectionStatus,
}

/// How a successful `request_section` call was satisfied
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum LoadOutcome {
    /// The full pipeline ran (fetch, controller, activation)
    Loaded,
    /// The section was already loaded; only activation ran
    FastPath,
    /// The caller awaited a pipeline already in flight for the same section
    Joined,
}
