//! Sections configuration file
//!
//! JSON document declaring the section table and loader tuning:
//!
//! ```json
//! {
//!   "baseUrl": "http://localhost:8080/",
//!   "initialSection": "moves",
//!   "loader": { "maxAttempts": 3, "fetchTimeoutMs": 5000 },
//!   "sections": [
//!     { "id": "moves", "contentLocator": "views/moves.html", "displayTitle": "Moves", "displayIcon": "M" }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use section_loader_core::types::{LoaderConfig, SectionCatalog, SectionDescriptor};
use section_loader_core::{LoaderError, LoaderResult};

/// Parsed sections configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SectionsConfig {
    /// Base URL that relative content locators are resolved against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Section shown at startup (defaults to the first section)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_section: Option<String>,
    #[serde(default)]
    pub loader: LoaderConfig,
    pub sections: Vec<SectionDescriptor>,
}

impl SectionsConfig {
    /// Read and validate a configuration file
    pub fn load(path: &Path) -> LoaderResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            LoaderError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        let config = Self::from_json_str(&raw)?;
        log::info!(
            "Loaded {} section(s) from {}",
            config.sections.len(),
            path.display()
        );
        Ok(config)
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(raw: &str) -> LoaderResult<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| LoaderError::Config(format!("Invalid sections config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check ranges, ids and the initial section
    pub fn validate(&self) -> LoaderResult<()> {
        self.loader.validate()?;
        if self.sections.is_empty() {
            return Err(LoaderError::Validation(
                "At least one section is required".to_string(),
            ));
        }
        let catalog = SectionCatalog::from_descriptors(self.sections.iter().cloned())?;
        if let Some(ref initial) = self.initial_section {
            if !catalog.contains(initial) {
                return Err(LoaderError::Validation(format!(
                    "Initial section {initial} is not declared"
                )));
            }
        }
        Ok(())
    }

    /// Initial section, falling back to the first declared one
    #[must_use]
    pub fn initial_section_id(&self) -> Option<&str> {
        self.initial_section
            .as_deref()
            .or_else(|| self.sections.first().map(|s| s.id.as_str()))
    }
}
