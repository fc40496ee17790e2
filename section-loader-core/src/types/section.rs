//! Section descriptor and container handle types

use serde::{Deserialize, Serialize};

/// Static description of one navigable section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SectionDescriptor {
    /// Unique section id (navigation key)
    pub id: String,
    /// Where the section's raw content is fetched from
    pub content_locator: String,
    /// Title shown in navigation
    pub display_title: String,
    /// Icon shown in navigation
    #[serde(default)]
    pub display_icon: String,
}

impl SectionDescriptor {
    /// Create a new descriptor
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        content_locator: impl Into<String>,
        display_title: impl Into<String>,
        display_icon: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            content_locator: content_locator.into(),
            display_title: display_title.into(),
            display_icon: display_icon.into(),
        }
    }
}

/// Handle to one materialized content container in the view tree.
///
/// `instance` is assigned by the view tree and is monotonic, so the lowest
/// instance for a section is the oldest live container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerHandle {
    pub section_id: String,
    pub instance: u64,
}

impl ContainerHandle {
    #[must_use]
    pub fn new(section_id: impl Into<String>, instance: u64) -> Self {
        Self {
            section_id: section_id.into(),
            instance,
        }
    }
}
