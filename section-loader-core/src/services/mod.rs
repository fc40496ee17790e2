//! Section lifecycle services

mod activation_switch;
mod content_materializer;
mod controller_registry;
mod load_coordinator;

pub use activation_switch::ActivationSwitch;
pub use content_materializer::ContentMaterializer;
pub use controller_registry::{ControllerPass, ControllerRegistry};
pub use load_coordinator::LoadCoordinator;

use std::sync::Arc;

use crate::traits::{ContentSource, ViewTree};
use crate::types::{LoaderConfig, SectionCatalog};

/// Loader context - holds all dependencies
///
/// The platform layer creates this context and injects its content source
/// and view tree implementations.
pub struct LoaderContext {
    /// Section lookup table
    pub catalog: Arc<SectionCatalog>,
    /// Where section content comes from
    pub content_source: Arc<dyn ContentSource>,
    /// Live view surface
    pub view_tree: Arc<dyn ViewTree>,
    /// Retry/timeout tuning
    pub config: LoaderConfig,
}

impl LoaderContext {
    /// Create a loader context
    #[must_use]
    pub fn new(
        catalog: Arc<SectionCatalog>,
        content_source: Arc<dyn ContentSource>,
        view_tree: Arc<dyn ViewTree>,
        config: LoaderConfig,
    ) -> Self {
        Self {
            catalog,
            content_source,
            view_tree,
            config,
        }
    }
}
