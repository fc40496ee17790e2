//! Section controller abstract Trait

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{ContainerHandle, SectionDescriptor};

/// Failure reported by a controller
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ControllerError(pub String);

impl From<String> for ControllerError {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ControllerError {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Per-section stateful controller.
///
/// One instance lives for the lifetime of the coordinator once created. It is
/// never torn down between activations; revisits go through `refresh`.
#[async_trait]
pub trait SectionController: Send + Sync {
    /// First-time setup against the freshly materialized container
    async fn initialize(&self, container: &ContainerHandle) -> Result<(), ControllerError>;

    /// Revisit after the container's content was replaced.
    ///
    /// Controllers without a dedicated refresh path fall back to `initialize`.
    async fn refresh(&self, container: &ContainerHandle) -> Result<(), ControllerError> {
        self.initialize(container).await
    }
}

/// Builds the controller for a section on first successful load
pub trait ControllerFactory: Send + Sync {
    fn create(&self, descriptor: &SectionDescriptor) -> Arc<dyn SectionController>;
}

impl<F> ControllerFactory for F
where
    F: Fn(&SectionDescriptor) -> Arc<dyn SectionController> + Send + Sync,
{
    fn create(&self, descriptor: &SectionDescriptor) -> Arc<dyn SectionController> {
        self(descriptor)
    }
}
