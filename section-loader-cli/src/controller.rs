//! Controller attached to every section when driven from the command line

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use section_loader_core::traits::{ControllerError, SectionController};
use section_loader_core::types::{ContainerHandle, SectionDescriptor};

/// Logs each lifecycle hook and counts refreshes
pub struct LoggingController {
    section_id: String,
    refreshes: AtomicU32,
}

impl LoggingController {
    pub fn new(descriptor: &SectionDescriptor) -> Self {
        Self {
            section_id: descriptor.id.clone(),
            refreshes: AtomicU32::new(0),
        }
    }

    /// Factory closure for `LoaderAppBuilder::controller`
    pub fn factory(descriptor: &SectionDescriptor) -> Arc<dyn SectionController> {
        Arc::new(Self::new(descriptor))
    }
}

#[async_trait]
impl SectionController for LoggingController {
    async fn initialize(&self, container: &ContainerHandle) -> Result<(), ControllerError> {
        tracing::info!(
            section = %self.section_id,
            instance = container.instance,
            "controller initialized"
        );
        Ok(())
    }

    async fn refresh(&self, container: &ContainerHandle) -> Result<(), ControllerError> {
        let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(
            section = %self.section_id,
            instance = container.instance,
            refreshes = n,
            "controller refreshed"
        );
        Ok(())
    }
}
