//! Controller registry
//!
//! Lazily creates and retains exactly one controller per section.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{LoaderError, LoaderResult};
use crate::traits::SectionController;
use crate::types::{ContainerHandle, SectionCatalog};

/// Which controller hook ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPass {
    Initialized,
    Refreshed,
}

struct ControllerSlot {
    controller: Arc<dyn SectionController>,
    /// Set once `initialize` has succeeded
    initialized: bool,
}

/// Controller registry
pub struct ControllerRegistry {
    catalog: Arc<SectionCatalog>,
    controllers: Mutex<HashMap<String, ControllerSlot>>,
}

impl ControllerRegistry {
    /// Create a registry backed by the catalog's controller factories
    #[must_use]
    pub fn new(catalog: Arc<SectionCatalog>) -> Self {
        Self {
            catalog,
            controllers: Mutex::new(HashMap::new()),
        }
    }

    /// Get the section's controller, constructing it on first use
    ///
    /// # Returns
    /// * `Ok(Some(controller))` - cached or newly built instance
    /// * `Ok(None)` - the section has no controller factory
    pub fn ensure_controller(&self, id: &str) -> LoaderResult<Option<Arc<dyn SectionController>>> {
        let entry = self
            .catalog
            .get(id)
            .ok_or_else(|| LoaderError::UnknownSection(id.to_string()))?;
        let Some(factory) = entry.controller_factory.as_ref() else {
            return Ok(None);
        };

        if let Some(controller) = self.get(id) {
            return Ok(Some(controller));
        }

        // The factory runs unlocked; it may call back into the registry
        log::debug!("Constructing controller for section {id}");
        let built = factory.create(&entry.descriptor);
        let mut controllers = self.controllers.lock();
        let slot = controllers
            .entry(id.to_string())
            .or_insert(ControllerSlot {
                controller: built,
                initialized: false,
            });
        Ok(Some(Arc::clone(&slot.controller)))
    }

    /// Run `initialize` until it has succeeded once, `refresh` afterwards
    pub async fn initialize_or_refresh(
        &self,
        id: &str,
        controller: &Arc<dyn SectionController>,
        container: &ContainerHandle,
    ) -> LoaderResult<ControllerPass> {
        let initialized = self
            .controllers
            .lock()
            .get(id)
            .is_some_and(|slot| slot.initialized);

        let (pass, result) = if initialized {
            (ControllerPass::Refreshed, controller.refresh(container).await)
        } else {
            (
                ControllerPass::Initialized,
                controller.initialize(container).await,
            )
        };

        result.map_err(|e| LoaderError::ControllerInit {
            id: id.to_string(),
            detail: e.to_string(),
        })?;

        if pass == ControllerPass::Initialized {
            if let Some(slot) = self.controllers.lock().get_mut(id) {
                slot.initialized = true;
            }
        }
        Ok(pass)
    }

    /// Cached controller, without constructing one
    pub fn get(&self, id: &str) -> Option<Arc<dyn SectionController>> {
        self.controllers
            .lock()
            .get(id)
            .map(|slot| Arc::clone(&slot.controller))
    }
}
