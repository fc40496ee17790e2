//! Activation switch
//!
//! Keeps exactly one section container visible and owns the active-section pointer.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{LoaderError, LoaderResult};
use crate::traits::ViewTree;
use crate::types::ContainerHandle;

/// Activation switch
pub struct ActivationSwitch {
    view_tree: Arc<dyn ViewTree>,
    active: Mutex<Option<String>>,
}

impl ActivationSwitch {
    #[must_use]
    pub fn new(view_tree: Arc<dyn ViewTree>) -> Self {
        Self {
            view_tree,
            active: Mutex::new(None),
        }
    }

    /// Make `id` the only visible section
    ///
    /// The whole sweep runs under the pointer lock without suspending, so
    /// concurrent callers cannot leave two containers visible. Re-activating
    /// the active section re-runs the sweep, which only confirms visibility.
    pub fn activate(&self, id: &str) -> LoaderResult<ContainerHandle> {
        let mut active = self.active.lock();

        let target = self
            .view_tree
            .find_container(id)
            .ok_or_else(|| LoaderError::ContainerMissing(id.to_string()))?;

        if active.as_deref() == Some(id) {
            log::debug!("Section {id} already active, confirming visibility");
        }

        for container in self.view_tree.containers() {
            if container == target {
                continue;
            }
            self.view_tree.set_visible(&container, false);
            if container.section_id != id {
                self.view_tree.set_nav_indicator(&container.section_id, false);
            }
        }
        if let Some(previous) = active.as_deref() {
            if previous != id {
                self.view_tree.set_nav_indicator(previous, false);
            }
        }

        self.view_tree.set_visible(&target, true);
        self.view_tree.set_nav_indicator(id, true);
        *active = Some(id.to_string());

        Ok(target)
    }

    /// Currently visible section
    pub fn active_section(&self) -> Option<String> {
        self.active.lock().clone()
    }
}
