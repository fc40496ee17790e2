//! View tree abstract Trait

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::types::ContainerHandle;

/// View Tree Trait
///
/// The live view surface that holds section containers and navigation
/// indicators. Every method is synchronous: callers rely on a sequence of
/// calls never being interleaved with a suspension point.
///
/// Only the content materializer creates or removes containers; everything
/// else reads through `find_container`.
pub trait ViewTree: Send + Sync {
    /// All live containers, oldest first
    fn containers(&self) -> Vec<ContainerHandle>;

    /// All live containers for a section, oldest first
    fn find_containers(&self, section_id: &str) -> Vec<ContainerHandle> {
        self.containers()
            .into_iter()
            .filter(|c| c.section_id == section_id)
            .collect()
    }

    /// The canonical (oldest) container for a section
    fn find_container(&self, section_id: &str) -> Option<ContainerHandle> {
        self.find_containers(section_id)
            .into_iter()
            .min_by_key(|c| c.instance)
    }

    /// Create an empty, hidden container
    fn create_container(&self, section_id: &str) -> ContainerHandle;

    /// Remove a container; returns `false` if it was already gone
    fn remove_container(&self, container: &ContainerHandle) -> bool;

    /// Replace a container's content in place; returns `false` if it is gone
    fn write_content(&self, container: &ContainerHandle, body: &str) -> bool;

    /// Show or hide a container
    fn set_visible(&self, container: &ContainerHandle, visible: bool);

    /// Turn a section's navigation indicator on or off
    fn set_nav_indicator(&self, section_id: &str, active: bool);
}

#[derive(Debug)]
struct ContainerNode {
    section_id: String,
    content: String,
    visible: bool,
}

#[derive(Debug, Default)]
struct ViewTreeState {
    next_instance: u64,
    containers: BTreeMap<u64, ContainerNode>,
    nav_indicators: HashMap<String, bool>,
    mutations: u64,
}

/// In-memory view tree
///
/// Default implementation, used by headless frontends and tests. Also
/// exposes read-only inspection helpers and a mutation counter.
#[derive(Clone, Default)]
pub struct InMemoryViewTree {
    state: Arc<Mutex<ViewTreeState>>,
}

impl InMemoryViewTree {
    /// Create an empty view tree
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current content of a container
    pub fn content(&self, container: &ContainerHandle) -> Option<String> {
        self.state
            .lock()
            .containers
            .get(&container.instance)
            .map(|node| node.content.clone())
    }

    pub fn is_visible(&self, container: &ContainerHandle) -> bool {
        self.state
            .lock()
            .containers
            .get(&container.instance)
            .is_some_and(|node| node.visible)
    }

    /// Section ids of all visible containers
    pub fn visible_sections(&self) -> Vec<String> {
        self.state
            .lock()
            .containers
            .values()
            .filter(|node| node.visible)
            .map(|node| node.section_id.clone())
            .collect()
    }

    /// Section ids whose navigation indicator is on
    pub fn active_indicators(&self) -> Vec<String> {
        let state = self.state.lock();
        let mut ids: Vec<String> = state
            .nav_indicators
            .iter()
            .filter(|(_, active)| **active)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn container_count(&self, section_id: &str) -> usize {
        self.state
            .lock()
            .containers
            .values()
            .filter(|node| node.section_id == section_id)
            .count()
    }

    /// Number of mutating calls made so far
    pub fn mutation_count(&self) -> u64 {
        self.state.lock().mutations
    }
}

impl ViewTree for InMemoryViewTree {
    fn containers(&self) -> Vec<ContainerHandle> {
        self.state
            .lock()
            .containers
            .iter()
            .map(|(instance, node)| ContainerHandle::new(node.section_id.clone(), *instance))
            .collect()
    }

    fn create_container(&self, section_id: &str) -> ContainerHandle {
        let mut state = self.state.lock();
        state.next_instance += 1;
        state.mutations += 1;
        let instance = state.next_instance;
        state.containers.insert(
            instance,
            ContainerNode {
                section_id: section_id.to_string(),
                content: String::new(),
                visible: false,
            },
        );
        ContainerHandle::new(section_id, instance)
    }

    fn remove_container(&self, container: &ContainerHandle) -> bool {
        let mut state = self.state.lock();
        state.mutations += 1;
        state.containers.remove(&container.instance).is_some()
    }

    fn write_content(&self, container: &ContainerHandle, body: &str) -> bool {
        let mut state = self.state.lock();
        state.mutations += 1;
        match state.containers.get_mut(&container.instance) {
            Some(node) => {
                node.content = body.to_string();
                true
            }
            None => false,
        }
    }

    fn set_visible(&self, container: &ContainerHandle, visible: bool) {
        let mut state = self.state.lock();
        state.mutations += 1;
        if let Some(node) = state.containers.get_mut(&container.instance) {
            node.visible = visible;
        }
    }

    fn set_nav_indicator(&self, section_id: &str, active: bool) {
        let mut state = self.state.lock();
        state.mutations += 1;
        state.nav_indicators.insert(section_id.to_string(), active);
    }
}
