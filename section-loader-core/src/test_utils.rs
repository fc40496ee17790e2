//! Test helper module
//!
//! Provides mock implementations and convenient test factory methods.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::services::{LoadCoordinator, LoaderContext};
use crate::traits::{
    ContentSource, ControllerError, ControllerFactory, FetchError, FetchResponse,
    InMemoryViewTree, SectionController,
};
use crate::types::{ContainerHandle, LoaderConfig, SectionCatalog, SectionDescriptor};

pub fn descriptor(id: &str) -> SectionDescriptor {
    SectionDescriptor::new(id, format!("/sections/{id}.html"), id.to_uppercase(), "*")
}

pub fn test_catalog(ids: &[&str]) -> SectionCatalog {
    SectionCatalog::from_descriptors(ids.iter().map(|id| descriptor(id))).unwrap()
}

pub fn create_test_coordinator(
    catalog: SectionCatalog,
) -> (LoadCoordinator, Arc<MockContentSource>, InMemoryViewTree) {
    let source = Arc::new(MockContentSource::new());
    let tree = InMemoryViewTree::new();
    let coordinator =
        create_test_coordinator_with(catalog, source.clone(), &tree, LoaderConfig::default());
    (coordinator, source, tree)
}

pub fn create_test_coordinator_with(
    catalog: SectionCatalog,
    source: Arc<MockContentSource>,
    tree: &InMemoryViewTree,
    config: LoaderConfig,
) -> LoadCoordinator {
    let ctx = LoaderContext::new(Arc::new(catalog), source, Arc::new(tree.clone()), config);
    LoadCoordinator::new(ctx).unwrap()
}

// ===== MockContentSource =====

enum Scripted {
    Succeed,
    Status(u16),
    Transport(String),
}

/// Content source that counts calls and can fail or block on demand
pub struct MockContentSource {
    fetch_count: AtomicUsize,
    mode: Mutex<Scripted>,
    holding: AtomicBool,
    started: Arc<Notify>,
    release: Notify,
    events: Mutex<Vec<String>>,
}

impl MockContentSource {
    pub fn new() -> Self {
        Self {
            fetch_count: AtomicUsize::new(0),
            mode: Mutex::new(Scripted::Succeed),
            holding: AtomicBool::new(false),
            started: Arc::new(Notify::new()),
            release: Notify::new(),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn succeed(&self) {
        *self.mode.lock() = Scripted::Succeed;
    }

    pub fn fail_with_status(&self, status: u16) {
        *self.mode.lock() = Scripted::Status(status);
    }

    pub fn fail_with_transport_error(&self, detail: &str) {
        *self.mode.lock() = Scripted::Transport(detail.to_string());
    }

    /// Block every fetch until `release`; the returned notify fires when a fetch starts
    pub fn hold(&self) -> Arc<Notify> {
        self.holding.store(true, Ordering::SeqCst);
        Arc::clone(&self.started)
    }

    /// Let a blocked fetch finish and stop blocking new ones
    pub fn release(&self) {
        self.holding.store(false, Ordering::SeqCst);
        self.release.notify_one();
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// `start <locator>` / `end <locator>` in call order
    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl ContentSource for MockContentSource {
    async fn fetch(&self, locator: &str) -> Result<FetchResponse, FetchError> {
        let n = self.fetch_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.events.lock().push(format!("start {locator}"));

        if self.holding.load(Ordering::SeqCst) {
            self.started.notify_one();
            self.release.notified().await;
        }

        let result = match &*self.mode.lock() {
            Scripted::Succeed => Ok(FetchResponse::new(
                200,
                format!("<section data-src=\"{locator}\">content #{n}</section>"),
            )),
            Scripted::Status(status) => Ok(FetchResponse::new(*status, "error")),
            Scripted::Transport(detail) => Err(FetchError::new(detail.clone())),
        };
        self.events.lock().push(format!("end {locator}"));
        result
    }
}

// ===== Controllers =====

/// Controller that records every call and overrides `refresh`
pub struct SpyController {
    initialize_calls: AtomicU32,
    refresh_calls: AtomicU32,
    failures_left: AtomicU32,
    containers: Mutex<Vec<ContainerHandle>>,
}

impl SpyController {
    pub fn new() -> Self {
        Self {
            initialize_calls: AtomicU32::new(0),
            refresh_calls: AtomicU32::new(0),
            failures_left: AtomicU32::new(0),
            containers: Mutex::new(Vec::new()),
        }
    }

    /// Make the next `n` initialize calls fail
    pub fn fail_next_initialize(&self, n: u32) {
        self.failures_left.store(n, Ordering::SeqCst);
    }

    pub fn initialize_calls(&self) -> u32 {
        self.initialize_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> u32 {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// Containers passed to initialize/refresh, in call order
    pub fn containers(&self) -> Vec<ContainerHandle> {
        self.containers.lock().clone()
    }
}

#[async_trait]
impl SectionController for SpyController {
    async fn initialize(&self, container: &ContainerHandle) -> Result<(), ControllerError> {
        self.initialize_calls.fetch_add(1, Ordering::SeqCst);
        self.containers.lock().push(container.clone());
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ControllerError::from("initialize failed"));
        }
        Ok(())
    }

    async fn refresh(&self, container: &ContainerHandle) -> Result<(), ControllerError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.containers.lock().push(container.clone());
        Ok(())
    }
}

/// Controller relying on the default `refresh`
pub struct InitOnlyController {
    initialize_calls: AtomicU32,
}

impl InitOnlyController {
    pub fn new() -> Self {
        Self {
            initialize_calls: AtomicU32::new(0),
        }
    }

    pub fn initialize_calls(&self) -> u32 {
        self.initialize_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SectionController for InitOnlyController {
    async fn initialize(&self, _container: &ContainerHandle) -> Result<(), ControllerError> {
        self.initialize_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Factory handing out a fixed controller and counting constructions
pub struct CountingFactory {
    controller: Arc<dyn SectionController>,
    created: AtomicUsize,
    seen: Mutex<HashMap<String, usize>>,
}

impl CountingFactory {
    pub fn new(controller: Arc<dyn SectionController>) -> Self {
        Self {
            controller,
            created: AtomicUsize::new(0),
            seen: Mutex::new(HashMap::new()),
        }
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn created_for(&self, id: &str) -> usize {
        self.seen.lock().get(id).copied().unwrap_or(0)
    }
}

impl ControllerFactory for CountingFactory {
    fn create(&self, descriptor: &SectionDescriptor) -> Arc<dyn SectionController> {
        self.created.fetch_add(1, Ordering::SeqCst);
        *self.seen.lock().entry(descriptor.id.clone()).or_insert(0) += 1;
        Arc::clone(&self.controller)
    }
}
