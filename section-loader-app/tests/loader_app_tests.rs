#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for `LoaderAppBuilder` and the `LoaderApp` startup sequence.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use section_loader_app::{LoaderAppBuilder, NoopStartupHooks, SectionsConfig, StartupHooks};
use section_loader_core::traits::{
    ControllerError, FetchError, FetchResponse, InMemoryViewTree, SectionController,
};
use section_loader_core::types::{ContainerHandle, LoadOutcome, LoadState, SectionDescriptor};
use section_loader_core::{ContentSource, LoaderError, ViewTree};

// ===== Mock Implementations =====

/// Serves fixed bodies per locator; unknown locators answer 404.
struct StaticContentSource {
    pages: HashMap<String, (u16, String)>,
    fetches: AtomicUsize,
}

impl StaticContentSource {
    fn new() -> Self {
        Self {
            pages: HashMap::new(),
            fetches: AtomicUsize::new(0),
        }
    }

    fn page(mut self, locator: &str, body: &str) -> Self {
        self.pages
            .insert(locator.to_string(), (200, body.to_string()));
        self
    }

    fn status(mut self, locator: &str, status: u16) -> Self {
        self.pages
            .insert(locator.to_string(), (status, String::new()));
        self
    }

    fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentSource for StaticContentSource {
    async fn fetch(&self, locator: &str) -> Result<FetchResponse, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .pages
            .get(locator)
            .map_or_else(
                || FetchResponse::new(404, ""),
                |(status, body)| FetchResponse::new(*status, body.clone()),
            ))
    }
}

/// Records which hook ran, in order.
#[derive(Default)]
struct RecordingHooks {
    calls: Mutex<Vec<String>>,
}

impl RecordingHooks {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StartupHooks for RecordingHooks {
    async fn before_initial_load(&self, section_id: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("before {section_id}"));
    }

    async fn after_initial_load(&self, section_id: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("after {section_id}"));
    }

    async fn on_initial_load_failed(&self, section_id: &str, error: &LoaderError) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("failed {section_id}: {}", error.code()));
    }
}

#[derive(Default)]
struct CountingController {
    initialized: AtomicUsize,
    refreshed: AtomicUsize,
}

#[async_trait]
impl SectionController for CountingController {
    async fn initialize(&self, _container: &ContainerHandle) -> Result<(), ControllerError> {
        self.initialized.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn refresh(&self, _container: &ContainerHandle) -> Result<(), ControllerError> {
        self.refreshed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn moves() -> SectionDescriptor {
    SectionDescriptor::new("moves", "views/moves.html", "Moves", "M")
}

fn styles() -> SectionDescriptor {
    SectionDescriptor::new("styles", "views/styles.html", "Styles", "S")
}

fn site() -> Arc<StaticContentSource> {
    Arc::new(
        StaticContentSource::new()
            .page("views/moves.html", "<ul id=\"moves\"></ul>")
            .page("views/styles.html", "<ul id=\"styles\"></ul>"),
    )
}

// ===== Builder =====

#[test]
fn build_requires_content_source() {
    let result = LoaderAppBuilder::new().section(moves()).build();
    assert!(matches!(result, Err(LoaderError::Validation(_))));
}

#[test]
fn build_requires_sections() {
    let result = LoaderAppBuilder::new().content_source(site()).build();
    assert!(matches!(result, Err(LoaderError::Validation(_))));
}

#[test]
fn build_rejects_controller_for_undeclared_section() {
    let controller: Arc<dyn SectionController> = Arc::new(CountingController::default());
    let result = LoaderAppBuilder::new()
        .content_source(site())
        .section(moves())
        .controller(
            "users",
            Arc::new(move |_: &SectionDescriptor| Arc::clone(&controller)),
        )
        .build();
    assert!(matches!(result, Err(LoaderError::Validation(_))));
}

#[test]
fn build_rejects_unknown_initial_section() {
    let result = LoaderAppBuilder::new()
        .content_source(site())
        .section(moves())
        .initial_section("styles")
        .build();
    assert!(matches!(result, Err(LoaderError::Validation(_))));
}

// ===== Startup =====

#[tokio::test]
async fn startup_shows_first_section_by_default() {
    let tree = InMemoryViewTree::new();
    let app = LoaderAppBuilder::new()
        .content_source(site())
        .view_tree(Arc::new(tree.clone()))
        .section(moves())
        .section(styles())
        .build()
        .unwrap();
    let hooks = RecordingHooks::default();

    let result = app.run_startup(&hooks).await.unwrap();

    assert_eq!(result.unwrap(), LoadOutcome::Loaded);
    assert!(app.startup_completed.load(Ordering::SeqCst));
    assert_eq!(hooks.calls(), vec!["before moves", "after moves"]);
    assert_eq!(tree.visible_sections(), vec!["moves".to_string()]);
    assert_eq!(tree.active_indicators(), vec!["moves".to_string()]);
    let container = tree.find_container("moves").unwrap();
    assert_eq!(
        tree.content(&container).as_deref(),
        Some("<ul id=\"moves\"></ul>")
    );
}

#[tokio::test]
async fn startup_failure_is_reported_not_fatal() {
    let source = Arc::new(StaticContentSource::new().status("views/moves.html", 500));
    let app = LoaderAppBuilder::new()
        .content_source(source)
        .section(moves())
        .build()
        .unwrap();
    let hooks = RecordingHooks::default();

    let result = app.run_startup(&hooks).await.unwrap();

    assert!(matches!(result, Err(LoaderError::ContentFetch { .. })));
    assert!(app.startup_completed.load(Ordering::SeqCst));
    assert_eq!(hooks.calls(), vec!["before moves", "failed moves: ContentFetch"]);
    assert_eq!(
        app.coordinator.load_state("moves").unwrap().state,
        LoadState::NotLoaded
    );
}

#[tokio::test]
async fn navigation_initializes_then_refreshes_controller() {
    let source = site();
    let controller = Arc::new(CountingController::default());
    let shared: Arc<dyn SectionController> = controller.clone();
    let app = LoaderAppBuilder::new()
        .content_source(source.clone())
        .section(moves())
        .section(styles())
        .controller(
            "moves",
            Arc::new(move |_: &SectionDescriptor| Arc::clone(&shared)),
        )
        .build()
        .unwrap();
    app.run_startup(&NoopStartupHooks).await.unwrap().unwrap();

    assert_eq!(app.navigate("styles").await.unwrap(), LoadOutcome::Loaded);
    assert_eq!(app.navigate("moves").await.unwrap(), LoadOutcome::FastPath);
    assert_eq!(source.fetch_count(), 2);

    app.coordinator.invalidate("moves").unwrap();
    assert_eq!(app.navigate("moves").await.unwrap(), LoadOutcome::Loaded);

    assert_eq!(source.fetch_count(), 3);
    assert_eq!(controller.initialized.load(Ordering::SeqCst), 1);
    assert_eq!(controller.refreshed.load(Ordering::SeqCst), 1);
    assert_eq!(app.coordinator.active_section().as_deref(), Some("moves"));
}

// ===== Config file =====

#[tokio::test]
async fn config_file_drives_builder() {
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let path = tmp.path().join("sections.json");
    std::fs::write(
        &path,
        r#"{
            "initialSection": "styles",
            "loader": { "maxAttempts": 1 },
            "sections": [
                { "id": "moves", "contentLocator": "views/moves.html", "displayTitle": "Moves" },
                { "id": "styles", "contentLocator": "views/missing.html", "displayTitle": "Styles" }
            ]
        }"#,
    )
    .unwrap();

    let config = SectionsConfig::load(&path).unwrap();
    let app = LoaderAppBuilder::new()
        .content_source(site())
        .sections_config(config)
        .build()
        .unwrap();

    assert_eq!(app.initial_section().as_deref(), Some("styles"));
    let result = app.run_startup(&NoopStartupHooks).await.unwrap();

    // a single allowed attempt makes the first 404 terminal
    assert!(matches!(result, Err(LoaderError::TerminalFailure { .. })));
    let snapshot = app.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[1].id, "styles");
    assert_eq!(snapshot[1].status.state, LoadState::Failed { attempts: 1 });

    assert_eq!(app.navigate("moves").await.unwrap(), LoadOutcome::Loaded);
}

#[test]
fn missing_config_file_is_a_config_error() {
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let result = SectionsConfig::load(&tmp.path().join("absent.json"));
    assert!(matches!(result, Err(LoaderError::Config(_))));
}
