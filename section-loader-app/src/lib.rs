//! Platform-agnostic application bootstrap for the section loader.
//!
//! Provides `LoaderApp` (coordinator container), `LoaderAppBuilder` (adapter
//! injection), `StartupHooks` (platform-specific startup callbacks) and the
//! JSON sections configuration.

pub mod adapters;
pub mod config;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use section_loader_core::traits::InMemoryViewTree;
use section_loader_core::types::{
    LoadOutcome, LoaderConfig, SectionCatalog, SectionDescriptor, SectionSnapshot,
};
use section_loader_core::{
    ContentSource, ControllerFactory, LoadCoordinator, LoaderContext, LoaderError, LoaderResult,
    ViewTree,
};

pub use config::SectionsConfig;

/// Platform-specific hooks for the startup sequence.
///
/// Use `NoopStartupHooks` if the frontend has nothing to do around the
/// initial load.
#[async_trait::async_trait]
pub trait StartupHooks: Send + Sync {
    /// Called before the initial section is requested.
    async fn before_initial_load(&self, _section_id: &str) {}

    /// Called once the initial section is visible.
    async fn after_initial_load(&self, _section_id: &str) {}

    /// Called when the initial section could not be shown.
    async fn on_initial_load_failed(&self, _section_id: &str, _error: &LoaderError) {}
}

/// No-op startup hooks.
pub struct NoopStartupHooks;

#[async_trait::async_trait]
impl StartupHooks for NoopStartupHooks {}

/// Platform-agnostic application state.
///
/// Every frontend constructs this once at startup via `LoaderAppBuilder`.
pub struct LoaderApp {
    /// Navigation entry point
    pub coordinator: Arc<LoadCoordinator>,
    /// View surface the coordinator writes to
    pub view_tree: Arc<dyn ViewTree>,
    initial_section: Option<String>,
    /// Whether the startup sequence has completed
    pub startup_completed: AtomicBool,
}

impl LoaderApp {
    /// Run the startup sequence: show the initial section.
    ///
    /// A failed initial load is reported through the hooks and logged; it
    /// does not fail startup.
    ///
    /// # Returns
    /// * `Some(result)` - outcome of the initial request
    /// * `None` - no initial section could be determined
    pub async fn run_startup(
        &self,
        hooks: &dyn StartupHooks,
    ) -> Option<LoaderResult<LoadOutcome>> {
        let Some(id) = self.initial_section() else {
            log::warn!("No sections declared, skipping initial load");
            self.startup_completed.store(true, Ordering::SeqCst);
            return None;
        };

        hooks.before_initial_load(&id).await;
        let result = self.coordinator.request_section(&id).await;
        match &result {
            Ok(outcome) => {
                log::info!("Initial section {id} shown ({outcome:?})");
                hooks.after_initial_load(&id).await;
            }
            Err(e) => {
                log::error!("Initial section {id} failed to load: {e}");
                hooks.on_initial_load_failed(&id, e).await;
            }
        }

        self.startup_completed.store(true, Ordering::SeqCst);
        Some(result)
    }

    /// Configured initial section, falling back to the first declared one
    #[must_use]
    pub fn initial_section(&self) -> Option<String> {
        self.initial_section.clone().or_else(|| {
            self.coordinator
                .sections()
                .into_iter()
                .next()
                .map(|d| d.id)
        })
    }

    /// Navigate to a section
    pub async fn navigate(&self, id: &str) -> LoaderResult<LoadOutcome> {
        self.coordinator.request_section(id).await
    }

    /// Per-section navigation state
    #[must_use]
    pub fn snapshot(&self) -> Vec<SectionSnapshot> {
        self.coordinator.snapshot()
    }
}

/// Builder for constructing `LoaderApp` with platform-specific adapters.
///
/// # Required
/// - `content_source` - where section content comes from
/// - at least one section
///
/// # Optional
/// - `view_tree` - defaults to `InMemoryViewTree`
/// - `config` - defaults to `LoaderConfig::default()`
pub struct LoaderAppBuilder {
    sections: Vec<SectionDescriptor>,
    controllers: HashMap<String, Arc<dyn ControllerFactory>>,
    content_source: Option<Arc<dyn ContentSource>>,
    view_tree: Option<Arc<dyn ViewTree>>,
    config: LoaderConfig,
    initial_section: Option<String>,
}

impl LoaderAppBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sections: Vec::new(),
            controllers: HashMap::new(),
            content_source: None,
            view_tree: None,
            config: LoaderConfig::default(),
            initial_section: None,
        }
    }

    /// Take sections, loader tuning and the initial section from a config file
    #[must_use]
    pub fn sections_config(mut self, config: SectionsConfig) -> Self {
        self.sections.extend(config.sections);
        self.config = config.loader;
        if config.initial_section.is_some() {
            self.initial_section = config.initial_section;
        }
        self
    }

    #[must_use]
    pub fn section(mut self, descriptor: SectionDescriptor) -> Self {
        self.sections.push(descriptor);
        self
    }

    /// Attach a controller factory to a declared section
    #[must_use]
    pub fn controller(mut self, id: impl Into<String>, factory: Arc<dyn ControllerFactory>) -> Self {
        self.controllers.insert(id.into(), factory);
        self
    }

    #[must_use]
    pub fn content_source(mut self, source: Arc<dyn ContentSource>) -> Self {
        self.content_source = Some(source);
        self
    }

    #[must_use]
    pub fn view_tree(mut self, view_tree: Arc<dyn ViewTree>) -> Self {
        self.view_tree = Some(view_tree);
        self
    }

    #[must_use]
    pub fn config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn initial_section(mut self, id: impl Into<String>) -> Self {
        self.initial_section = Some(id.into());
        self
    }

    /// Build the `LoaderApp`.
    ///
    /// # Errors
    /// Returns `LoaderError::Validation` if required adapters are missing, the
    /// section table is invalid, or a controller/initial section names an
    /// undeclared section.
    pub fn build(self) -> LoaderResult<LoaderApp> {
        let content_source = self.content_source.ok_or_else(|| {
            LoaderError::Validation("content_source is required".to_string())
        })?;
        let view_tree = self
            .view_tree
            .unwrap_or_else(|| Arc::new(InMemoryViewTree::new()));

        let mut catalog = SectionCatalog::from_descriptors(self.sections)?;
        if catalog.is_empty() {
            return Err(LoaderError::Validation(
                "At least one section is required".to_string(),
            ));
        }
        for (id, factory) in self.controllers {
            catalog
                .set_controller_factory(&id, factory)
                .map_err(|_| {
                    LoaderError::Validation(format!(
                        "Controller registered for undeclared section {id}"
                    ))
                })?;
        }
        if let Some(ref id) = self.initial_section {
            if !catalog.contains(id) {
                return Err(LoaderError::Validation(format!(
                    "Initial section {id} is not declared"
                )));
            }
        }
        log::info!("Section loader ready with {} section(s)", catalog.len());

        let ctx = LoaderContext::new(
            Arc::new(catalog),
            content_source,
            Arc::clone(&view_tree),
            self.config,
        );
        let coordinator = Arc::new(LoadCoordinator::new(ctx)?);

        Ok(LoaderApp {
            coordinator,
            view_tree,
            initial_section: self.initial_section,
            startup_completed: AtomicBool::new(false),
        })
    }
}

impl Default for LoaderAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
