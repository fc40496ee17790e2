//! Load coordinator
//!
//! Single entry point for section navigation. Enforces:
//! - one pipeline in flight at a time across all sections (the gate);
//! - same-section callers join the in-flight pipeline (single-flight);
//! - bounded retries per section, converted to a terminal failure.
//!
//! Requests that arrive while the gate is held for another section are
//! rejected with `ConcurrencyRejected`; they are never queued or merged.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::error::{LoaderError, LoaderResult};
use crate::traits::SectionController;
use crate::types::{
    LoadOutcome, LoadState, LoaderConfig, SectionCatalog, SectionDescriptor, SectionSnapshot,
    SectionStatus,
};

use super::{ActivationSwitch, ContentMaterializer, ControllerRegistry, LoaderContext};

type PipelineResult = Option<LoaderResult<()>>;

/// Pipeline currently holding the gate
struct InFlightLoad {
    section_id: String,
    tx: watch::Sender<PipelineResult>,
    rx: watch::Receiver<PipelineResult>,
}

#[derive(Default)]
struct CoordinatorState {
    statuses: HashMap<String, SectionStatus>,
    in_flight: Option<Arc<InFlightLoad>>,
}

/// How an incoming request is admitted
enum Admission {
    FastPath,
    Join(watch::Receiver<PipelineResult>),
    Lead(Arc<InFlightLoad>),
}

/// Load coordinator
pub struct LoadCoordinator {
    catalog: Arc<SectionCatalog>,
    config: LoaderConfig,
    materializer: ContentMaterializer,
    registry: ControllerRegistry,
    switch: ActivationSwitch,
    state: Mutex<CoordinatorState>,
}

impl LoadCoordinator {
    /// Create a coordinator from a loader context
    ///
    /// # Errors
    /// Returns `LoaderError::Validation` if the configuration is out of range.
    pub fn new(ctx: LoaderContext) -> LoaderResult<Self> {
        ctx.config.validate()?;

        let materializer = ContentMaterializer::new(
            Arc::clone(&ctx.content_source),
            Arc::clone(&ctx.view_tree),
            ctx.config.fetch_timeout(),
        );
        let registry = ControllerRegistry::new(Arc::clone(&ctx.catalog));
        let switch = ActivationSwitch::new(Arc::clone(&ctx.view_tree));

        Ok(Self {
            catalog: ctx.catalog,
            config: ctx.config,
            materializer,
            registry,
            switch,
            state: Mutex::new(CoordinatorState::default()),
        })
    }

    /// Navigate to a section
    ///
    /// Flow: gate/dedupe -> fetch content -> ensure controller ->
    /// initialize or refresh -> activate.
    pub async fn request_section(&self, id: &str) -> LoaderResult<LoadOutcome> {
        self.request(id, false).await
    }

    async fn request(&self, id: &str, refetch: bool) -> LoaderResult<LoadOutcome> {
        let Some(entry) = self.catalog.get(id) else {
            log::warn!("Requested unknown section: {id}");
            return Err(LoaderError::UnknownSection(id.to_string()));
        };

        let admission = match self.admit(id, refetch) {
            Ok(admission) => admission,
            Err(e) => {
                log_error(&e);
                return Err(e);
            }
        };

        match admission {
            Admission::FastPath => {
                log::debug!("Section {id} already loaded, re-activated");
                Ok(LoadOutcome::FastPath)
            }
            Admission::Join(rx) => {
                log::debug!("Section {id} is loading, joining in-flight pipeline");
                wait_for_pipeline(id, rx).await.map(|()| LoadOutcome::Joined)
            }
            Admission::Lead(in_flight) => {
                log::info!("Loading section {id}");
                let guard = PipelineGuard::new(self, in_flight);
                let result = self.run_pipeline(&entry.descriptor).await;
                let result = guard.complete(result);
                match &result {
                    Ok(()) => log::info!("Section {id} loaded"),
                    Err(e) => log_error(e),
                }
                result.map(|()| LoadOutcome::Loaded)
            }
        }
    }

    /// Decide, in one non-suspending step, how a request proceeds
    ///
    /// With `refetch` a loaded section skips the fast path and leads a new
    /// pipeline. Its state only changes once the gate has been taken.
    fn admit(&self, id: &str, refetch: bool) -> LoaderResult<Admission> {
        let mut state = self.state.lock();

        if let Some(in_flight) = &state.in_flight {
            if in_flight.section_id == id {
                return Ok(Admission::Join(in_flight.rx.clone()));
            }
            return Err(LoaderError::ConcurrencyRejected {
                requested: id.to_string(),
                in_flight: in_flight.section_id.clone(),
            });
        }

        let status = state.statuses.entry(id.to_string()).or_default();
        match status.state {
            LoadState::Failed { attempts } => {
                return Err(LoaderError::TerminalFailure {
                    id: id.to_string(),
                    attempts,
                    last_error: status.last_error.clone().unwrap_or_default(),
                });
            }
            LoadState::Loaded if refetch => {
                log::debug!("Reloading section {id}");
            }
            LoadState::Loaded => match self.switch.activate(id) {
                Ok(_) => return Ok(Admission::FastPath),
                Err(LoaderError::ContainerMissing(_)) => {
                    log::warn!("Container for loaded section {id} disappeared, reloading");
                }
                Err(e) => return Err(e),
            },
            LoadState::NotLoaded | LoadState::Loading => {}
        }

        status.state = LoadState::Loading;
        let (tx, rx) = watch::channel(None);
        let in_flight = Arc::new(InFlightLoad {
            section_id: id.to_string(),
            tx,
            rx,
        });
        state.in_flight = Some(Arc::clone(&in_flight));
        Ok(Admission::Lead(in_flight))
    }

    async fn run_pipeline(&self, descriptor: &SectionDescriptor) -> LoaderResult<()> {
        let id = descriptor.id.as_str();

        // 1. Content
        let container = self.materializer.ensure_content(descriptor).await?;

        // 2. Controller
        if let Some(controller) = self.registry.ensure_controller(id)? {
            let pass = self
                .registry
                .initialize_or_refresh(id, &controller, &container)
                .await?;
            log::debug!("Controller for section {id}: {pass:?}");
        }

        // 3. Activation
        self.switch.activate(id)?;
        Ok(())
    }

    /// Record a pipeline outcome and release the gate
    fn finish(
        &self,
        in_flight: &Arc<InFlightLoad>,
        result: LoaderResult<()>,
    ) -> LoaderResult<()> {
        let mut state = self.state.lock();
        let id = in_flight.section_id.as_str();
        let max_attempts = self.config.max_attempts;
        let status = state.statuses.entry(id.to_string()).or_default();

        let result = match result {
            Ok(()) => {
                status.state = LoadState::Loaded;
                status.attempts = 0;
                status.last_error = None;
                status.last_loaded_at = Some(Utc::now());
                Ok(())
            }
            Err(e) if e.is_retryable() => {
                status.attempts += 1;
                status.last_error = Some(e.to_string());
                if status.attempts >= max_attempts {
                    status.state = LoadState::Failed {
                        attempts: status.attempts,
                    };
                    Err(LoaderError::TerminalFailure {
                        id: id.to_string(),
                        attempts: status.attempts,
                        last_error: e.to_string(),
                    })
                } else {
                    status.state = LoadState::NotLoaded;
                    log::debug!(
                        "Section {id} attempt {}/{max_attempts} failed",
                        status.attempts
                    );
                    Err(e)
                }
            }
            Err(e) => {
                status.state = LoadState::NotLoaded;
                status.last_error = Some(e.to_string());
                Err(e)
            }
        };

        release(&mut state, in_flight, result.clone());
        result
    }

    /// Revert a pipeline that was dropped before finishing
    fn abort(&self, in_flight: &Arc<InFlightLoad>) {
        let mut state = self.state.lock();
        let id = in_flight.section_id.as_str();
        log::warn!("Load pipeline for section {id} dropped before completion");
        if let Some(status) = state.statuses.get_mut(id) {
            if status.state == LoadState::Loading {
                status.state = LoadState::NotLoaded;
            }
        }
        release(
            &mut state,
            in_flight,
            Err(LoaderError::PipelineAborted(id.to_string())),
        );
    }

    /// Clear a terminal failure (or pending attempt count) so the section can load again
    pub fn reset(&self, id: &str) -> LoaderResult<()> {
        self.ensure_known(id)?;
        let mut state = self.state.lock();
        if let Some(in_flight) = state.in_flight.as_ref().filter(|f| f.section_id == id) {
            return Err(LoaderError::ConcurrencyRejected {
                requested: id.to_string(),
                in_flight: in_flight.section_id.clone(),
            });
        }

        let status = state.statuses.entry(id.to_string()).or_default();
        if status.state.is_terminal() {
            log::info!("Resetting failed section {id}");
            status.state = LoadState::NotLoaded;
        }
        status.attempts = 0;
        status.last_error = None;
        Ok(())
    }

    /// Mark loaded content stale; the next request reloads it in place
    pub fn invalidate(&self, id: &str) -> LoaderResult<()> {
        self.ensure_known(id)?;
        let mut state = self.state.lock();
        if let Some(in_flight) = state.in_flight.as_ref().filter(|f| f.section_id == id) {
            return Err(LoaderError::ConcurrencyRejected {
                requested: id.to_string(),
                in_flight: in_flight.section_id.clone(),
            });
        }

        if let Some(status) = state.statuses.get_mut(id) {
            if status.state == LoadState::Loaded {
                log::debug!("Invalidating section {id}");
                status.state = LoadState::NotLoaded;
            }
        }
        Ok(())
    }

    /// Refetch a section in place and show it
    ///
    /// Rejected like any other request while a pipeline holds the gate, in
    /// which case the section keeps its current state.
    pub async fn reload(&self, id: &str) -> LoaderResult<LoadOutcome> {
        self.request(id, true).await
    }

    /// Read-only state of one section; `None` for unknown ids
    pub fn load_state(&self, id: &str) -> Option<SectionStatus> {
        if !self.catalog.contains(id) {
            return None;
        }
        Some(self.state.lock().statuses.get(id).cloned().unwrap_or_default())
    }

    /// State of every section, in catalog order
    pub fn snapshot(&self) -> Vec<SectionSnapshot> {
        let active = self.switch.active_section();
        let state = self.state.lock();
        self.catalog
            .descriptors()
            .map(|d| SectionSnapshot {
                id: d.id.clone(),
                display_title: d.display_title.clone(),
                active: active.as_deref() == Some(d.id.as_str()),
                status: state.statuses.get(&d.id).cloned().unwrap_or_default(),
            })
            .collect()
    }

    /// Currently visible section
    pub fn active_section(&self) -> Option<String> {
        self.switch.active_section()
    }

    /// Whether a pipeline currently holds the gate
    pub fn is_busy(&self) -> bool {
        self.state.lock().in_flight.is_some()
    }

    /// Section descriptors in navigation order
    pub fn sections(&self) -> Vec<SectionDescriptor> {
        self.catalog.descriptors().cloned().collect()
    }

    /// Controller of a section, if it has been constructed
    pub fn controller(&self, id: &str) -> Option<Arc<dyn SectionController>> {
        self.registry.get(id)
    }

    fn ensure_known(&self, id: &str) -> LoaderResult<()> {
        if self.catalog.contains(id) {
            Ok(())
        } else {
            Err(LoaderError::UnknownSection(id.to_string()))
        }
    }
}

/// Publish the outcome to joined callers and open the gate
fn release(
    state: &mut CoordinatorState,
    in_flight: &Arc<InFlightLoad>,
    result: LoaderResult<()>,
) {
    if state
        .in_flight
        .as_ref()
        .is_some_and(|current| Arc::ptr_eq(current, in_flight))
    {
        state.in_flight = None;
    }
    let _ = in_flight.tx.send(Some(result));
}

async fn wait_for_pipeline(
    id: &str,
    mut rx: watch::Receiver<PipelineResult>,
) -> LoaderResult<()> {
    loop {
        let result = rx.borrow().clone();
        if let Some(result) = result {
            return result;
        }
        if rx.changed().await.is_err() {
            return Err(LoaderError::PipelineAborted(id.to_string()));
        }
    }
}

fn log_error(e: &LoaderError) {
    if e.is_expected() {
        log::warn!("{e}");
    } else {
        log::error!("{e}");
    }
}

/// Releases the gate if the leading pipeline is dropped before it finishes.
struct PipelineGuard<'a> {
    coordinator: &'a LoadCoordinator,
    in_flight: Arc<InFlightLoad>,
    completed: bool,
}

impl<'a> PipelineGuard<'a> {
    fn new(coordinator: &'a LoadCoordinator, in_flight: Arc<InFlightLoad>) -> Self {
        Self {
            coordinator,
            in_flight,
            completed: false,
        }
    }

    fn complete(mut self, result: LoaderResult<()>) -> LoaderResult<()> {
        self.completed = true;
        self.coordinator.finish(&self.in_flight, result)
    }
}

impl Drop for PipelineGuard<'_> {
    fn drop(&mut self) {
        if !self.completed {
            self.coordinator.abort(&self.in_flight);
        }
    }
}
