//! Content materialization service
//!
//! Sole owner of container creation and removal: fetches a section's raw
//! content and writes it into exactly one canonical container.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{LoaderError, LoaderResult};
use crate::traits::{ContentSource, FetchError, FetchResponse, ViewTree};
use crate::types::{ContainerHandle, SectionDescriptor};

/// Content materialization service
pub struct ContentMaterializer {
    content_source: Arc<dyn ContentSource>,
    view_tree: Arc<dyn ViewTree>,
    fetch_timeout: Option<Duration>,
}

impl ContentMaterializer {
    /// Create a materializer instance
    #[must_use]
    pub fn new(
        content_source: Arc<dyn ContentSource>,
        view_tree: Arc<dyn ViewTree>,
        fetch_timeout: Option<Duration>,
    ) -> Self {
        Self {
            content_source,
            view_tree,
            fetch_timeout,
        }
    }

    /// Fetch a section's content and write it into its canonical container
    ///
    /// Flow: prune duplicates -> fetch -> prune -> reuse or create -> write -> prune.
    /// An existing container has its content replaced in place so that
    /// handles held by the controller stay valid.
    pub async fn ensure_content(
        &self,
        descriptor: &SectionDescriptor,
    ) -> LoaderResult<ContainerHandle> {
        let id = descriptor.id.as_str();

        // 1. Prune before the suspension point
        self.prune_duplicates(id);

        // 2. Fetch
        let response = self.fetch(descriptor).await?;
        if !response.is_success() {
            return Err(LoaderError::ContentFetch {
                id: id.to_string(),
                status: Some(response.status),
                detail: format!("HTTP {}", response.status),
            });
        }

        // 3. Re-check after the suspension point, then reuse or create
        let container = if let Some(existing) = self.prune_duplicates(id) {
            log::debug!("Replacing content of section {id} in place");
            existing
        } else {
            log::debug!("Creating container for section {id}");
            self.view_tree.create_container(id)
        };

        // 4. Write
        if !self.view_tree.write_content(&container, &response.body) {
            return Err(LoaderError::ContainerMissing(id.to_string()));
        }

        // 5. Enforce the invariant once more after writing
        Ok(self.prune_duplicates(id).unwrap_or(container))
    }

    /// Remove every container of a section except the oldest one
    ///
    /// Returns the kept container, if any.
    pub fn prune_duplicates(&self, section_id: &str) -> Option<ContainerHandle> {
        let mut containers = self.view_tree.find_containers(section_id);
        containers.sort_by_key(|c| c.instance);

        let mut iter = containers.into_iter();
        let keep = iter.next()?;
        for duplicate in iter {
            log::warn!(
                "Removing duplicate container #{} for section {section_id} (keeping #{})",
                duplicate.instance,
                keep.instance
            );
            self.view_tree.remove_container(&duplicate);
        }
        Some(keep)
    }

    async fn fetch(&self, descriptor: &SectionDescriptor) -> LoaderResult<FetchResponse> {
        let locator = descriptor.content_locator.as_str();
        log::debug!("[{}] GET {locator}", descriptor.id);

        let fetch = self.content_source.fetch(locator);
        let result = match self.fetch_timeout {
            Some(timeout) => tokio::time::timeout(timeout, fetch)
                .await
                .unwrap_or_else(|_| {
                    Err(FetchError::timeout(format!(
                        "no response within {}ms",
                        timeout.as_millis()
                    )))
                }),
            None => fetch.await,
        };

        result.map_err(|e| {
            let detail = if e.timed_out {
                log::warn!("[{}] Fetch of {locator} timed out: {e}", descriptor.id);
                format!("Timed out: {}", e.detail)
            } else {
                log::warn!("[{}] Fetch of {locator} failed: {e}", descriptor.id);
                e.detail
            };
            LoaderError::ContentFetch {
                id: descriptor.id.clone(),
                status: None,
                detail,
            }
        })
    }
}
