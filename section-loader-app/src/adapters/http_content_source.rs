//! HTTP content source
//!
//! Resolves content locators against an optional base URL and performs a
//! plain GET. Status mapping is left to the materializer.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use section_loader_core::traits::{ContentSource, FetchError, FetchResponse};
use section_loader_core::{LoaderError, LoaderResult};

/// `ContentSource` backed by `reqwest`
pub struct HttpContentSource {
    client: Client,
    base_url: Option<Url>,
}

impl HttpContentSource {
    /// Create a source with its own client
    ///
    /// # Arguments
    /// * `base_url` - base that relative locators are joined onto; absolute
    ///   locators are used as-is when `None`
    /// * `timeout` - client-level request timeout
    pub fn new(base_url: Option<&str>, timeout: Option<Duration>) -> LoaderResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| LoaderError::Config(format!("Failed to build HTTP client: {e}")))?;
        Self::with_client(client, base_url)
    }

    /// Create a source that shares an existing client
    pub fn with_client(client: Client, base_url: Option<&str>) -> LoaderResult<Self> {
        let base_url = base_url
            .map(|raw| {
                Url::parse(raw)
                    .map_err(|e| LoaderError::Validation(format!("Invalid base URL {raw}: {e}")))
            })
            .transpose()?;
        Ok(Self { client, base_url })
    }

    fn resolve(&self, locator: &str) -> Result<Url, FetchError> {
        let resolved = match self.base_url {
            Some(ref base) => base.join(locator),
            None => Url::parse(locator),
        };
        resolved.map_err(|e| FetchError::new(format!("Invalid content locator {locator}: {e}")))
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn fetch(&self, locator: &str) -> Result<FetchResponse, FetchError> {
        let url = self.resolve(locator)?;
        log::debug!("[content] GET {url}");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::timeout(e.to_string())
            } else {
                FetchError::new(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        log::debug!("[content] Response Status: {status}");

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::new(format!("Failed to read response body: {e}")))?;
        Ok(FetchResponse::new(status, body))
    }
}
