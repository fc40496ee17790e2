//! Content source adapters

#[cfg(feature = "http-source")]
mod http_content_source;

#[cfg(feature = "http-source")]
pub use http_content_source::HttpContentSource;
