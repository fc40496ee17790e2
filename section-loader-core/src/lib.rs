//! Section Loader Core Library
//!
//! Section lifecycle loading for navigable multi-view applications:
//! - Content Materializer: fetches a section's content into exactly one container
//! - Controller Registry: one lazily built controller per section, `initialize` then `refresh`
//! - Activation Switch: exactly one visible section and the active-section pointer
//! - Load Coordinator: the entry point, with single-flight joins, a non-reentrant
//!   gate and bounded retries
//!
//! This library performs no I/O of its own; content sources and the view tree are
//! injected through traits so that any frontend can host it.

pub mod error;
pub mod services;
pub mod traits;
pub mod types;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test_utils;

// Re-export common types
pub use error::{LoaderError, LoaderResult};
pub use services::{LoadCoordinator, LoaderContext};
pub use traits::{ContentSource, ControllerFactory, SectionController, ViewTree};
