//! Type definition module

mod catalog;
mod config;
mod load_state;
mod section;

pub use catalog::{SectionCatalog, SectionEntry};
pub use config::{LoaderConfig, DEFAULT_MAX_ATTEMPTS};
pub use load_state::{LoadOutcome, LoadState, SectionSnapshot, SectionStatus};
pub use section::{ContainerHandle, SectionDescriptor};
