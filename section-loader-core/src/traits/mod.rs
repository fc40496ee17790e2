//! Collaborator abstraction trait definition

mod content_source;
mod controller;
mod view_tree;

pub use content_source::{ContentSource, FetchError, FetchResponse};
pub use controller::{ControllerError, ControllerFactory, SectionController};
pub use view_tree::{InMemoryViewTree, ViewTree};
