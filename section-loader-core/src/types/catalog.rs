//! Section lookup table

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{LoaderError, LoaderResult};
use crate::traits::ControllerFactory;

use super::SectionDescriptor;

/// One catalog row: descriptor plus optional controller factory
#[derive(Clone)]
pub struct SectionEntry {
    pub descriptor: SectionDescriptor,
    pub controller_factory: Option<Arc<dyn ControllerFactory>>,
}

/// Immutable table `id -> {descriptor, controller factory}`.
///
/// Adding a section is a data entry, not a code branch. Insertion order is
/// kept for navigation listing.
#[derive(Clone, Default)]
pub struct SectionCatalog {
    entries: Vec<SectionEntry>,
    index: HashMap<String, usize>,
}

impl SectionCatalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from descriptors that have no controller
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = SectionDescriptor>,
    ) -> LoaderResult<Self> {
        let mut catalog = Self::new();
        for descriptor in descriptors {
            catalog.insert(descriptor, None)?;
        }
        Ok(catalog)
    }

    /// Add a section
    ///
    /// # Errors
    /// Returns `LoaderError::Validation` for empty ids/locators and duplicate ids.
    pub fn insert(
        &mut self,
        descriptor: SectionDescriptor,
        controller_factory: Option<Arc<dyn ControllerFactory>>,
    ) -> LoaderResult<()> {
        if descriptor.id.trim().is_empty() {
            return Err(LoaderError::Validation(
                "Section id cannot be empty".to_string(),
            ));
        }
        if descriptor.content_locator.trim().is_empty() {
            return Err(LoaderError::Validation(format!(
                "Section {} has an empty content locator",
                descriptor.id
            )));
        }
        if self.index.contains_key(&descriptor.id) {
            return Err(LoaderError::Validation(format!(
                "Duplicate section id: {}",
                descriptor.id
            )));
        }

        self.index.insert(descriptor.id.clone(), self.entries.len());
        self.entries.push(SectionEntry {
            descriptor,
            controller_factory,
        });
        Ok(())
    }

    /// Builder-style `insert`
    pub fn with_section(
        mut self,
        descriptor: SectionDescriptor,
        controller_factory: Option<Arc<dyn ControllerFactory>>,
    ) -> LoaderResult<Self> {
        self.insert(descriptor, controller_factory)?;
        Ok(self)
    }

    /// Attach or replace the controller factory of an existing section
    pub fn set_controller_factory(
        &mut self,
        id: &str,
        factory: Arc<dyn ControllerFactory>,
    ) -> LoaderResult<()> {
        let pos = *self
            .index
            .get(id)
            .ok_or_else(|| LoaderError::UnknownSection(id.to_string()))?;
        self.entries[pos].controller_factory = Some(factory);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&SectionEntry> {
        self.index.get(id).map(|&pos| &self.entries[pos])
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Descriptors in insertion order
    pub fn descriptors(&self) -> impl Iterator<Item = &SectionDescriptor> {
        self.entries.iter().map(|e| &e.descriptor)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
