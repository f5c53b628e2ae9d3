//! Process-wide source registry.
//!
//! A fixed, ordered set of sources built once at startup. Nothing mutates it
//! afterwards, so lookups share it through an `Arc` without locking.

use std::sync::Arc;

use thiserror::Error;

use crate::source::{AdapterSet, SourceAdapter, SourceDescriptor, SourceLocation};

/// Errors raised while building a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two sources were registered under the same id.
    #[error("duplicate source id '{0}'")]
    DuplicateSource(String),

    /// A source id was empty or whitespace-only.
    #[error("source id must not be empty")]
    EmptyId,

    /// No adapter in this build serves the location's kind.
    #[error("source '{id}' uses unsupported backend '{kind}'")]
    UnsupportedBackend { id: String, kind: String },
}

/// A source together with the adapter that reaches it.
pub struct RegisteredSource {
    descriptor: SourceDescriptor,
    adapter: Arc<dyn SourceAdapter>,
}

impl RegisteredSource {
    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    pub fn location(&self) -> &SourceLocation {
        &self.descriptor.location
    }

    pub fn adapter(&self) -> &dyn SourceAdapter {
        self.adapter.as_ref()
    }
}

/// Ordered, read-only set of sources.
pub struct SourceRegistry {
    sources: Vec<Arc<RegisteredSource>>,
}

impl SourceRegistry {
    /// Start building a registry by hand.
    pub fn builder() -> SourceRegistryBuilder {
        SourceRegistryBuilder::default()
    }

    /// Build a registry from configured descriptors, picking adapters by kind.
    ///
    /// # Errors
    ///
    /// Fails on empty or duplicate ids and on locations this build has no
    /// adapter for.
    pub fn from_descriptors(
        descriptors: Vec<SourceDescriptor>,
        adapters: &AdapterSet,
    ) -> Result<Self, RegistryError> {
        let mut builder = Self::builder();
        for descriptor in descriptors {
            let adapter = adapters.adapter_for(&descriptor.location).ok_or_else(|| {
                RegistryError::UnsupportedBackend {
                    id: descriptor.id.clone(),
                    kind: descriptor.location.kind().to_string(),
                }
            })?;
            builder = builder.register(descriptor, adapter);
        }
        builder.build()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Registered sources in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<RegisteredSource>> {
        self.sources.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Arc<RegisteredSource>> {
        self.sources.iter().find(|s| s.id() == id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.id()).collect()
    }
}

/// Builder for [`SourceRegistry`]. Validation happens in [`build`](Self::build).
#[derive(Default)]
pub struct SourceRegistryBuilder {
    entries: Vec<(SourceDescriptor, Arc<dyn SourceAdapter>)>,
}

impl SourceRegistryBuilder {
    /// Add a source served by `adapter`.
    pub fn register(mut self, descriptor: SourceDescriptor, adapter: Arc<dyn SourceAdapter>) -> Self {
        self.entries.push((descriptor, adapter));
        self
    }

    /// Validate ids and freeze the registry.
    pub fn build(self) -> Result<SourceRegistry, RegistryError> {
        let mut sources: Vec<Arc<RegisteredSource>> = Vec::with_capacity(self.entries.len());

        for (mut descriptor, adapter) in self.entries {
            descriptor.id = descriptor.id.trim().to_string();
            if descriptor.id.is_empty() {
                return Err(RegistryError::EmptyId);
            }
            if sources.iter().any(|s| s.id() == descriptor.id) {
                return Err(RegistryError::DuplicateSource(descriptor.id));
            }
            sources.push(Arc::new(RegisteredSource {
                descriptor,
                adapter,
            }));
        }

        Ok(SourceRegistry { sources })
    }
}
