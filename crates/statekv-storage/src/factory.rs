//! Storage factory: the composition root for adapters.
//!
//! Owns the [`InstanceRegistry`] and the injected [`EngineFactory`], and
//! builds one default adapter up front so callers that need no
//! configuration can share it.

use std::sync::Arc;

use tracing::debug;

use crate::adapter::StorageAdapter;
use crate::config::StorageConfig;
use crate::engine::EngineFactory;
use crate::registry::InstanceRegistry;

/// Builds [`StorageAdapter`]s that share engines through one registry.
///
/// # Example
///
/// ```rust,ignore
/// use statekv_storage::{MemoryEngineFactory, StateStorage, StorageConfig, StorageFactory};
///
/// let factory = StorageFactory::new(MemoryEngineFactory::new());
/// let profile = factory.create(Some(StorageConfig::new().with_identifier("user-profile")));
/// profile.set_item("name", "Alice").await?;
/// ```
pub struct StorageFactory {
    registry: Arc<InstanceRegistry>,
    engine_factory: Arc<dyn EngineFactory>,
    default_storage: Arc<StorageAdapter>,
}

impl std::fmt::Debug for StorageFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageFactory")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl StorageFactory {
    /// Create a factory with a fresh, empty registry.
    #[must_use]
    pub fn new(engine_factory: impl EngineFactory + 'static) -> Self {
        Self::from_shared(Arc::new(engine_factory))
    }

    /// Create a factory with a fresh, empty registry over an already shared
    /// engine factory.
    #[must_use]
    pub fn from_shared(engine_factory: Arc<dyn EngineFactory>) -> Self {
        Self::with_registry(engine_factory, Arc::new(InstanceRegistry::new()))
    }

    /// Create a factory over an existing registry.
    ///
    /// Factories sharing a registry share engine instances.
    #[must_use]
    pub fn with_registry(
        engine_factory: Arc<dyn EngineFactory>,
        registry: Arc<InstanceRegistry>,
    ) -> Self {
        let default_storage = Arc::new(StorageAdapter::new(
            StorageConfig::default(),
            Arc::clone(&registry),
            Arc::clone(&engine_factory),
        ));
        Self {
            registry,
            engine_factory,
            default_storage,
        }
    }

    /// Build an adapter for `config`, or for the default store if `None`.
    ///
    /// No engine is touched until the adapter's first operation.
    #[must_use]
    pub fn create(&self, config: Option<StorageConfig>) -> StorageAdapter {
        let config = config.unwrap_or_default();
        debug!(identifier = %config.identifier_or_default(), "creating storage adapter");
        StorageAdapter::new(
            config,
            Arc::clone(&self.registry),
            Arc::clone(&self.engine_factory),
        )
    }

    /// The shared zero-configuration adapter.
    #[must_use]
    pub fn default_storage(&self) -> Arc<StorageAdapter> {
        Arc::clone(&self.default_storage)
    }

    /// The registry shared by every adapter this factory builds.
    #[must_use]
    pub fn registry(&self) -> &Arc<InstanceRegistry> {
        &self.registry
    }
}
