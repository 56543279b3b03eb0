//! The storage interface handed to state-persistence code.
//!
//! A [`StorageAdapter`] is cheap to build and does no I/O until its first
//! operation. That first operation resolves the engine: from the adapter's
//! own slot if already resolved, otherwise from the shared
//! [`InstanceRegistry`], otherwise by asking the [`EngineFactory`].

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::config::{CacheKey, EngineOptions, StorageConfig};
use crate::engine::{EngineFactory, StorageEngine};
use crate::error::{StorageError, StorageResult};
use crate::registry::InstanceRegistry;

/// Minimal async string storage used by state-persistence layers.
#[async_trait]
pub trait StateStorage: Send + Sync {
    /// Get the value stored under `name`, or `None` if there is none.
    async fn get_item(&self, name: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `name`, overwriting any previous value.
    async fn set_item(&self, name: &str, value: &str) -> StorageResult<()>;

    /// Remove the value under `name`. Removing a missing name succeeds.
    async fn remove_item(&self, name: &str) -> StorageResult<()>;
}

/// Lazily-resolved [`StateStorage`] over a shared engine instance.
pub struct StorageAdapter {
    config: StorageConfig,
    cache_key: CacheKey,
    options: EngineOptions,
    registry: Arc<InstanceRegistry>,
    factory: Arc<dyn EngineFactory>,
    engine: OnceCell<Arc<dyn StorageEngine>>,
}

impl std::fmt::Debug for StorageAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageAdapter")
            .field("cache_key", &self.cache_key)
            .field("resolved", &self.is_resolved())
            .finish_non_exhaustive()
    }
}

impl StorageAdapter {
    pub(crate) fn new(
        config: StorageConfig,
        registry: Arc<InstanceRegistry>,
        factory: Arc<dyn EngineFactory>,
    ) -> Self {
        Self {
            cache_key: config.cache_key(),
            options: config.engine_options(),
            config,
            registry,
            factory,
            engine: OnceCell::new(),
        }
    }

    /// The cache key this adapter resolves through.
    #[must_use]
    pub fn cache_key(&self) -> &CacheKey {
        &self.cache_key
    }

    /// The options the engine is (or will be) created with.
    #[must_use]
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// The configuration this adapter was built from, extensions included.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Whether this adapter has already resolved its engine.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.engine.initialized()
    }

    /// Resolve the engine, creating it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::EngineUnavailable`] if the engine cannot be
    /// created. Nothing is cached, so a later call retries.
    pub async fn engine(&self) -> StorageResult<Arc<dyn StorageEngine>> {
        let engine = self
            .engine
            .get_or_try_init(|| {
                self.registry
                    .get_or_create(&self.cache_key, &self.options, self.factory.as_ref())
            })
            .await?;
        Ok(Arc::clone(engine))
    }

    // -- Typed convenience (JSON) --

    /// Deserialize a JSON value stored under `name`.
    ///
    /// Returns `None` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Serialization`] if deserialization fails.
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        name: &str,
    ) -> StorageResult<Option<T>> {
        let raw = self.get_item(name).await?;
        raw.map(|s| serde_json::from_str(&s).map_err(|e| StorageError::Serialization(e.to_string())))
            .transpose()
    }

    /// Serialize `value` as JSON and store it under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Serialization`] if serialization fails.
    pub async fn set_json<T: serde::Serialize + Sync>(
        &self,
        name: &str,
        value: &T,
    ) -> StorageResult<()> {
        let raw =
            serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.set_item(name, &raw).await
    }
}

#[async_trait]
impl StateStorage for StorageAdapter {
    async fn get_item(&self, name: &str) -> StorageResult<Option<String>> {
        self.engine().await?.get_string(name).await
    }

    async fn set_item(&self, name: &str, value: &str) -> StorageResult<()> {
        self.engine().await?.set(name, value).await
    }

    async fn remove_item(&self, name: &str) -> StorageResult<()> {
        self.engine().await?.delete(name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryEngineFactory;

    fn adapter(config: StorageConfig, registry: &Arc<InstanceRegistry>) -> StorageAdapter {
        StorageAdapter::new(config, Arc::clone(registry), Arc::new(MemoryEngineFactory))
    }

    #[tokio::test]
    async fn test_resolves_lazily() {
        let registry = Arc::new(InstanceRegistry::new());
        let storage = adapter(StorageConfig::new(), &registry);

        assert!(!storage.is_resolved());
        assert!(registry.is_empty());

        storage.set_item("count", "42").await.unwrap();
        assert!(storage.is_resolved());
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_set_get_remove() {
        let registry = Arc::new(InstanceRegistry::new());
        let storage = adapter(StorageConfig::new(), &registry);

        storage.set_item("count", "42").await.unwrap();
        assert_eq!(storage.get_item("count").await.unwrap().as_deref(), Some("42"));

        storage.remove_item("count").await.unwrap();
        assert!(storage.get_item("count").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_missing_is_noop() {
        let registry = Arc::new(InstanceRegistry::new());
        let storage = adapter(StorageConfig::new(), &registry);

        storage.remove_item("never-set").await.unwrap();
        assert!(storage.get_item("never-set").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_adopts_engine_from_registry() {
        let registry = Arc::new(InstanceRegistry::new());
        let first = adapter(StorageConfig::new().with_identifier("app"), &registry);
        first.set_item("name", "Alice").await.unwrap();

        let second = adapter(StorageConfig::new().with_identifier("app"), &registry);
        assert_eq!(
            second.get_item("name").await.unwrap().as_deref(),
            Some("Alice")
        );
        assert!(Arc::ptr_eq(
            &first.engine().await.unwrap(),
            &second.engine().await.unwrap()
        ));
    }

    #[tokio::test]
    async fn test_json_round_trip() {
        #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
        struct Counter {
            count: u32,
            label: String,
        }

        let registry = Arc::new(InstanceRegistry::new());
        let storage = adapter(StorageConfig::new(), &registry);

        let state = Counter {
            count: 3,
            label: "clicks".into(),
        };
        storage.set_json("counter", &state).await.unwrap();

        let loaded: Counter = storage.get_json("counter").await.unwrap().unwrap();
        assert_eq!(loaded, state);

        let missing: Option<Counter> = storage.get_json("missing").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_get_json_rejects_malformed() {
        let registry = Arc::new(InstanceRegistry::new());
        let storage = adapter(StorageConfig::new(), &registry);

        storage.set_item("bad", "{not json").await.unwrap();
        let result: StorageResult<Option<u32>> = storage.get_json("bad").await;
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }
}
