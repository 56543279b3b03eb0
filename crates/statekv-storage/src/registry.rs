//! Instance registry.
//!
//! Maps a [`CacheKey`] to the engine instance opened for it. Entries are
//! only ever added, never evicted: the key space is small and chosen by the
//! application, and dropping an engine that adapters still hold would split
//! one logical store into two.
//!
//! Creation is single-flight per key. Each key owns a
//! [`tokio::sync::OnceCell`]; concurrent first uses wait on the one
//! in-flight creation, and a failed creation leaves the cell empty so the
//! next caller retries from scratch.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::config::{CacheKey, EngineOptions};
use crate::engine::{EngineFactory, StorageEngine};
use crate::error::{StorageError, StorageResult};

type EngineCell = Arc<OnceCell<Arc<dyn StorageEngine>>>;

/// Registry of opened engine instances, keyed by [`CacheKey`].
#[derive(Default)]
pub struct InstanceRegistry {
    cells: Mutex<HashMap<CacheKey, EngineCell>>,
}

impl std::fmt::Debug for InstanceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceRegistry")
            .field("instances", &self.len())
            .finish_non_exhaustive()
    }
}

impl InstanceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The engine registered for `key`, if one has been created.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<Arc<dyn StorageEngine>> {
        let cells = self.cells.lock().ok()?;
        cells.get(key).and_then(|cell| cell.get().cloned())
    }

    /// Whether an engine has been created for `key`.
    #[must_use]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.get(key).is_some()
    }

    /// Number of created engine instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.lock().map_or(0, |cells| {
            cells.values().filter(|cell| cell.initialized()).count()
        })
    }

    /// Whether no engine has been created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the engine for `key`, creating it through `factory` if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::EngineUnavailable`] if the factory fails.
    /// The failure is not remembered.
    pub async fn get_or_create(
        &self,
        key: &CacheKey,
        options: &EngineOptions,
        factory: &dyn EngineFactory,
    ) -> StorageResult<Arc<dyn StorageEngine>> {
        let cell = self.cell_for(key)?;
        if let Some(engine) = cell.get() {
            debug!(identifier = %key.identifier(), "engine found in registry");
            return Ok(Arc::clone(engine));
        }

        let engine = cell
            .get_or_try_init(|| async {
                match factory.create(options).await {
                    Ok(engine) => {
                        info!(identifier = %options.identifier, "storage engine created");
                        Ok(engine)
                    },
                    Err(e) => {
                        warn!(
                            identifier = %options.identifier,
                            error = %e,
                            "failed to initialize storage engine"
                        );
                        Err(StorageError::engine_unavailable(&e))
                    },
                }
            })
            .await?;
        Ok(Arc::clone(engine))
    }

    /// The cell for `key`, inserting an empty one on first sight.
    ///
    /// The lock is released before any `.await`.
    fn cell_for(&self, key: &CacheKey) -> StorageResult<EngineCell> {
        let mut cells = self
            .cells
            .lock()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(Arc::clone(cells.entry(key.clone()).or_default()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::config::StorageConfig;
    use crate::memory::MemoryEngine;

    struct CountingFactory {
        calls: AtomicUsize,
        fail_first: usize,
    }

    impl CountingFactory {
        fn new(fail_first: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_first,
            }
        }
    }

    #[async_trait::async_trait]
    impl EngineFactory for CountingFactory {
        async fn create(&self, _options: &EngineOptions) -> StorageResult<Arc<dyn StorageEngine>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            if n < self.fail_first {
                return Err(StorageError::Connection("native module missing".into()));
            }
            Ok(Arc::new(MemoryEngine::new()))
        }
    }

    #[tokio::test]
    async fn test_creates_once_per_key() {
        let registry = InstanceRegistry::new();
        let factory = CountingFactory::new(0);
        let cfg = StorageConfig::new().with_identifier("app");

        let a = registry
            .get_or_create(&cfg.cache_key(), &cfg.engine_options(), &factory)
            .await
            .unwrap();
        let b = registry
            .get_or_create(&cfg.cache_key(), &cfg.engine_options(), &factory)
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(factory.calls.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&cfg.cache_key()));
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let registry = InstanceRegistry::new();
        let factory = CountingFactory::new(1);
        let cfg = StorageConfig::new();

        let first = registry
            .get_or_create(&cfg.cache_key(), &cfg.engine_options(), &factory)
            .await;
        assert!(matches!(
            first,
            Err(StorageError::EngineUnavailable { .. })
        ));
        assert!(registry.is_empty());

        registry
            .get_or_create(&cfg.cache_key(), &cfg.engine_options(), &factory)
            .await
            .unwrap();
        assert_eq!(factory.calls.load(Ordering::SeqCst), 2);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_first_use_creates_once() {
        let registry = Arc::new(InstanceRegistry::new());
        let factory = Arc::new(CountingFactory::new(0));
        let cfg = StorageConfig::new().with_identifier("contended");

        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = Arc::clone(&registry);
            let factory = Arc::clone(&factory);
            let cfg = cfg.clone();
            handles.push(tokio::spawn(async move {
                registry
                    .get_or_create(&cfg.cache_key(), &cfg.engine_options(), factory.as_ref())
                    .await
                    .unwrap()
            }));
        }

        let mut engines = Vec::new();
        for handle in handles {
            engines.push(handle.await.unwrap());
        }

        assert_eq!(factory.calls.load(Ordering::SeqCst), 1);
        assert!(engines.iter().all(|e| Arc::ptr_eq(e, &engines[0])));
    }

    #[tokio::test]
    async fn test_distinct_keys_get_distinct_engines() {
        let registry = InstanceRegistry::new();
        let factory = CountingFactory::new(0);
        let k1 = StorageConfig::new()
            .with_identifier("secure")
            .with_encryption_key("key1");
        let k2 = StorageConfig::new()
            .with_identifier("secure")
            .with_encryption_key("key2");

        let a = registry
            .get_or_create(&k1.cache_key(), &k1.engine_options(), &factory)
            .await
            .unwrap();
        let b = registry
            .get_or_create(&k2.cache_key(), &k2.engine_options(), &factory)
            .await
            .unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 2);
    }
}
