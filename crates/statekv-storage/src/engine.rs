//! The seam between the adapter and the wrapped key-value engine.
//!
//! [`StorageEngine`] is the consumed interface: string get/set/delete on one
//! opened store. [`EngineFactory`] opens (or creates) a store for a given
//! identifier and encryption key. The adapter never reaches for an engine on
//! its own; the factory is injected by whoever builds the
//! [`StorageFactory`](crate::StorageFactory).

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::EngineOptions;
use crate::error::StorageResult;

/// One opened key-value store.
///
/// Implementations serialize their own internal mutations; the adapter calls
/// these methods concurrently from any number of tasks.
#[async_trait]
pub trait StorageEngine: Send + Sync {
    /// Get the string stored under `key`.
    ///
    /// Returns `None` if the key does not exist.
    async fn get_string(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, overwriting any existing value.
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;
}

/// Opens or creates engine instances.
#[async_trait]
pub trait EngineFactory: Send + Sync {
    /// Open or create the store described by `options`.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine is unavailable or rejects the options.
    async fn create(&self, options: &EngineOptions) -> StorageResult<Arc<dyn StorageEngine>>;
}

#[async_trait]
impl<F> EngineFactory for F
where
    F: Fn(&EngineOptions) -> StorageResult<Arc<dyn StorageEngine>> + Send + Sync,
{
    async fn create(&self, options: &EngineOptions) -> StorageResult<Arc<dyn StorageEngine>> {
        self(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::memory::MemoryEngine;

    #[tokio::test]
    async fn test_closure_factory() {
        let factory = |opts: &EngineOptions| -> StorageResult<Arc<dyn StorageEngine>> {
            if opts.identifier == "broken" {
                return Err(StorageError::Connection("no such store".into()));
            }
            Ok(Arc::new(MemoryEngine::new()))
        };

        let engine = factory
            .create(&EngineOptions::default_store())
            .await
            .unwrap();
        engine.set("k", "v").await.unwrap();
        assert_eq!(engine.get_string("k").await.unwrap().as_deref(), Some("v"));

        let broken = EngineOptions {
            identifier: "broken".into(),
            encryption_key: None,
        };
        assert!(factory.create(&broken).await.is_err());
    }
}
