//! In-memory engine for tests and ephemeral state.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tracing::debug;

use crate::config::EngineOptions;
use crate::engine::{EngineFactory, StorageEngine};
use crate::error::{StorageError, StorageResult};

/// In-memory string store.
///
/// Every [`MemoryEngine`] is its own isolated store; two instances never
/// see each other's data.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryEngine {
    /// Create a new empty in-memory engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the lock is poisoned.
    pub fn len(&self) -> StorageResult<usize> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(data.len())
    }

    /// Whether the store holds no keys.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the lock is poisoned.
    pub fn is_empty(&self) -> StorageResult<bool> {
        self.len().map(|n| n == 0)
    }
}

#[async_trait]
impl StorageEngine for MemoryEngine {
    async fn get_string(&self, key: &str) -> StorageResult<Option<String>> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(data.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        data.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        data.remove(key);
        Ok(())
    }
}

/// Factory handing out a fresh [`MemoryEngine`] per call.
///
/// The encryption key is accepted and ignored; nothing is written to disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryEngineFactory;

impl MemoryEngineFactory {
    /// Create the factory.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EngineFactory for MemoryEngineFactory {
    async fn create(&self, options: &EngineOptions) -> StorageResult<Arc<dyn StorageEngine>> {
        debug!(identifier = %options.identifier, "opening in-memory engine");
        Ok(Arc::new(MemoryEngine::new()))
    }
}
