//! Mock engine factories for testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use statekv_storage::{
    EngineFactory, EngineOptions, MemoryEngine, StorageEngine, StorageError, StorageResult,
};

/// Engine factory that records every creation request.
///
/// Hands out a fresh [`MemoryEngine`] per call and keeps a handle to each,
/// so tests can assert both how often the engine was constructed and with
/// which options.
///
/// Uses `std::sync::Mutex` internally so assertions need no runtime.
#[derive(Debug, Clone, Default)]
pub struct RecordingEngineFactory {
    calls: Arc<Mutex<Vec<EngineOptions>>>,
    engines: Arc<Mutex<Vec<Arc<MemoryEngine>>>>,
}

impl RecordingEngineFactory {
    /// Create a new recording factory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `create` was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// The options of every `create` call, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<EngineOptions> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Whether any `create` call received exactly `options`.
    #[must_use]
    pub fn was_called_with(&self, options: &EngineOptions) -> bool {
        self.calls
            .lock()
            .map(|c| c.iter().any(|o| o == options))
            .unwrap_or(false)
    }

    /// The engines handed out so far, in creation order.
    #[must_use]
    pub fn engines(&self) -> Vec<Arc<MemoryEngine>> {
        self.engines.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl EngineFactory for RecordingEngineFactory {
    async fn create(&self, options: &EngineOptions) -> StorageResult<Arc<dyn StorageEngine>> {
        let handle = Arc::new(MemoryEngine::new());
        {
            let mut calls = self
                .calls
                .lock()
                .map_err(|e| StorageError::Internal(e.to_string()))?;
            calls.push(options.clone());
        }
        {
            let mut engines = self
                .engines
                .lock()
                .map_err(|e| StorageError::Internal(e.to_string()))?;
            engines.push(Arc::clone(&handle));
        }
        let engine: Arc<dyn StorageEngine> = handle;
        Ok(engine)
    }
}

/// Engine factory that fails a fixed number of times before succeeding.
///
/// Simulates an engine whose native module is missing until it gets
/// installed.
#[derive(Debug, Clone)]
pub struct FailingEngineFactory {
    remaining_failures: Arc<AtomicUsize>,
    attempts: Arc<AtomicUsize>,
    inner: RecordingEngineFactory,
}

impl FailingEngineFactory {
    /// Fail the first `failures` creations, then delegate to a
    /// [`RecordingEngineFactory`].
    #[must_use]
    pub fn new(failures: usize) -> Self {
        Self {
            remaining_failures: Arc::new(AtomicUsize::new(failures)),
            attempts: Arc::new(AtomicUsize::new(0)),
            inner: RecordingEngineFactory::new(),
        }
    }

    /// Fail every creation.
    #[must_use]
    pub fn always() -> Self {
        Self::new(usize::MAX)
    }

    /// Total number of creation attempts, failed or not.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// The recording factory successful creations were delegated to.
    #[must_use]
    pub fn inner(&self) -> &RecordingEngineFactory {
        &self.inner
    }
}

#[async_trait]
impl EngineFactory for FailingEngineFactory {
    async fn create(&self, options: &EngineOptions) -> StorageResult<Arc<dyn StorageEngine>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let failed = self
            .remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(StorageError::Connection(format!(
                "engine module for '{}' is not installed",
                options.identifier
            )));
        }
        self.inner.create(options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_factory_records_options() {
        let factory = RecordingEngineFactory::new();
        let opts = EngineOptions::default_store();

        factory.create(&opts).await.unwrap();
        factory.create(&opts).await.unwrap();

        assert_eq!(factory.call_count(), 2);
        assert!(factory.was_called_with(&opts));
        assert_eq!(factory.engines().len(), 2);
    }

    #[tokio::test]
    async fn test_recording_factory_exposes_engines() {
        let factory = RecordingEngineFactory::new();
        let engine = factory
            .create(&EngineOptions::default_store())
            .await
            .unwrap();
        engine.set("k", "v").await.unwrap();

        let handles = factory.engines();
        assert_eq!(handles[0].len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failing_factory_recovers() {
        let factory = FailingEngineFactory::new(2);
        let opts = EngineOptions::default_store();

        assert!(factory.create(&opts).await.is_err());
        assert!(factory.create(&opts).await.is_err());
        assert!(factory.create(&opts).await.is_ok());
        assert_eq!(factory.attempts(), 3);
        assert_eq!(factory.inner().call_count(), 1);
    }

    #[tokio::test]
    async fn test_failing_factory_always() {
        let factory = FailingEngineFactory::always();
        for _ in 0..3 {
            assert!(
                factory
                    .create(&EngineOptions::default_store())
                    .await
                    .is_err()
            );
        }
        assert_eq!(factory.inner().call_count(), 0);
    }
}
