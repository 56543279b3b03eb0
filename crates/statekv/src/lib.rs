//! statekv: shared, lazily-opened key-value stores behind a tiny async
//! string-storage interface.
//!
//! This crate is the composition root. It turns a loaded [`Config`] into a
//! [`StorageFactory`] over the configured engine plus the default adapter,
//! and installs logging from the `[logging]` section.
//!
//! ```rust,ignore
//! use statekv::prelude::*;
//!
//! let resolved = Config::load(None)?;
//! init_logging(&resolved.config)?;
//!
//! let kv = StateKv::from_config(&resolved.config)?;
//! let profile = kv.factory().create(Some(StorageConfig::new().with_identifier("profile")));
//! profile.set_item("name", "Alice").await?;
//! ```
//!
//! # Feature Flags
//!
//! - **`kv`**: `SurrealKV` persistent engine

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;

use std::sync::Arc;

use tracing::info;

pub use error::{StateKvError, StateKvResult};
pub use statekv_config as config;
pub use statekv_storage as storage;
pub use statekv_telemetry as telemetry;

use statekv_config::{Config, ConfigError};
use statekv_storage::{EngineFactory, MemoryEngineFactory, StorageAdapter, StorageConfig, StorageFactory};
use statekv_telemetry::LogConfig;

/// A storage factory and default adapter assembled from configuration.
#[derive(Debug)]
pub struct StateKv {
    factory: StorageFactory,
    storage: Arc<StorageAdapter>,
}

impl StateKv {
    /// Build the engine factory named by `config.storage.engine` and the
    /// default adapter for the configured identifier and encryption key.
    ///
    /// No engine is opened here; the first storage operation does that.
    ///
    /// # Errors
    ///
    /// Returns [`StateKvError::Config`] if the engine is unknown, is missing
    /// its data directory, or was not compiled in.
    pub fn from_config(config: &Config) -> StateKvResult<Self> {
        let section = &config.storage;
        let engine_factory = engine_factory(config)?;
        let factory = StorageFactory::from_shared(engine_factory);

        let storage = if section.identifier.is_none() && section.encryption_key.is_none() {
            factory.default_storage()
        } else {
            let mut storage_config = StorageConfig::new();
            storage_config.identifier.clone_from(&section.identifier);
            storage_config
                .encryption_key
                .clone_from(&section.encryption_key);
            Arc::new(factory.create(Some(storage_config)))
        };

        info!(
            engine = %section.engine,
            identifier = %storage.config().identifier_or_default(),
            "statekv assembled"
        );
        Ok(Self { factory, storage })
    }

    /// The default adapter for the configured store.
    #[must_use]
    pub fn storage(&self) -> Arc<StorageAdapter> {
        Arc::clone(&self.storage)
    }

    /// The factory for building further adapters over the same registry.
    #[must_use]
    pub fn factory(&self) -> &StorageFactory {
        &self.factory
    }
}

fn engine_factory(config: &Config) -> StateKvResult<Arc<dyn EngineFactory>> {
    match config.storage.engine.as_str() {
        "memory" => Ok(Arc::new(MemoryEngineFactory::new())),
        "surrealkv" => surrealkv_factory(config),
        other => Err(ConfigError::ValidationError {
            field: "storage.engine".to_owned(),
            message: format!("unsupported engine '{other}'"),
        }
        .into()),
    }
}

#[cfg(feature = "kv")]
fn surrealkv_factory(config: &Config) -> StateKvResult<Arc<dyn EngineFactory>> {
    let root = config
        .storage
        .data_dir
        .clone()
        .ok_or_else(|| ConfigError::ValidationError {
            field: "storage.data_dir".to_owned(),
            message: "data_dir is required for the surrealkv engine".to_owned(),
        })?;
    Ok(Arc::new(statekv_storage::SurrealKvEngineFactory::new(root)))
}

#[cfg(not(feature = "kv"))]
fn surrealkv_factory(_config: &Config) -> StateKvResult<Arc<dyn EngineFactory>> {
    Err(ConfigError::ValidationError {
        field: "storage.engine".to_owned(),
        message: "the surrealkv engine requires the `kv` feature".to_owned(),
    }
    .into())
}

/// Install the global `tracing` subscriber described by `[logging]`.
///
/// # Errors
///
/// Returns [`StateKvError::Telemetry`] if the section is invalid or a
/// subscriber is already installed.
pub fn init_logging(config: &Config) -> StateKvResult<()> {
    let log_config = LogConfig::from_section(&config.logging)?;
    statekv_telemetry::setup_logging(&log_config)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use statekv_storage::StateStorage;

    use super::*;

    #[tokio::test]
    async fn test_memory_config_builds_default_store() {
        let kv = StateKv::from_config(&Config::default()).unwrap();
        assert_eq!(kv.storage().cache_key().as_str(), "mmkv.default:");
        assert!(Arc::ptr_eq(&kv.storage(), &kv.factory().default_storage()));

        kv.storage().set_item("theme", "dark").await.unwrap();
        let again = kv.factory().create(None);
        assert_eq!(again.get_item("theme").await.unwrap().as_deref(), Some("dark"));
    }

    #[tokio::test]
    async fn test_configured_identity_used_for_default_store() {
        let mut config = Config::default();
        config.storage.identifier = Some("app".to_owned());
        config.storage.encryption_key = Some("k1".to_owned());

        let kv = StateKv::from_config(&config).unwrap();
        assert_eq!(kv.storage().cache_key().as_str(), "app:k1");

        kv.storage().set_item("a", "1").await.unwrap();
        let same = kv.factory().create(Some(
            StorageConfig::new()
                .with_identifier("app")
                .with_encryption_key("k1"),
        ));
        assert_eq!(same.get_item("a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(kv.factory().registry().len(), 1);
    }

    #[test]
    fn test_unknown_engine_rejected() {
        let mut config = Config::default();
        config.storage.engine = "leveldb".to_owned();
        assert!(matches!(
            StateKv::from_config(&config),
            Err(StateKvError::Config(ConfigError::ValidationError { .. }))
        ));
    }

    #[cfg(not(feature = "kv"))]
    #[test]
    fn test_surrealkv_without_feature_rejected() {
        let mut config = Config::default();
        config.storage.engine = "surrealkv".to_owned();
        config.storage.data_dir = Some(std::path::PathBuf::from("/tmp/statekv"));
        let err = StateKv::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("`kv` feature"));
    }

    #[cfg(feature = "kv")]
    #[tokio::test]
    async fn test_surrealkv_config_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.engine = "surrealkv".to_owned();
        config.storage.data_dir = Some(dir.path().to_path_buf());

        let kv = StateKv::from_config(&config).unwrap();
        kv.storage().set_item("k", "v").await.unwrap();
        assert_eq!(kv.storage().get_item("k").await.unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_init_logging_rejects_bad_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_owned();
        assert!(matches!(
            init_logging(&config),
            Err(StateKvError::Telemetry(_))
        ));
    }
}
