//! Everything a host needs to open and use stores.
//!
//! ```rust,ignore
//! use statekv::prelude::*;
//!
//! let resolved = Config::load(None)?;
//! let kv = StateKv::from_config(&resolved.config)?;
//! kv.storage().set_item("theme", "dark").await?;
//! ```

pub use crate::{StateKv, StateKvError, StateKvResult, init_logging};

pub use statekv_config::Config;
pub use statekv_storage::{
    CacheKey, EngineFactory, StateStorage, StorageAdapter, StorageConfig, StorageEngine,
    StorageError, StorageFactory, StorageResult,
};
