//! statekv storage: a persistent key-value engine behind a tiny async
//! string-storage interface.
//!
//! State-persistence layers only need `get_item` / `set_item` /
//! `remove_item` on strings. This crate supplies that interface
//! ([`StateStorage`]) on top of any engine implementing [`StorageEngine`],
//! and takes care of the part that is easy to get wrong: opening exactly one
//! engine per logical store and sharing it across every adapter that names
//! the same store.
//!
//! # Instance sharing
//!
//! A logical store is identified by its [`CacheKey`], derived from the
//! configured identifier (default `"mmkv.default"`) and encryption key only.
//! Engine-specific [`extensions`](StorageConfig::extensions) never split a
//! store. The [`InstanceRegistry`] opens each store once, even when many
//! tasks race on first use, and never evicts it.
//!
//! # Engines
//!
//! - **In-memory** ([`MemoryEngine`], always available): tests and
//!   ephemeral state
//! - **`SurrealKV`** (behind the `kv` feature): persistent, one tree per
//!   identifier
//!
//! Any other engine plugs in through [`EngineFactory`], which is also
//! implemented for plain closures.
//!
//! # Feature Flags
//!
//! - **`kv`**: `SurrealKV` persistent engine

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapter;
pub mod config;
pub mod engine;
pub mod error;
pub mod factory;
pub mod memory;
pub mod registry;

#[cfg(feature = "kv")]
pub mod surreal;

pub use adapter::{StateStorage, StorageAdapter};
pub use config::{CacheKey, DEFAULT_IDENTIFIER, EngineOptions, StorageConfig};
pub use engine::{EngineFactory, StorageEngine};
pub use error::{StorageError, StorageResult};
pub use factory::StorageFactory;
pub use memory::{MemoryEngine, MemoryEngineFactory};
pub use registry::InstanceRegistry;

#[cfg(feature = "kv")]
pub use surreal::{SurrealKvEngine, SurrealKvEngineFactory};
