//! Store configuration and cache key derivation.
//!
//! A [`StorageConfig`] names one logical store. Only its identifier and
//! encryption key decide which engine instance it maps to; everything in
//! [`StorageConfig::extensions`] is engine-specific tuning that never
//! fragments the instance cache.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier used when a configuration does not name one.
pub const DEFAULT_IDENTIFIER: &str = "mmkv.default";

// ---------------------------------------------------------------------------
// StorageConfig
// ---------------------------------------------------------------------------

/// Configuration for one logical store.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Logical store identifier. Defaults to [`DEFAULT_IDENTIFIER`].
    pub identifier: Option<String>,
    /// Encryption key handed to the engine. Never serialized.
    #[serde(skip_serializing)]
    pub encryption_key: Option<String>,
    /// Opaque engine-specific options. Not part of the cache key.
    pub extensions: BTreeMap<String, serde_json::Value>,
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("identifier", &self.identifier)
            .field("has_encryption_key", &self.encryption_key.is_some())
            .field("extensions", &self.extensions)
            .finish()
    }
}

impl StorageConfig {
    /// Create an empty configuration (default identifier, no key).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the logical store identifier.
    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Set the encryption key.
    #[must_use]
    pub fn with_encryption_key(mut self, key: impl Into<String>) -> Self {
        self.encryption_key = Some(key.into());
        self
    }

    /// Add an engine-specific passthrough option.
    #[must_use]
    pub fn with_extension(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.extensions.insert(name.into(), value);
        self
    }

    /// The identifier, or [`DEFAULT_IDENTIFIER`] when unset.
    #[must_use]
    pub fn identifier_or_default(&self) -> &str {
        self.identifier.as_deref().unwrap_or(DEFAULT_IDENTIFIER)
    }

    /// The encryption key, treating an empty string as absent.
    #[must_use]
    pub fn effective_encryption_key(&self) -> Option<&str> {
        self.encryption_key.as_deref().filter(|k| !k.is_empty())
    }

    /// The cache key this configuration maps to.
    #[must_use]
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::from_config(Some(self))
    }

    /// The options passed to the engine factory for this configuration.
    ///
    /// Extensions are deliberately not included.
    #[must_use]
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            identifier: self.identifier_or_default().to_owned(),
            encryption_key: self.effective_encryption_key().map(str::to_owned),
        }
    }
}

// ---------------------------------------------------------------------------
// CacheKey
// ---------------------------------------------------------------------------

/// Registry key identifying one logical store: `"{identifier}:{encryption_key}"`.
///
/// Equality and hashing use the derived string only. `Debug` never prints
/// the encryption key segment.
///
/// The format is not injective when the identifier contains `':'`:
/// `("a:", None)` and `("a", Some(":"))` both yield `"a::"` and resolve to
/// the same engine. Keep `':'` out of identifiers that are used alongside
/// encryption keys.
#[derive(Clone)]
pub struct CacheKey {
    key: String,
    identifier: String,
    has_encryption_key: bool,
}

impl CacheKey {
    /// Derive the cache key for an optional configuration.
    #[must_use]
    pub fn from_config(config: Option<&StorageConfig>) -> Self {
        let identifier = config.map_or(DEFAULT_IDENTIFIER, StorageConfig::identifier_or_default);
        let encryption_key = config.and_then(StorageConfig::effective_encryption_key);
        Self {
            key: format!("{identifier}:{}", encryption_key.unwrap_or("")),
            identifier: identifier.to_owned(),
            has_encryption_key: encryption_key.is_some(),
        }
    }

    /// The full key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// The identifier this key was derived from. Safe to log.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for CacheKey {}

impl std::hash::Hash for CacheKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheKey")
            .field("identifier", &self.identifier)
            .field("has_encryption_key", &self.has_encryption_key)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// EngineOptions
// ---------------------------------------------------------------------------

/// What an engine factory receives when asked to create an instance.
#[derive(Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Logical store identifier (already defaulted).
    pub identifier: String,
    /// Encryption key, `None` when absent or empty.
    pub encryption_key: Option<String>,
}

impl EngineOptions {
    /// Options for the default store.
    #[must_use]
    pub fn default_store() -> Self {
        Self {
            identifier: DEFAULT_IDENTIFIER.to_owned(),
            encryption_key: None,
        }
    }
}

impl fmt::Debug for EngineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineOptions")
            .field("identifier", &self.identifier)
            .field("has_encryption_key", &self.encryption_key.is_some())
            .finish()
    }
}
