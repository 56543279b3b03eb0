//! Configuration types.
//!
//! Every struct implements [`Default`] with the same values as the embedded
//! `defaults.toml`, so a bare `[section]` header produces a working
//! configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which engine backs the stores and where it keeps its data.
    pub storage: StorageSection,
    /// Logging level, format, and per-crate directives.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// StorageSection
// ---------------------------------------------------------------------------

/// Engine selection and the default store's identity.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Engine name: `"memory"` or `"surrealkv"`.
    pub engine: String,
    /// Root directory for persistent engines. Required for `"surrealkv"`.
    pub data_dir: Option<PathBuf>,
    /// Identifier of the default store. Falls back to the built-in default.
    pub identifier: Option<String>,
    /// Encryption key for the default store. Prefer the environment over
    /// storing this in a file.
    #[serde(skip_serializing)]
    pub encryption_key: Option<String>,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            engine: "memory".to_owned(),
            data_dir: None,
            identifier: None,
            encryption_key: None,
        }
    }
}

impl std::fmt::Debug for StorageSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageSection")
            .field("engine", &self.engine)
            .field("data_dir", &self.data_dir)
            .field("identifier", &self.identifier)
            .field("has_encryption_key", &self.encryption_key.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging and tracing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"`, or `"full"`.
    pub format: String,
    /// Per-crate tracing directives (e.g. `["statekv_storage=debug"]`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}
