//! Configuration error types.

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file exists but could not be read.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path of the offending file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A config file is not valid TOML or does not match the schema.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path of the offending file.
        path: String,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// A field holds a value outside its accepted range.
    #[error("invalid value for {field}: {message}")]
    ValidationError {
        /// Dotted path of the field.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// The user's home directory could not be determined.
    #[error("could not determine home directory")]
    NoHomeDir,
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
