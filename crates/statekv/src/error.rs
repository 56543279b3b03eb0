//! Top-level error type.

use thiserror::Error;

use statekv_config::ConfigError;
use statekv_storage::StorageError;
use statekv_telemetry::TelemetryError;

/// Errors raised while assembling statekv from configuration.
#[derive(Debug, Error)]
pub enum StateKvError {
    /// Configuration could not be loaded or is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A storage operation failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Logging could not be set up.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}

/// Result type for composition-root operations.
pub type StateKvResult<T> = Result<T, StateKvError>;
