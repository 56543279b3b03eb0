//! Storage error types.

/// Errors from storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The underlying engine could not be loaded or constructed.
    ///
    /// Never cached: the next operation on any adapter retries resolution.
    #[error(
        "storage engine unavailable: {reason}. Make sure the engine is installed and \
         linked correctly and that its configuration is accepted by the engine"
    )]
    EngineUnavailable {
        /// Why the engine could not be created.
        reason: String,
    },

    /// A storage operation failed inside an already-resolved engine.
    #[error("storage error: {0}")]
    Internal(String),

    /// The engine could not open its backing store.
    #[error("connection error: {0}")]
    Connection(String),

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The engine rejected its configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl StorageError {
    /// Wrap an engine creation failure into [`StorageError::EngineUnavailable`].
    pub(crate) fn engine_unavailable(source: &StorageError) -> Self {
        match source {
            Self::EngineUnavailable { reason } => Self::EngineUnavailable {
                reason: reason.clone(),
            },
            other => Self::EngineUnavailable {
                reason: other.to_string(),
            },
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
