//! Test fixtures for common configurations.

use statekv_storage::StorageConfig;

/// A configuration for a named store without encryption.
#[must_use]
pub fn test_config(identifier: impl Into<String>) -> StorageConfig {
    StorageConfig::new().with_identifier(identifier)
}

/// A configuration for a named store with an encryption key.
#[must_use]
pub fn secure_config(identifier: impl Into<String>, key: impl Into<String>) -> StorageConfig {
    StorageConfig::new()
        .with_identifier(identifier)
        .with_encryption_key(key)
}

/// Install a test-friendly tracing subscriber.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
