//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Engine names the composition root knows how to build.
pub const KNOWN_ENGINES: &[&str] = &["memory", "surrealkv"];

/// Validate a fully-merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_storage(config)?;
    validate_logging(config)?;
    Ok(())
}

fn validate_storage(config: &Config) -> ConfigResult<()> {
    let s = &config.storage;

    if !KNOWN_ENGINES.contains(&s.engine.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "storage.engine".to_owned(),
            message: format!(
                "unsupported engine '{}'; expected one of: {}",
                s.engine,
                KNOWN_ENGINES.join(", ")
            ),
        });
    }

    if s.engine == "surrealkv" && s.data_dir.is_none() {
        return Err(ConfigError::ValidationError {
            field: "storage.data_dir".to_owned(),
            message: "data_dir is required for the surrealkv engine".to_owned(),
        });
    }

    if s.identifier.as_deref().is_some_and(str::is_empty) {
        return Err(ConfigError::ValidationError {
            field: "storage.identifier".to_owned(),
            message: "identifier must not be empty; omit it to use the default".to_owned(),
        });
    }

    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let l = &config.logging;

    if !matches!(
        l.level.as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    ) {
        return Err(ConfigError::ValidationError {
            field: "logging.level".to_owned(),
            message: format!(
                "unsupported level '{}'; expected one of: trace, debug, info, warn, error",
                l.level
            ),
        });
    }

    if !matches!(l.format.as_str(), "pretty" | "compact" | "json" | "full") {
        return Err(ConfigError::ValidationError {
            field: "logging.format".to_owned(),
            message: format!(
                "unsupported format '{}'; expected one of: pretty, compact, json, full",
                l.format
            ),
        });
    }

    Ok(())
}
