//! Config file discovery and layered loading.
//!
//! Implements the `Config::load()` algorithm:
//! 1. Parse `defaults.toml` → base
//! 2. Merge `{home}/.statekv/config.toml` (user)
//! 3. Merge the explicitly requested file, if any
//! 4. Apply `STATEKV_*` env fallbacks for fields no file set
//! 5. Deserialize merged tree → `Config`
//! 6. Validate

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{apply_env_fallbacks, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// A loaded configuration and the files it came from.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The merged, validated configuration.
    pub config: Config,
    /// Config files that contributed, in merge order.
    pub loaded_files: Vec<String>,
}

/// Load the configuration with layered file precedence.
///
/// `explicit` is a config file named on the command line or by the host
/// application; it must exist if given. `home_override` replaces the
/// user's home directory for user-config discovery.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any config file is malformed, or if the
/// final merged configuration fails validation.
pub fn load(explicit: Option<&Path>, home_override: Option<&Path>) -> ConfigResult<ResolvedConfig> {
    load_with_env(explicit, home_override, &collect_env_vars())
}

/// [`load`] with an explicit environment snapshot.
///
/// # Errors
///
/// Same as [`load`].
pub fn load_with_env(
    explicit: Option<&Path>,
    home_override: Option<&Path>,
    env_vars: &HashMap<String, String>,
) -> ConfigResult<ResolvedConfig> {
    // 1. Parse embedded defaults.
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;

    let mut file_set = HashSet::new();
    let mut loaded_files = Vec::new();

    // 2. User config. A missing home directory only skips this layer.
    let home_dir = match home_override {
        Some(h) => Some(h.to_path_buf()),
        None => home_directory().ok(),
    };
    if let Some(home) = home_dir {
        let user_path = home.join(".statekv").join("config.toml");
        if let Some(overlay) = try_load_file(&user_path)? {
            merge_layer(&mut merged, &overlay, "", &mut file_set);
            loaded_files.push(user_path.display().to_string());
            info!(path = %user_path.display(), "loaded user config");
        }
    }

    // 3. Explicit config file.
    if let Some(path) = explicit {
        let overlay = try_load_file(path)?.ok_or_else(|| ConfigError::ReadError {
            path: path.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
        })?;
        merge_layer(&mut merged, &overlay, "", &mut file_set);
        loaded_files.push(path.display().to_string());
        info!(path = %path.display(), "loaded config file");
    }

    // 4. Env fallbacks.
    apply_env_fallbacks(&mut merged, env_vars, &file_set);

    // 5. Deserialize.
    let config: Config = merged.try_into().map_err(|e| ConfigError::ParseError {
        path: "<merged config>".to_owned(),
        source: e,
    })?;

    // 6. Validate.
    validate::validate(&config)?;

    debug!(files = loaded_files.len(), engine = %config.storage.engine, "configuration resolved");
    Ok(ResolvedConfig {
        config,
        loaded_files,
    })
}

/// Load a config from a specific file path (no layering).
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read or parsed.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let overlay = try_load_file(path)?.ok_or_else(|| ConfigError::ReadError {
        path: path.display().to_string(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
    })?;
    let config: Config = overlay.try_into().map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;

    validate::validate(&config)?;
    Ok(config)
}

/// Recursively deep-merge `overlay` into `base`, recording every leaf
/// field the overlay set.
///
/// Tables merge per-field; scalars and arrays replace.
fn merge_layer(
    base: &mut toml::Value,
    overlay: &toml::Value,
    prefix: &str,
    file_set: &mut HashSet<String>,
) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                if let Some(base_val) = base_table.get_mut(key) {
                    merge_layer(base_val, overlay_val, &path, file_set);
                } else {
                    base_table.insert(key.clone(), overlay_val.clone());
                    record_leaves(overlay_val, &path, file_set);
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
            file_set.insert(prefix.to_owned());
        },
    }
}

fn record_leaves(val: &toml::Value, prefix: &str, file_set: &mut HashSet<String>) {
    if let toml::Value::Table(table) = val {
        for (key, child) in table {
            record_leaves(child, &format!("{prefix}.{key}"), file_set);
        }
    } else {
        file_set.insert(prefix.to_owned());
    }
}

/// Try to load a file, returning `None` if the file doesn't exist.
///
/// Uses a single read operation to avoid TOCTOU races (no separate
/// exists/metadata checks before reading).
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };

    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {} byte limit",
                content.len(),
                MAX_CONFIG_FILE_SIZE
            ),
        });
    }

    let value: toml::Value = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(Some(value))
}

/// Determine the user's home directory.
fn home_directory() -> ConfigResult<PathBuf> {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDir)
}
