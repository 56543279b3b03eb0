//! Environment variable fallbacks.
//!
//! `STATEKV_*` variables fill in fields that no config file set. They never
//! override a value a file chose explicitly.

use std::collections::{HashMap, HashSet};

use tracing::debug;

/// Environment variable → dotted config field.
const ENV_FALLBACKS: &[(&str, &str)] = &[
    ("STATEKV_ENGINE", "storage.engine"),
    ("STATEKV_DATA_DIR", "storage.data_dir"),
    ("STATEKV_ENCRYPTION_KEY", "storage.encryption_key"),
    ("STATEKV_LOG_LEVEL", "logging.level"),
    ("STATEKV_LOG_FORMAT", "logging.format"),
];

/// Snapshot the `STATEKV_*` variables relevant to configuration.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    ENV_FALLBACKS
        .iter()
        .filter_map(|(var, _)| std::env::var(var).ok().map(|v| ((*var).to_owned(), v)))
        .collect()
}

/// Apply env fallbacks to `merged` for every field not in `file_set`.
///
/// Empty variables are ignored.
pub fn apply_env_fallbacks(
    merged: &mut toml::Value,
    env_vars: &HashMap<String, String>,
    file_set: &HashSet<String>,
) {
    for (var, field) in ENV_FALLBACKS {
        let Some(value) = env_vars.get(*var).filter(|v| !v.is_empty()) else {
            continue;
        };
        if file_set.contains(*field) {
            debug!(var, field, "env var ignored; field set by config file");
            continue;
        }
        set_dotted(merged, field, toml::Value::String(value.clone()));
        debug!(var, field, "applied env fallback");
    }
}

/// Set `path` (e.g. `"storage.engine"`) in a table tree, creating
/// intermediate tables as needed.
fn set_dotted(root: &mut toml::Value, path: &str, value: toml::Value) {
    let mut parts = path.split('.').peekable();
    let mut node = root;
    while let Some(part) = parts.next() {
        let toml::Value::Table(table) = node else {
            return;
        };
        if parts.peek().is_none() {
            table.insert(part.to_owned(), value);
            return;
        }
        node = table
            .entry(part.to_owned())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }
}
