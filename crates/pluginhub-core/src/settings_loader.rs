//! Settings file discovery and loading.
//!
//! The discovery order is:
//! 1. `PLUGINHUB_CONFIG` environment variable (path to a JSON file).
//! 2. `pluginhub.json` in the given base directory.
//! 3. If none found, [`Settings::default`].
//!
//! JSON keys are normalized from camelCase to snake_case before
//! deserialization, so `{"store": {"journalPath": ...}}` and
//! `{"store": {"journal_path": ...}}` are equivalent. A relative journal
//! path is resolved against the directory of the settings file.

use std::path::{Path, PathBuf};

use pluginhub_types::{Result, Settings};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Environment variable naming the settings file.
pub const SETTINGS_ENV_VAR: &str = "PLUGINHUB_CONFIG";

/// Settings file name looked up in the base directory.
pub const SETTINGS_FILE_NAME: &str = "pluginhub.json";

/// Find the settings file, if any.
///
/// The environment variable wins even when the file it names is missing;
/// [`load_settings`] then falls back to defaults with a warning.
pub fn discover_settings_path(base_dir: &Path) -> Option<PathBuf> {
    if let Some(env_path) = std::env::var_os(SETTINGS_ENV_VAR).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(env_path));
    }

    let local = base_dir.join(SETTINGS_FILE_NAME);
    local.exists().then_some(local)
}

/// Discover and load settings, falling back to defaults.
pub fn load_settings(base_dir: &Path) -> Result<Settings> {
    let Some(path) = discover_settings_path(base_dir) else {
        info!("no settings file found, using defaults");
        return Ok(Settings::default());
    };

    if !path.exists() {
        warn!(path = %path.display(), "settings path does not exist, using defaults");
        return Ok(Settings::default());
    }

    load_settings_from(&path)
}

/// Load settings from a specific file.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    debug!(path = %path.display(), "loading settings file");
    let contents = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&contents)?;
    let mut settings: Settings = serde_json::from_value(normalize_keys(value))?;

    if let Some(journal) = settings.store.journal_path.as_mut() {
        if journal.is_relative() {
            if let Some(dir) = path.parent() {
                *journal = dir.join(&*journal);
            }
        }
    }

    Ok(settings)
}

/// Convert camelCase object keys to snake_case recursively.
pub fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, val)| (camel_to_snake(&key), normalize_keys(val)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

/// Convert one camelCase identifier to snake_case.
///
/// A run of capitals is treated as one word (`"HTTPMethod"` becomes
/// `"http_method"`).
///
/// # Examples
/// ```
/// # use pluginhub_core::settings_loader::camel_to_snake;
/// assert_eq!(camel_to_snake("journalPath"), "journal_path");
/// assert_eq!(camel_to_snake("already_snake"), "already_snake");
/// assert_eq!(camel_to_snake("HTTPMethod"), "http_method");
/// assert_eq!(camel_to_snake("entityId2Name"), "entity_id2_name");
/// ```
pub fn camel_to_snake(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_uppercase() {
            out.push(c);
            continue;
        }
        if i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            let after_word = prev.is_ascii_lowercase() || prev.is_ascii_digit();
            let closes_acronym = prev.is_ascii_uppercase() && next_is_lower;
            if after_word || closes_acronym {
                out.push('_');
            }
        }
        out.push(c.to_ascii_lowercase());
    }

    out
}
