//! Runtime settings schema.
//!
//! [`Settings`] is deserialized from the JSON file located by
//! `pluginhub_core::settings_loader`. Every field has a default so an empty
//! object (or no file at all) yields a working in-memory setup.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root settings object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Persistence settings.
    #[serde(default)]
    pub store: StoreSettings,
}

/// Persistence settings for the reference store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Path of the JSONL journal. `None` keeps all state in memory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal_path: Option<PathBuf>,
}
