//! Plugin configuration types.
//!
//! A [`PluginConfig`] binds a package to a set of callable interfaces and is
//! gated by its [`ConfigStatus`]. Content edits arrive as a
//! [`PluginConfigDraft`], which carries the caller's possibly incomplete
//! view of the record until it passes validation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::interface::PluginConfigInterface;

/// Activation status of a plugin configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigStatus {
    /// Editable and not callable. Initial status of every configuration.
    #[default]
    Disabled,
    /// Callable and frozen until disabled.
    Enabled,
}

impl ConfigStatus {
    /// Wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "DISABLED",
            Self::Enabled => "ENABLED",
        }
    }
}

impl fmt::Display for ConfigStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored plugin configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Unique configuration identifier.
    pub id: i64,

    /// Owning package. The package always outlives the configuration.
    pub package_id: i64,

    /// Configuration name.
    pub name: String,

    /// Optional name the configuration is registered under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub register_name: Option<String>,

    /// Bound domain entity, if any. Ids `<= 0` mean "unbound".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<i64>,

    /// Current activation status.
    #[serde(default)]
    pub status: ConfigStatus,

    /// Interfaces exclusively owned by this configuration.
    #[serde(default)]
    pub interfaces: Vec<PluginConfigInterface>,
}

impl PluginConfig {
    /// A disabled configuration with no interfaces.
    pub fn new(id: i64, package_id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            package_id,
            name: name.into(),
            register_name: None,
            entity_id: None,
            status: ConfigStatus::Disabled,
            interfaces: Vec::new(),
        }
    }

    /// The bound entity id, if it is a real reference (`> 0`).
    pub fn bound_entity(&self) -> Option<i64> {
        self.entity_id.filter(|id| *id > 0)
    }

    /// Return this record with `status` replaced.
    pub fn with_status(self, status: ConfigStatus) -> Self {
        Self { status, ..self }
    }

    /// Whether the configuration is enabled.
    pub fn is_enabled(&self) -> bool {
        self.status == ConfigStatus::Enabled
    }
}

/// A save candidate for [`PluginConfig`].
///
/// Ids are optional because the caller may send a malformed record; the
/// validator decides whether it identifies an existing configuration. The
/// `status` field is accepted for wire compatibility and ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConfigDraft {
    /// Id of the configuration being edited.
    #[serde(default)]
    pub id: Option<i64>,

    /// Owning package id.
    #[serde(default)]
    pub package_id: Option<i64>,

    /// Configuration name.
    #[serde(default)]
    pub name: String,

    /// Optional register name.
    #[serde(default)]
    pub register_name: Option<String>,

    /// Bound domain entity, if any.
    #[serde(default)]
    pub entity_id: Option<i64>,

    /// Caller-supplied status. Never persisted.
    #[serde(default)]
    pub status: Option<ConfigStatus>,

    /// Replacement interface set.
    #[serde(default)]
    pub interfaces: Vec<PluginConfigInterface>,
}

impl PluginConfigDraft {
    /// The bound entity id, if it is a real reference (`> 0`).
    pub fn bound_entity(&self) -> Option<i64> {
        self.entity_id.filter(|id| *id > 0)
    }

    /// Materialize the draft as a stored record.
    ///
    /// Interfaces are re-parented onto `config_id`.
    pub fn into_config(
        self,
        config_id: i64,
        package_id: i64,
        status: ConfigStatus,
    ) -> PluginConfig {
        let interfaces = self
            .interfaces
            .into_iter()
            .map(|intf| PluginConfigInterface { config_id, ..intf })
            .collect();
        PluginConfig {
            id: config_id,
            package_id,
            name: self.name,
            register_name: self.register_name,
            entity_id: self.entity_id,
            status,
            interfaces,
        }
    }
}

impl From<PluginConfig> for PluginConfigDraft {
    fn from(config: PluginConfig) -> Self {
        Self {
            id: Some(config.id),
            package_id: Some(config.package_id),
            name: config.name,
            register_name: config.register_name,
            entity_id: config.entity_id,
            status: Some(config.status),
            interfaces: config.interfaces,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_is_disabled() {
        let config: PluginConfig =
            serde_json::from_str(r#"{"id": 1, "package_id": 2, "name": "host"}"#).unwrap();
        assert_eq!(config.status, ConfigStatus::Disabled);
        assert!(config.interfaces.is_empty());
    }

    #[test]
    fn bound_entity_ignores_non_positive_ids() {
        let mut config = PluginConfig::new(1, 2, "host");
        assert_eq!(config.bound_entity(), None);
        config.entity_id = Some(0);
        assert_eq!(config.bound_entity(), None);
        config.entity_id = Some(-3);
        assert_eq!(config.bound_entity(), None);
        config.entity_id = Some(12);
        assert_eq!(config.bound_entity(), Some(12));
    }

    #[test]
    fn into_config_reparents_interfaces_and_sets_status() {
        let draft = PluginConfigDraft {
            id: Some(5),
            package_id: Some(2),
            name: "host".into(),
            status: Some(ConfigStatus::Enabled),
            interfaces: vec![PluginConfigInterface::new(9, "create", "pkg/host/create")],
            ..Default::default()
        };
        let config = draft.into_config(5, 2, ConfigStatus::Disabled);
        assert_eq!(config.status, ConfigStatus::Disabled);
        assert_eq!(config.interfaces[0].config_id, 5);
    }

    #[test]
    fn draft_round_trips_from_config() {
        let config = PluginConfig::new(3, 1, "vm").with_status(ConfigStatus::Enabled);
        let draft = PluginConfigDraft::from(config);
        assert_eq!(draft.id, Some(3));
        assert_eq!(draft.package_id, Some(1));
        assert_eq!(draft.status, Some(ConfigStatus::Enabled));
    }

    #[test]
    fn status_display_matches_wire() {
        assert_eq!(ConfigStatus::Enabled.to_string(), "ENABLED");
        let json = serde_json::to_string(&ConfigStatus::Disabled).unwrap();
        assert_eq!(json, "\"DISABLED\"");
    }
}
