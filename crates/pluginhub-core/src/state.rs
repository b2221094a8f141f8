//! Configuration status transitions.
//!
//! Pure functions from the current [`ConfigStatus`] to the next one. The
//! lifecycle controller applies them to records it has loaded; nothing here
//! touches storage.
//!
//! ```text
//!             update            enable (gated)
//!   DISABLED ───────▶ DISABLED ───────────────▶ ENABLED
//!       ▲                                          │
//!       └──────────────── disable ─────────────────┘
//! ```

use pluginhub_types::{ConfigStatus, PluginHubError, Result};

/// Next status after a content update. Enabled records are frozen.
pub fn on_update(config_id: i64, current: ConfigStatus) -> Result<ConfigStatus> {
    match current {
        ConfigStatus::Disabled => Ok(ConfigStatus::Disabled),
        ConfigStatus::Enabled => Err(PluginHubError::IllegalStateTransition {
            config_id,
            status: current,
            action: "update",
        }),
    }
}

/// Next status after enabling. Only a disabled record can be enabled.
pub fn on_enable(config_id: i64, current: ConfigStatus) -> Result<ConfigStatus> {
    match current {
        ConfigStatus::Disabled => Ok(ConfigStatus::Enabled),
        ConfigStatus::Enabled => Err(PluginHubError::IllegalStateTransition {
            config_id,
            status: current,
            action: "enable",
        }),
    }
}

/// Next status after disabling. Always disabled.
pub fn on_disable(_current: ConfigStatus) -> ConfigStatus {
    ConfigStatus::Disabled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_keeps_disabled_and_rejects_enabled() {
        assert_eq!(on_update(1, ConfigStatus::Disabled).unwrap(), ConfigStatus::Disabled);
        let err = on_update(1, ConfigStatus::Enabled).unwrap_err();
        assert!(matches!(
            err,
            PluginHubError::IllegalStateTransition { action: "update", .. }
        ));
    }

    #[test]
    fn enable_is_not_idempotent() {
        assert_eq!(on_enable(1, ConfigStatus::Disabled).unwrap(), ConfigStatus::Enabled);
        let err = on_enable(1, ConfigStatus::Enabled).unwrap_err();
        assert!(matches!(
            err,
            PluginHubError::IllegalStateTransition { config_id: 1, action: "enable", .. }
        ));
    }

    #[test]
    fn disable_collapses_to_disabled() {
        assert_eq!(on_disable(ConfigStatus::Enabled), ConfigStatus::Disabled);
        assert_eq!(on_disable(ConfigStatus::Disabled), ConfigStatus::Disabled);
    }
}
