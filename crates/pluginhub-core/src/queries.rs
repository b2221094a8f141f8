//! Read-only interface queries.
//!
//! Queries run in their own transaction like every other operation, so
//! they never observe another operation's uncommitted writes.

use pluginhub_types::{PluginConfigInterface, PluginHubError, Result};

use crate::lifecycle::LifecycleController;
use crate::store::{PluginRepository, PluginStore};

impl<S: PluginStore> LifecycleController<S> {
    /// All interfaces of a configuration, parameters included.
    ///
    /// An unknown configuration has no interfaces.
    pub fn interfaces_for_config(&self, config_id: i64) -> Result<Vec<PluginConfigInterface>> {
        self.in_transaction("interfaces_for_config", |tx| tx.interfaces_by_config_id(config_id))
    }

    /// The interface serving `service_name` from the newest enabled
    /// configuration.
    pub fn interface_by_service_name(&self, service_name: &str) -> Result<PluginConfigInterface> {
        self.in_transaction("interface_by_service_name", |tx| {
            tx.latest_enabled_interface_by_service_name(service_name)?
                .ok_or_else(|| PluginHubError::NotFound {
                    what: format!("plugin interface for service name [{service_name}]"),
                })
        })
    }

    /// Interfaces of every enabled configuration.
    pub fn enabled_interfaces(&self) -> Result<Vec<PluginConfigInterface>> {
        self.in_transaction("enabled_interfaces", |tx| tx.enabled_interfaces())
    }

    /// Interfaces of every enabled configuration bound to `entity_id`.
    pub fn enabled_interfaces_for_entity(
        &self,
        entity_id: i64,
    ) -> Result<Vec<PluginConfigInterface>> {
        self.in_transaction("enabled_interfaces_for_entity", |tx| {
            tx.enabled_interfaces_for_entity(entity_id)
        })
    }
}
