//! Plugin configuration lifecycle controller.
//!
//! [`LifecycleController`] owns the transaction boundary: every public
//! operation opens one store transaction, runs its checks and writes
//! against it, and commits only on success. Any error drops the
//! transaction, so a failed operation persists nothing.

use pluginhub_types::{PluginConfig, PluginConfigDraft, PluginHubError, Result};
use tracing::{debug, info};

use crate::state;
use crate::store::{PluginRepository, PluginStore, StoreTransaction};
use crate::validator;

/// Applies update/enable/disable transitions to stored configurations.
#[derive(Debug)]
pub struct LifecycleController<S> {
    store: S,
}

impl<S: PluginStore> LifecycleController<S> {
    /// Create a controller over `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replace a disabled configuration's content.
    ///
    /// The stored record always lands in `DISABLED`, whatever status the
    /// draft carries. Enabled records must be disabled
    /// first.
    pub fn update(&self, draft: PluginConfigDraft) -> Result<PluginConfig> {
        self.in_transaction("update", |tx| {
            let existing = match draft.id.filter(|id| *id > 0) {
                Some(id) => tx.config_by_id(id)?,
                None => None,
            };
            let target = validator::validate_for_save(
                &draft,
                existing.as_ref(),
                |package_id| tx.package_exists(package_id),
                |entity_id| tx.entity_exists(entity_id),
            )?;

            let config = draft.into_config(target.config_id, target.package_id, target.status);
            let saved = tx.save_config(config)?;
            info!(
                config_id = saved.id,
                package_id = saved.package_id,
                interfaces = saved.interfaces.len(),
                "updated plugin config"
            );
            Ok(saved)
        })
    }

    /// Enable a disabled configuration.
    ///
    /// Requires the owning package to be registered, running or stopped,
    /// any bound entity to still exist, and every required parameter to be
    /// mapped.
    pub fn enable(&self, config_id: i64) -> Result<PluginConfig> {
        self.in_transaction("enable", |tx| {
            let config = tx
                .config_by_id(config_id)?
                .ok_or_else(|| PluginHubError::config_not_found(config_id))?;

            let package_status = tx.package_by_id(config.package_id)?.map(|p| p.status);
            if !package_status.is_some_and(|status| status.permits_enable()) {
                return Err(PluginHubError::InvalidPackageState {
                    config_id,
                    package_id: config.package_id,
                    status: package_status,
                });
            }

            let next = state::on_enable(config.id, config.status)?;

            if let Some(entity_id) = config.bound_entity() {
                let exists = tx.entity_exists(entity_id)?;
                validator::ensure_entity_exists(entity_id, &config.name, exists)?;
            }

            validator::validate_mandatory_parameters(&config)?;

            let saved = tx.save_config(config.with_status(next))?;
            info!(config_id, package_id = saved.package_id, "enabled plugin config");
            Ok(saved)
        })
    }

    /// Disable a configuration. Idempotent.
    pub fn disable(&self, config_id: i64) -> Result<PluginConfig> {
        self.in_transaction("disable", |tx| {
            let config = tx
                .config_by_id(config_id)?
                .ok_or_else(|| PluginHubError::config_not_found(config_id))?;

            let previous = config.status;
            let next = state::on_disable(previous);
            let saved = tx.save_config(config.with_status(next))?;
            info!(config_id, %previous, "disabled plugin config");
            Ok(saved)
        })
    }

    /// Run `work` in a fresh transaction, committing only if it succeeds.
    pub(crate) fn in_transaction<'s, T, F>(&'s self, operation: &'static str, work: F) -> Result<T>
    where
        F: FnOnce(&mut S::Transaction<'s>) -> Result<T>,
    {
        let mut tx = self.store.begin()?;
        match work(&mut tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(e) => {
                debug!(operation, error = %e, "rolling back plugin config transaction");
                Err(e)
            }
        }
    }
}
