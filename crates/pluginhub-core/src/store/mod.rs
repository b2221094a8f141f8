//! Persistence contracts and the reference store.
//!
//! The lifecycle controller never touches storage directly. It opens a
//! [`StoreTransaction`] through a [`PluginStore`], runs all of an
//! operation's reads and writes against it, and commits only when the whole
//! operation succeeded. Dropping an uncommitted transaction discards it.
//!
//! [`MemoryStore`] is the bundled implementation, optionally backed by an
//! append-only [`Journal`].

pub mod journal;
pub mod memory;

pub use journal::{Journal, JournalEvent};
pub use memory::{MemoryStore, MemoryTransaction};

use pluginhub_types::{PluginConfig, PluginConfigInterface, PluginPackage, Result, Settings};

/// Read and write access to packages, entities and configurations.
///
/// Every method is fallible so store failures propagate to the caller
/// instead of being mistaken for "absent".
pub trait PluginRepository {
    /// Look up a package.
    fn package_by_id(&self, package_id: i64) -> Result<Option<PluginPackage>>;

    /// Whether a package exists.
    fn package_exists(&self, package_id: i64) -> Result<bool> {
        Ok(self.package_by_id(package_id)?.is_some())
    }

    /// Look up a configuration, interfaces included.
    fn config_by_id(&self, config_id: i64) -> Result<Option<PluginConfig>>;

    /// Whether a configuration exists.
    fn config_exists(&self, config_id: i64) -> Result<bool> {
        Ok(self.config_by_id(config_id)?.is_some())
    }

    /// Insert or replace a configuration and return the stored record.
    fn save_config(&mut self, config: PluginConfig) -> Result<PluginConfig>;

    /// Whether a package entity exists.
    fn entity_exists(&self, entity_id: i64) -> Result<bool>;

    /// All interfaces of a configuration with their parameters.
    fn interfaces_by_config_id(&self, config_id: i64) -> Result<Vec<PluginConfigInterface>>;

    /// The interface serving `service_name` from the newest enabled
    /// configuration, if any.
    fn latest_enabled_interface_by_service_name(
        &self,
        service_name: &str,
    ) -> Result<Option<PluginConfigInterface>>;

    /// Interfaces of every enabled configuration.
    fn enabled_interfaces(&self) -> Result<Vec<PluginConfigInterface>>;

    /// Interfaces of every enabled configuration bound to `entity_id`.
    fn enabled_interfaces_for_entity(&self, entity_id: i64) -> Result<Vec<PluginConfigInterface>>;
}

/// A unit of work against a [`PluginStore`].
pub trait StoreTransaction: PluginRepository {
    /// Make every write of this transaction durable and visible.
    fn commit(self) -> Result<()>;
}

/// A store that hands out isolated transactions.
///
/// Implementations must serialize conflicting transactions: a transaction
/// that begins after another committed observes its writes.
pub trait PluginStore {
    /// Transaction type borrowed from the store.
    type Transaction<'a>: StoreTransaction
    where
        Self: 'a;

    /// Start a transaction.
    fn begin(&self) -> Result<Self::Transaction<'_>>;
}

/// Build the store described by `settings`.
///
/// With a journal path the store replays and appends to that file;
/// otherwise all state is kept in memory.
pub fn open_store(settings: &Settings) -> Result<MemoryStore> {
    match &settings.store.journal_path {
        Some(path) => MemoryStore::open(path.clone()),
        None => Ok(MemoryStore::new()),
    }
}
