//! In-memory plugin store.
//!
//! State lives behind a single [`parking_lot::Mutex`]. A
//! [`MemoryTransaction`] holds that lock for its whole lifetime and stages
//! configuration writes locally, so transactions are fully serialized and an
//! uncommitted transaction leaves no trace.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::PathBuf;

use parking_lot::{Mutex, MutexGuard};
use pluginhub_types::{
    PackageStatus, PluginConfig, PluginConfigInterface, PluginHubError, PluginPackage,
    PluginPackageEntity, Result,
};
use tracing::{debug, info};

use super::journal::{Journal, JournalEvent};
use super::{PluginRepository, PluginStore, StoreTransaction};

#[derive(Debug, Default)]
struct StoreState {
    packages: BTreeMap<i64, PluginPackage>,
    entities: BTreeMap<i64, PluginPackageEntity>,
    configs: BTreeMap<i64, PluginConfig>,
}

impl StoreState {
    fn apply(&mut self, event: JournalEvent) {
        match event {
            JournalEvent::PackageRegistered { package } => {
                self.packages.insert(package.id, package);
            }
            JournalEvent::PackageStatusChanged { package_id, status } => {
                if let Some(package) = self.packages.get_mut(&package_id) {
                    package.status = status;
                }
            }
            JournalEvent::EntityRegistered { entity } => {
                self.entities.insert(entity.id, entity);
            }
            JournalEvent::ConfigsCommitted { configs } => {
                for config in configs {
                    self.configs.insert(config.id, config);
                }
            }
        }
    }
}

/// Reference [`PluginStore`] keeping all records in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
    journal: Option<Journal>,
}

impl MemoryStore {
    /// An empty, purely in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a journal-backed store, replaying any existing journal at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let journal = Journal::new(path);
        let mut state = StoreState::default();
        for event in journal.load_events()? {
            state.apply(event);
        }
        info!(
            path = %journal.path().display(),
            packages = state.packages.len(),
            configs = state.configs.len(),
            "opened journal store"
        );
        Ok(Self {
            state: Mutex::new(state),
            journal: Some(journal),
        })
    }

    /// The journal backing this store, if any.
    pub fn journal(&self) -> Option<&Journal> {
        self.journal.as_ref()
    }

    /// Register (or replace) a package.
    pub fn register_package(&self, package: PluginPackage) -> Result<()> {
        let mut state = self.state.lock();
        self.record(&mut state, JournalEvent::PackageRegistered { package })
    }

    /// Move a package to a new status, as the package installer does.
    pub fn set_package_status(&self, package_id: i64, status: PackageStatus) -> Result<()> {
        let mut state = self.state.lock();
        if !state.packages.contains_key(&package_id) {
            return Err(PluginHubError::NotFound {
                what: format!("plugin package with id {package_id}"),
            });
        }
        self.record(&mut state, JournalEvent::PackageStatusChanged { package_id, status })
    }

    /// Register a domain entity.
    pub fn register_entity(&self, entity: PluginPackageEntity) -> Result<()> {
        let mut state = self.state.lock();
        self.record(&mut state, JournalEvent::EntityRegistered { entity })
    }

    /// Store a configuration as-is, bypassing lifecycle checks.
    ///
    /// This is how package registration seeds configurations. The owning
    /// package must already be registered.
    pub fn insert_config(&self, config: PluginConfig) -> Result<()> {
        let mut state = self.state.lock();
        if !state.packages.contains_key(&config.package_id) {
            return Err(PluginHubError::InvalidReference {
                reason: format!(
                    "cannot find plugin package with id={} for plugin config {}",
                    config.package_id, config.name
                ),
            });
        }
        self.record(&mut state, JournalEvent::ConfigsCommitted { configs: vec![config] })
    }

    /// Snapshot of a committed configuration.
    pub fn config(&self, config_id: i64) -> Option<PluginConfig> {
        self.state.lock().configs.get(&config_id).cloned()
    }

    /// Journal the event, then apply it. Nothing changes if the append fails.
    fn record(&self, state: &mut StoreState, event: JournalEvent) -> Result<()> {
        if let Some(journal) = &self.journal {
            journal.append(&event)?;
        }
        state.apply(event);
        Ok(())
    }
}

impl PluginStore for MemoryStore {
    type Transaction<'a>
        = MemoryTransaction<'a>
    where
        Self: 'a;

    fn begin(&self) -> Result<MemoryTransaction<'_>> {
        Ok(MemoryTransaction {
            state: self.state.lock(),
            staged: BTreeMap::new(),
            journal: self.journal.as_ref(),
        })
    }
}

/// An exclusive transaction over a [`MemoryStore`].
pub struct MemoryTransaction<'a> {
    state: MutexGuard<'a, StoreState>,
    staged: BTreeMap<i64, PluginConfig>,
    journal: Option<&'a Journal>,
}

impl MemoryTransaction<'_> {
    /// Committed configurations overlaid with this transaction's writes.
    fn configs(&self) -> impl Iterator<Item = &PluginConfig> {
        let committed = self
            .state
            .configs
            .iter()
            .filter(|(id, _)| !self.staged.contains_key(*id))
            .map(|(_, config)| config);
        committed.chain(self.staged.values())
    }

    fn enabled_configs(&self) -> impl Iterator<Item = &PluginConfig> {
        self.configs().filter(|config| config.is_enabled())
    }

    /// Order two configurations by package version, then by id.
    fn recency(&self, a: &PluginConfig, b: &PluginConfig) -> Ordering {
        let by_package = match (
            self.state.packages.get(&a.package_id),
            self.state.packages.get(&b.package_id),
        ) {
            (Some(pa), Some(pb)) => pa.cmp_version(pb),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        by_package.then(a.id.cmp(&b.id))
    }
}

impl PluginRepository for MemoryTransaction<'_> {
    fn package_by_id(&self, package_id: i64) -> Result<Option<PluginPackage>> {
        Ok(self.state.packages.get(&package_id).cloned())
    }

    fn config_by_id(&self, config_id: i64) -> Result<Option<PluginConfig>> {
        Ok(self
            .staged
            .get(&config_id)
            .or_else(|| self.state.configs.get(&config_id))
            .cloned())
    }

    fn save_config(&mut self, config: PluginConfig) -> Result<PluginConfig> {
        self.staged.insert(config.id, config.clone());
        Ok(config)
    }

    fn entity_exists(&self, entity_id: i64) -> Result<bool> {
        Ok(self.state.entities.contains_key(&entity_id))
    }

    fn interfaces_by_config_id(&self, config_id: i64) -> Result<Vec<PluginConfigInterface>> {
        Ok(self
            .config_by_id(config_id)?
            .map(|config| config.interfaces)
            .unwrap_or_default())
    }

    fn latest_enabled_interface_by_service_name(
        &self,
        service_name: &str,
    ) -> Result<Option<PluginConfigInterface>> {
        let mut latest: Option<(&PluginConfig, &PluginConfigInterface)> = None;
        for config in self.enabled_configs() {
            let Some(intf) = config
                .interfaces
                .iter()
                .find(|intf| intf.service_name == service_name)
            else {
                continue;
            };
            let newer = match latest {
                Some((current, _)) => self.recency(config, current) == Ordering::Greater,
                None => true,
            };
            if newer {
                latest = Some((config, intf));
            }
        }
        Ok(latest.map(|(_, intf)| intf.clone()))
    }

    fn enabled_interfaces(&self) -> Result<Vec<PluginConfigInterface>> {
        Ok(self
            .enabled_configs()
            .flat_map(|config| config.interfaces.iter().cloned())
            .collect())
    }

    fn enabled_interfaces_for_entity(&self, entity_id: i64) -> Result<Vec<PluginConfigInterface>> {
        Ok(self
            .enabled_configs()
            .filter(|config| config.entity_id == Some(entity_id))
            .flat_map(|config| config.interfaces.iter().cloned())
            .collect())
    }
}

impl StoreTransaction for MemoryTransaction<'_> {
    fn commit(mut self) -> Result<()> {
        if self.staged.is_empty() {
            return Ok(());
        }

        let configs: Vec<PluginConfig> = std::mem::take(&mut self.staged).into_values().collect();
        let event = JournalEvent::ConfigsCommitted { configs };
        if let Some(journal) = self.journal {
            journal.append(&event)?;
        }
        debug!("committed transaction");
        self.state.apply(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pluginhub_types::ConfigStatus;

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .register_package(PluginPackage::new(1, "cmdb", "1.0.0", PackageStatus::Running))
            .unwrap();
        store
            .register_package(PluginPackage::new(2, "cmdb", "1.2.0", PackageStatus::Running))
            .unwrap();
        store
            .register_entity(PluginPackageEntity { id: 30, name: "host".into() })
            .unwrap();
        store
    }

    fn config_with_service(id: i64, package_id: i64, service: &str) -> PluginConfig {
        let mut config = PluginConfig::new(id, package_id, format!("config-{id}"));
        config.interfaces.push(PluginConfigInterface {
            config_id: id,
            ..PluginConfigInterface::new(id * 100, "create", service)
        });
        config
    }

    #[test]
    fn uncommitted_writes_are_discarded() {
        let store = seeded();
        store.insert_config(PluginConfig::new(5, 1, "host")).unwrap();

        {
            let mut tx = store.begin().unwrap();
            let config = tx.config_by_id(5).unwrap().unwrap();
            tx.save_config(config.with_status(ConfigStatus::Enabled)).unwrap();
            assert!(tx.config_by_id(5).unwrap().unwrap().is_enabled());
        }

        assert_eq!(store.config(5).unwrap().status, ConfigStatus::Disabled);
    }

    #[test]
    fn committed_writes_are_visible() {
        let store = seeded();
        store.insert_config(PluginConfig::new(5, 1, "host")).unwrap();

        let mut tx = store.begin().unwrap();
        let config = tx.config_by_id(5).unwrap().unwrap();
        tx.save_config(config.with_status(ConfigStatus::Enabled)).unwrap();
        tx.commit().unwrap();

        assert!(store.config(5).unwrap().is_enabled());
    }

    #[test]
    fn insert_config_requires_package() {
        let store = seeded();
        let err = store.insert_config(PluginConfig::new(5, 99, "host")).unwrap_err();
        assert!(matches!(err, PluginHubError::InvalidReference { .. }));
    }

    #[test]
    fn set_status_of_unknown_package_fails() {
        let store = seeded();
        let err = store.set_package_status(42, PackageStatus::Stopped).unwrap_err();
        assert!(matches!(err, PluginHubError::NotFound { .. }));
    }

    #[test]
    fn latest_enabled_interface_prefers_newest_package() {
        let store = seeded();
        store
            .insert_config(
                config_with_service(5, 1, "cmdb/host/create").with_status(ConfigStatus::Enabled),
            )
            .unwrap();
        store
            .insert_config(
                config_with_service(6, 2, "cmdb/host/create").with_status(ConfigStatus::Enabled),
            )
            .unwrap();
        store.insert_config(config_with_service(7, 2, "cmdb/vm/create")).unwrap();

        let tx = store.begin().unwrap();
        let intf = tx
            .latest_enabled_interface_by_service_name("cmdb/host/create")
            .unwrap()
            .unwrap();
        assert_eq!(intf.config_id, 6);
        assert!(tx
            .latest_enabled_interface_by_service_name("cmdb/vm/create")
            .unwrap()
            .is_none());
    }

    #[test]
    fn enabled_interfaces_filter_by_entity() {
        let store = seeded();
        let mut bound = config_with_service(5, 1, "a").with_status(ConfigStatus::Enabled);
        bound.entity_id = Some(30);
        store.insert_config(bound).unwrap();
        store
            .insert_config(config_with_service(6, 1, "b").with_status(ConfigStatus::Enabled))
            .unwrap();

        let tx = store.begin().unwrap();
        assert_eq!(tx.enabled_interfaces().unwrap().len(), 2);
        let for_entity = tx.enabled_interfaces_for_entity(30).unwrap();
        assert_eq!(for_entity.len(), 1);
        assert_eq!(for_entity[0].service_name, "a");
        assert!(tx.enabled_interfaces_for_entity(31).unwrap().is_empty());
    }

    #[test]
    fn journal_replay_restores_state() {
        let dir = std::env::temp_dir().join(format!("pluginhub-store-{}", uuid::Uuid::new_v4()));
        let path = dir.join("journal.jsonl");

        {
            let store = MemoryStore::open(path.clone()).unwrap();
            store
                .register_package(PluginPackage::new(1, "cmdb", "1.0.0", PackageStatus::Registered))
                .unwrap();
            store.set_package_status(1, PackageStatus::Running).unwrap();
            store.insert_config(PluginConfig::new(5, 1, "host")).unwrap();

            let mut tx = store.begin().unwrap();
            let config = tx.config_by_id(5).unwrap().unwrap();
            tx.save_config(config.with_status(ConfigStatus::Enabled)).unwrap();
            tx.commit().unwrap();

            // Rolled back: must not reach the journal.
            let mut tx = store.begin().unwrap();
            tx.save_config(PluginConfig::new(6, 1, "vm")).unwrap();
        }

        let reopened = MemoryStore::open(path).unwrap();
        assert!(reopened.config(5).unwrap().is_enabled());
        assert!(reopened.config(6).is_none());
        let tx = reopened.begin().unwrap();
        assert_eq!(
            tx.package_by_id(1).unwrap().unwrap().status,
            PackageStatus::Running
        );
        drop(tx);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
