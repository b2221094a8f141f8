//! # pluginhub-core
//!
//! Validation and lifecycle control for plugin configurations.
//!
//! A plugin configuration moves between `DISABLED` and `ENABLED`. Content
//! edits always land in `DISABLED`; enabling is gated on the owning
//! package's status, on bound entities still existing, and on every
//! required interface parameter being mapped.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`lifecycle`] | [`LifecycleController`]: update / enable / disable |
//! | [`queries`] | Read-only interface lookups on the controller |
//! | [`validator`] | Save-time and enable-time structural checks |
//! | [`state`] | Pure status transition functions |
//! | [`store`] | Repository/transaction traits and [`MemoryStore`] |
//! | [`settings_loader`] | Settings discovery and loading |
//!
//! # Example
//!
//! ```
//! use pluginhub_core::{LifecycleController, MemoryStore};
//! use pluginhub_types::{ConfigStatus, PackageStatus, PluginConfig, PluginPackage};
//!
//! let store = MemoryStore::new();
//! store.register_package(PluginPackage::new(1, "cmdb", "1.0.0", PackageStatus::Running))?;
//! store.insert_config(PluginConfig::new(5, 1, "host"))?;
//!
//! let controller = LifecycleController::new(store);
//! assert_eq!(controller.enable(5)?.status, ConfigStatus::Enabled);
//! assert_eq!(controller.disable(5)?.status, ConfigStatus::Disabled);
//! # Ok::<(), pluginhub_types::PluginHubError>(())
//! ```

pub mod lifecycle;
pub mod queries;
pub mod settings_loader;
pub mod state;
pub mod store;
pub mod validator;

pub use lifecycle::LifecycleController;
pub use store::{
    open_store, MemoryStore, PluginRepository, PluginStore, StoreTransaction,
};
pub use validator::{Direction, MappingViolation, SaveTarget};
