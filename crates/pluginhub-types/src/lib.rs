//! # pluginhub-types
//!
//! Core type definitions for the pluginhub plugin-configuration lifecycle
//! manager.
//!
//! This crate is the foundation of the dependency graph -- `pluginhub-core`
//! depends on it. It contains:
//!
//! - **[`error`]** -- [`PluginHubError`] and the crate-wide [`Result`] alias
//! - **[`package`]** -- Plugin packages, their lifecycle status and entities
//! - **[`plugin_config`]** -- Plugin configurations and save candidates
//! - **[`interface`]** -- Configuration interfaces and their parameters
//! - **[`settings`]** -- Runtime settings schema

pub mod error;
pub mod interface;
pub mod package;
pub mod plugin_config;
pub mod settings;

pub use error::{PluginHubError, Result};
pub use interface::{InterfaceParameter, MappingType, PluginConfigInterface};
pub use package::{PackageStatus, PluginPackage, PluginPackageEntity};
pub use plugin_config::{ConfigStatus, PluginConfig, PluginConfigDraft};
pub use settings::{Settings, StoreSettings};
