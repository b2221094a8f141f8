//! Plugin package types.
//!
//! A [`PluginPackage`] is the deployable unit that owns plugin
//! configurations. Its [`PackageStatus`] is driven by the package installer;
//! pluginhub only reads it to decide whether a configuration may be enabled.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a plugin package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageStatus {
    /// Uploaded but not yet registered.
    Unregistered,
    /// Registered with the platform.
    Registered,
    /// Registered and an instance is running.
    Running,
    /// Registered but all instances are stopped.
    Stopped,
    /// Retired; its configurations can no longer be activated.
    Decommissioned,
}

impl PackageStatus {
    /// Wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unregistered => "UNREGISTERED",
            Self::Registered => "REGISTERED",
            Self::Running => "RUNNING",
            Self::Stopped => "STOPPED",
            Self::Decommissioned => "DECOMMISSIONED",
        }
    }

    /// Whether configurations of a package in this status may be enabled.
    pub fn permits_enable(self) -> bool {
        matches!(self, Self::Registered | Self::Running | Self::Stopped)
    }
}

impl fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A deployable plugin package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginPackage {
    /// Unique package identifier.
    pub id: i64,

    /// Package name (e.g. `"service-mgmt"`).
    pub name: String,

    /// Package version, normally semver (e.g. `"v1.2.0"` or `"1.2.0"`).
    pub version: String,

    /// Current lifecycle status.
    pub status: PackageStatus,
}

impl PluginPackage {
    /// Create a package record.
    pub fn new(
        id: i64,
        name: impl Into<String>,
        version: impl Into<String>,
        status: PackageStatus,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            version: version.into(),
            status,
        }
    }

    /// Parse the version as semver, tolerating a leading `v`.
    pub fn semver(&self) -> Option<semver::Version> {
        let raw = self.version.trim();
        let raw = raw.strip_prefix('v').unwrap_or(raw);
        semver::Version::parse(raw).ok()
    }

    /// Order two packages by version.
    ///
    /// Parsed semver versions sort above unparseable ones; two unparseable
    /// versions compare lexically.
    pub fn cmp_version(&self, other: &Self) -> Ordering {
        match (self.semver(), other.semver()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => self.version.cmp(&other.version),
        }
    }
}

/// An external domain entity a configuration may bind to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginPackageEntity {
    /// Unique entity identifier.
    pub id: i64,

    /// Entity name within its data model (e.g. `"host"`).
    #[serde(default)]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_registered_running_stopped_permit_enable() {
        assert!(PackageStatus::Registered.permits_enable());
        assert!(PackageStatus::Running.permits_enable());
        assert!(PackageStatus::Stopped.permits_enable());
        assert!(!PackageStatus::Unregistered.permits_enable());
        assert!(!PackageStatus::Decommissioned.permits_enable());
    }

    #[test]
    fn status_serde_uses_wire_names() {
        let json = serde_json::to_string(&PackageStatus::Decommissioned).unwrap();
        assert_eq!(json, "\"DECOMMISSIONED\"");
        let status: PackageStatus = serde_json::from_str("\"RUNNING\"").unwrap();
        assert_eq!(status, PackageStatus::Running);
    }

    #[test]
    fn version_ordering_prefers_semver() {
        let old = PluginPackage::new(1, "cmdb", "v1.2.0", PackageStatus::Running);
        let new = PluginPackage::new(2, "cmdb", "1.10.0", PackageStatus::Running);
        let junk = PluginPackage::new(3, "cmdb", "nightly", PackageStatus::Running);

        assert_eq!(new.cmp_version(&old), Ordering::Greater);
        assert_eq!(old.cmp_version(&junk), Ordering::Greater);
        assert_eq!(junk.cmp_version(&new), Ordering::Less);
    }
}
