//! Error types for pluginhub.
//!
//! Provides [`PluginHubError`], the single error type returned by validation,
//! lifecycle transitions, queries and the reference stores. Every variant is
//! an expected, caller-handleable outcome; none of them is retried.

use thiserror::Error;

use crate::interface::MappingType;
use crate::package::PackageStatus;
use crate::plugin_config::ConfigStatus;

/// Top-level error type for pluginhub.
///
/// The first six variants are the lifecycle taxonomy. Messages carry the
/// offending id or name so callers can surface them verbatim.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PluginHubError {
    // ── Validation ───────────────────────────────────────────────────

    /// A foreign key (package or entity) does not resolve.
    #[error("invalid reference: {reason}")]
    InvalidReference {
        /// Which reference is dangling.
        reason: String,
    },

    /// The configuration's own id is malformed or unknown.
    #[error("invalid identity: {reason}")]
    InvalidIdentity {
        /// What is wrong with the id.
        reason: String,
    },

    /// The requested transition is not allowed from the current status.
    #[error("cannot {action} plugin config {config_id} with status {status}")]
    IllegalStateTransition {
        /// Configuration the transition was attempted on.
        config_id: i64,
        /// Status the configuration was in.
        status: ConfigStatus,
        /// The attempted operation (`"update"`, `"enable"`).
        action: &'static str,
    },

    /// The parent package is missing or not in an activatable status.
    #[error(
        "plugin package {package_id} is not in a valid status [REGISTERED, RUNNING, STOPPED] \
         to enable plugin config {config_id} (found {})",
        status_label(.status)
    )]
    InvalidPackageState {
        /// Configuration being enabled.
        config_id: i64,
        /// Package the configuration belongs to.
        package_id: i64,
        /// Status of the package, `None` when the package does not exist.
        status: Option<PackageStatus>,
    },

    /// A required parameter has no mapping target.
    #[error("{} is required for parameter [{parameter_id}]", .mapping.required_source())]
    MissingMapping {
        /// Id of the offending parameter.
        parameter_id: i64,
        /// Mapping type the parameter declares.
        mapping: MappingType,
    },

    /// No record exists for the given id or service name.
    #[error("{what} not found")]
    NotFound {
        /// Description of the missing record.
        what: String,
    },

    // ── Storage ──────────────────────────────────────────────────────

    /// The persistence collaborator failed.
    #[error("storage error: {reason}")]
    Storage {
        /// What went wrong in the store.
        reason: String,
    },

    /// Underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization / deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PluginHubError {
    /// Shorthand for a [`PluginHubError::NotFound`] on a plugin config id.
    pub fn config_not_found(config_id: i64) -> Self {
        Self::NotFound {
            what: format!("plugin config with id {config_id}"),
        }
    }
}

fn status_label(status: &Option<PackageStatus>) -> &'static str {
    status.map_or("MISSING", PackageStatus::as_str)
}

/// A convenience alias used throughout pluginhub.
pub type Result<T> = std::result::Result<T, PluginHubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_mapping_names_the_source() {
        let err = PluginHubError::MissingMapping {
            parameter_id: 42,
            mapping: MappingType::Entity,
        };
        assert_eq!(
            err.to_string(),
            "entity expression is required for parameter [42]"
        );

        let err = PluginHubError::MissingMapping {
            parameter_id: 7,
            mapping: MappingType::SystemVariable,
        };
        assert_eq!(
            err.to_string(),
            "system variable is required for parameter [7]"
        );
    }

    #[test]
    fn illegal_transition_display() {
        let err = PluginHubError::IllegalStateTransition {
            config_id: 5,
            status: ConfigStatus::Enabled,
            action: "enable",
        };
        assert_eq!(
            err.to_string(),
            "cannot enable plugin config 5 with status ENABLED"
        );
    }

    #[test]
    fn invalid_package_state_reports_missing_package() {
        let err = PluginHubError::InvalidPackageState {
            config_id: 5,
            package_id: 3,
            status: None,
        };
        let msg = err.to_string();
        assert!(msg.contains("plugin package 3"));
        assert!(msg.contains("found MISSING"));

        let err = PluginHubError::InvalidPackageState {
            config_id: 5,
            package_id: 3,
            status: Some(PackageStatus::Decommissioned),
        };
        assert!(err.to_string().contains("found DECOMMISSIONED"));
    }

    #[test]
    fn config_not_found_display() {
        let err = PluginHubError::config_not_found(9);
        assert_eq!(err.to_string(), "plugin config with id 9 not found");
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: PluginHubError = io_err.into();
        assert!(matches!(err, PluginHubError::Io(_)));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{{bad}}").unwrap_err();
        let err: PluginHubError = json_err.into();
        assert!(matches!(err, PluginHubError::Json(_)));
    }
}
