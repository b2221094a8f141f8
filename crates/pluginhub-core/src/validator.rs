//! Structural validation of plugin configurations.
//!
//! Two checks gate every mutation:
//!
//! - [`validate_for_save`] runs before a content update is persisted.
//! - [`validate_mandatory_parameters`] runs before a configuration is
//!   enabled.
//!
//! Both are pure functions of the data they are handed. Existence facts
//! come in as predicates so the caller decides how to look them up.

use pluginhub_types::{
    ConfigStatus, InterfaceParameter, MappingType, PluginConfig, PluginConfigDraft,
    PluginConfigInterface, PluginHubError, Result,
};
use tracing::{error, warn};

use crate::state;

/// Where and how a validated draft is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveTarget {
    /// Id of the existing configuration being overwritten.
    pub config_id: i64,
    /// Id of the owning package.
    pub package_id: i64,
    /// Status the saved record takes.
    pub status: ConfigStatus,
}

/// Check a save candidate against the stored state.
///
/// `existing` is the stored record for the draft's id, if one was found.
/// Checks run in a fixed order and the first failure is returned:
///
/// 1. the package id is positive and the package exists,
/// 2. the draft id is positive and a stored record exists,
/// 3. a bound entity (id `> 0`) exists,
/// 4. the stored record is not enabled.
pub fn validate_for_save(
    draft: &PluginConfigDraft,
    existing: Option<&PluginConfig>,
    package_exists: impl Fn(i64) -> Result<bool>,
    entity_exists: impl Fn(i64) -> Result<bool>,
) -> Result<SaveTarget> {
    let Some(package_id) = draft.package_id.filter(|id| *id > 0) else {
        return Err(dangling_package(draft));
    };
    if !package_exists(package_id)? {
        return Err(dangling_package(draft));
    }

    let Some(config_id) = draft.id.filter(|id| *id > 0) else {
        return Err(PluginHubError::InvalidIdentity {
            reason: format!("invalid plugin config id: {}", display_id(draft.id)),
        });
    };
    let Some(existing) = existing.filter(|config| config.id == config_id) else {
        return Err(PluginHubError::InvalidIdentity {
            reason: format!("plugin config not found for id: {config_id}"),
        });
    };

    if let Some(entity_id) = draft.bound_entity() {
        ensure_entity_exists(entity_id, &draft.name, entity_exists(entity_id)?)?;
    }

    let status = state::on_update(existing.id, existing.status)?;

    Ok(SaveTarget {
        config_id,
        package_id,
        status,
    })
}

/// Fail with [`PluginHubError::InvalidReference`] when a bound entity is gone.
pub fn ensure_entity_exists(entity_id: i64, config_name: &str, exists: bool) -> Result<()> {
    if exists {
        return Ok(());
    }
    let reason = format!(
        "plugin package entity not found for id: [{entity_id}] for plugin config: {config_name}"
    );
    error!(entity_id, config = config_name, "{reason}");
    Err(PluginHubError::InvalidReference { reason })
}

fn dangling_package(draft: &PluginConfigDraft) -> PluginHubError {
    warn!(
        package_id = ?draft.package_id,
        config = %draft.name,
        "rejecting save with dangling package"
    );
    PluginHubError::InvalidReference {
        reason: format!(
            "cannot find plugin package with id={} for plugin config {}",
            display_id(draft.package_id),
            draft.name
        ),
    }
}

fn display_id(id: Option<i64>) -> String {
    id.map_or_else(|| "null".to_string(), |id| id.to_string())
}

// ── Mandatory parameters ────────────────────────────────────────────────

/// Which parameter set a violation was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Input parameter.
    Input,
    /// Output parameter.
    Output,
}

/// A required parameter without its mapping target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingViolation {
    /// Interface the parameter belongs to.
    pub interface_id: i64,
    /// Offending parameter.
    pub parameter_id: i64,
    /// Input or output.
    pub direction: Direction,
    /// The parameter's mapping type.
    pub mapping: MappingType,
}

impl From<MappingViolation> for PluginHubError {
    fn from(violation: MappingViolation) -> Self {
        PluginHubError::MissingMapping {
            parameter_id: violation.parameter_id,
            mapping: violation.mapping,
        }
    }
}

/// Check that every required parameter of every interface is mapped.
///
/// Returns the first violation found. Empty interface or parameter sets are
/// valid.
pub fn validate_mandatory_parameters(config: &PluginConfig) -> Result<()> {
    match violations(config).next() {
        Some(violation) => Err(violation.into()),
        None => Ok(()),
    }
}

/// Every mandatory-parameter violation of `config`.
pub fn missing_mappings(config: &PluginConfig) -> Vec<MappingViolation> {
    violations(config).collect()
}

fn violations(config: &PluginConfig) -> impl Iterator<Item = MappingViolation> + '_ {
    config.interfaces.iter().flat_map(interface_violations)
}

fn interface_violations(
    intf: &PluginConfigInterface,
) -> impl Iterator<Item = MappingViolation> + '_ {
    let inputs = intf.input_parameters.iter().filter_map(move |param| {
        input_gap(param).map(|mapping| violation(intf, param, Direction::Input, mapping))
    });
    let outputs = intf.output_parameters.iter().filter_map(move |param| {
        output_gap(param).map(|mapping| violation(intf, param, Direction::Output, mapping))
    });
    inputs.chain(outputs)
}

fn violation(
    intf: &PluginConfigInterface,
    param: &InterfaceParameter,
    direction: Direction,
    mapping: MappingType,
) -> MappingViolation {
    MappingViolation {
        interface_id: intf.id,
        parameter_id: param.id,
        direction,
        mapping,
    }
}

/// Inputs need a system variable or a non-blank entity expression.
fn input_gap(param: &InterfaceParameter) -> Option<MappingType> {
    if !param.required {
        return None;
    }
    match param.mapping_type {
        MappingType::SystemVariable if !param.has_system_variable() => {
            Some(MappingType::SystemVariable)
        }
        MappingType::Entity if !param.has_entity_expression() => Some(MappingType::Entity),
        _ => None,
    }
}

/// Outputs are only checked for entity mappings.
fn output_gap(param: &InterfaceParameter) -> Option<MappingType> {
    if !param.required {
        return None;
    }
    match param.mapping_type {
        MappingType::Entity if !param.has_entity_expression() => Some(MappingType::Entity),
        _ => None,
    }
}
