//! Configuration interface types.
//!
//! A [`PluginConfigInterface`] is one callable operation exposed by a plugin
//! configuration. Its inputs and outputs are [`InterfaceParameter`]s whose
//! values are sourced according to their [`MappingType`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a parameter's value is sourced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingType {
    /// Evaluated from an entity expression against the domain model.
    Entity,
    /// Read from a platform system variable.
    SystemVariable,
    /// Taken from the invocation context.
    Context,
    /// A literal supplied at invocation time.
    Constant,
    /// Absent or unrecognized; never validated.
    #[default]
    #[serde(other)]
    Other,
}

impl MappingType {
    /// Wire name of the mapping type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::SystemVariable => "system_variable",
            Self::Context => "context",
            Self::Constant => "constant",
            Self::Other => "other",
        }
    }

    /// Human-readable name of the mapping target a required parameter of
    /// this type must carry.
    pub fn required_source(self) -> &'static str {
        match self {
            Self::Entity => "entity expression",
            Self::SystemVariable => "system variable",
            _ => "mapping",
        }
    }
}

impl fmt::Display for MappingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One input or output parameter of an interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceParameter {
    /// Unique parameter identifier.
    pub id: i64,

    /// Parameter name as seen by the plugin.
    #[serde(default)]
    pub name: String,

    /// Declared data type (e.g. `"string"`, `"number"`).
    #[serde(default)]
    pub data_type: String,

    /// Whether the parameter must be mapped. Wire form is `"Y"` / `"N"`.
    #[serde(default, with = "yes_no")]
    pub required: bool,

    /// Where the parameter's value comes from. `null` reads as
    /// [`MappingType::Other`].
    #[serde(default, deserialize_with = "null_as_other")]
    pub mapping_type: MappingType,

    /// System variable reference, for [`MappingType::SystemVariable`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping_system_variable_id: Option<i64>,

    /// Entity expression, for [`MappingType::Entity`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping_entity_expression: Option<String>,
}

impl InterfaceParameter {
    /// An optional, unmapped parameter.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            data_type: "string".into(),
            required: false,
            mapping_type: MappingType::Other,
            mapping_system_variable_id: None,
            mapping_entity_expression: None,
        }
    }

    /// Mark the parameter as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Map the parameter to an entity expression.
    pub fn mapped_to_entity(mut self, expression: impl Into<String>) -> Self {
        self.mapping_type = MappingType::Entity;
        self.mapping_entity_expression = Some(expression.into());
        self
    }

    /// Map the parameter to a system variable.
    pub fn mapped_to_system_variable(mut self, variable_id: Option<i64>) -> Self {
        self.mapping_type = MappingType::SystemVariable;
        self.mapping_system_variable_id = variable_id;
        self
    }

    /// Whether a non-blank entity expression is set.
    pub fn has_entity_expression(&self) -> bool {
        self.mapping_entity_expression
            .as_deref()
            .is_some_and(|expr| !expr.trim().is_empty())
    }

    /// Whether a system variable reference is set.
    pub fn has_system_variable(&self) -> bool {
        self.mapping_system_variable_id.is_some()
    }
}

/// A callable operation belonging to one plugin configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConfigInterface {
    /// Unique interface identifier.
    pub id: i64,

    /// Owning configuration. Rewritten on save to the owner's id.
    #[serde(default)]
    pub config_id: i64,

    /// Action name (e.g. `"create"`, `"deploy"`).
    pub action: String,

    /// Fully qualified service name callers resolve the interface by.
    pub service_name: String,

    /// Invocation path on the plugin instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// HTTP method used for invocation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_method: Option<String>,

    /// Input parameters (unordered).
    #[serde(default)]
    pub input_parameters: Vec<InterfaceParameter>,

    /// Output parameters (unordered).
    #[serde(default)]
    pub output_parameters: Vec<InterfaceParameter>,
}

impl PluginConfigInterface {
    /// An interface with no parameters.
    pub fn new(id: i64, action: impl Into<String>, service_name: impl Into<String>) -> Self {
        Self {
            id,
            config_id: 0,
            action: action.into(),
            service_name: service_name.into(),
            path: None,
            http_method: None,
            input_parameters: Vec::new(),
            output_parameters: Vec::new(),
        }
    }

    /// Append an input parameter.
    pub fn with_input(mut self, parameter: InterfaceParameter) -> Self {
        self.input_parameters.push(parameter);
        self
    }

    /// Append an output parameter.
    pub fn with_output(mut self, parameter: InterfaceParameter) -> Self {
        self.output_parameters.push(parameter);
        self
    }
}

/// Serde adapter for the `"Y"` / `"N"` required flag.
///
/// `"Y"` in any case means required; every other string, `null` or a
/// missing field means not required. Booleans are accepted as well.
fn null_as_other<'de, D: serde::Deserializer<'de>>(
    deserializer: D,
) -> Result<MappingType, D::Error> {
    Ok(Option::<MappingType>::deserialize(deserializer)?.unwrap_or_default())
}

mod yes_no {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    pub fn serialize<S: Serializer>(required: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *required { "Y" } else { "N" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(match Option::<Flag>::deserialize(deserializer)? {
            Some(Flag::Bool(b)) => b,
            Some(Flag::Text(text)) => text.trim().eq_ignore_ascii_case("y"),
            None => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: serde_json::Value) -> InterfaceParameter {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn required_flag_is_case_insensitive_y() {
        assert!(parse(serde_json::json!({"id": 1, "required": "Y"})).required);
        assert!(parse(serde_json::json!({"id": 1, "required": "y"})).required);
        assert!(!parse(serde_json::json!({"id": 1, "required": "N"})).required);
        assert!(!parse(serde_json::json!({"id": 1, "required": "yes"})).required);
        assert!(!parse(serde_json::json!({"id": 1, "required": null})).required);
        assert!(!parse(serde_json::json!({"id": 1})).required);
        assert!(parse(serde_json::json!({"id": 1, "required": true})).required);
    }

    #[test]
    fn required_flag_serializes_as_y_n() {
        let param = InterfaceParameter::new(3, "host").required();
        let json = serde_json::to_value(&param).unwrap();
        assert_eq!(json["required"], "Y");
        assert_eq!(json["mapping_type"], "other");
    }

    #[test]
    fn unknown_mapping_type_is_other() {
        let param = parse(serde_json::json!({"id": 1, "mapping_type": "object"}));
        assert_eq!(param.mapping_type, MappingType::Other);
        let param = parse(serde_json::json!({"id": 1, "mapping_type": "system_variable"}));
        assert_eq!(param.mapping_type, MappingType::SystemVariable);
    }

    #[test]
    fn null_mapping_type_is_other() {
        let param: InterfaceParameter =
            serde_json::from_str(r#"{"id":1,"required":"N","mapping_type":null}"#).unwrap();
        assert_eq!(param.mapping_type, MappingType::Other);
        assert!(!param.required);
    }

    #[test]
    fn blank_entity_expression_is_not_a_mapping() {
        assert!(!InterfaceParameter::new(1, "a").has_entity_expression());
        assert!(!InterfaceParameter::new(1, "a").mapped_to_entity("").has_entity_expression());
        assert!(!InterfaceParameter::new(1, "a").mapped_to_entity(" \t\n").has_entity_expression());
        assert!(
            InterfaceParameter::new(1, "a")
                .mapped_to_entity("host.ip")
                .has_entity_expression()
        );
    }

    #[test]
    fn builders_compose() {
        let intf = PluginConfigInterface::new(10, "deploy", "svc/deploy")
            .with_input(InterfaceParameter::new(1, "in").required())
            .with_output(InterfaceParameter::new(2, "out").mapped_to_system_variable(Some(4)));
        assert_eq!(intf.input_parameters.len(), 1);
        assert!(intf.output_parameters[0].has_system_variable());
    }
}
