//! Parameter schemas advertised to the reasoning engine.
//!
//! The shape is the JSON-Schema subset every function-calling API accepts:
//! `{type: "object", properties: {field: {type, description, enum?}},
//! required: [...]}`. The engine does not need these to execute a tool.

use std::collections::BTreeMap;

use serde::Serialize;

/// Schema of a single named parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertySchema {
    /// JSON type name (`string`, `object`, ...).
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// What the parameter means.
    pub description: &'static str,
    /// Allowed values, if restricted.
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<&'static str>>,
}

/// Schema of a tool's argument object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterSchema {
    /// Always `object`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Declared parameters by name.
    pub properties: BTreeMap<&'static str, PropertySchema>,
    /// Names of mandatory parameters.
    pub required: Vec<&'static str>,
}

impl ParameterSchema {
    /// Empty object schema.
    pub const fn object() -> Self {
        Self {
            kind: "object",
            properties: BTreeMap::new(),
            required: Vec::new(),
        }
    }

    /// Add a required string parameter.
    #[must_use]
    pub fn required(mut self, name: &'static str, description: &'static str) -> Self {
        self.properties.insert(name, PropertySchema { kind: "string", description, allowed: None });
        self.required.push(name);
        self
    }

    /// Add an optional parameter of any JSON type.
    #[must_use]
    pub fn optional(
        mut self,
        name: &'static str,
        kind: &'static str,
        description: &'static str,
    ) -> Self {
        self.properties.insert(name, PropertySchema { kind, description, allowed: None });
        self
    }

    /// Add a required string parameter restricted to `values`.
    #[must_use]
    pub fn required_one_of(
        mut self,
        name: &'static str,
        description: &'static str,
        values: &[&'static str],
    ) -> Self {
        self.properties.insert(
            name,
            PropertySchema { kind: "string", description, allowed: Some(values.to_vec()) },
        );
        self.required.push(name);
        self
    }
}

/// Full description of a tool for the reasoning engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolSchema {
    /// Registered tool name.
    pub name: &'static str,
    /// When and how to use the tool.
    pub description: &'static str,
    /// Argument schema.
    pub parameters: ParameterSchema,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_function_calling_shape() {
        let schema = ToolSchema {
            name: "move_object",
            description: "Move things",
            parameters: ParameterSchema::object()
                .required("objectId", "What to move")
                .optional("note", "string", "Optional note"),
        };
        let value = serde_json::to_value(&schema).unwrap_or_default();
        assert_eq!(value.pointer("/parameters/type"), Some(&serde_json::json!("object")));
        assert_eq!(
            value.pointer("/parameters/properties/objectId/type"),
            Some(&serde_json::json!("string"))
        );
        assert_eq!(value.pointer("/parameters/required/0"), Some(&serde_json::json!("objectId")));
        assert!(value.pointer("/parameters/properties/note/enum").is_none());
    }

    #[test]
    fn restricted_values_serialize_as_enum() {
        let schema = ParameterSchema::object().required_one_of(
            "direction",
            "Which way",
            &["in", "out", "bidirectional"],
        );
        let value = serde_json::to_value(&schema).unwrap_or_default();
        assert_eq!(
            value.pointer("/properties/direction/enum"),
            Some(&serde_json::json!(["in", "out", "bidirectional"]))
        );
        assert_eq!(value.pointer("/required/0"), Some(&serde_json::json!("direction")));
    }
}
