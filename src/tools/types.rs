//! Tool schema types: parameter schemas and advertised definitions.

use serde::{Deserialize, Serialize};

/// Tool schema offered to the model for one invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// JSON Schema-based parameter definition for a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameters {
    /// JSON Schema object describing the parameters.
    pub schema: serde_json::Value,
}

impl ToolParameters {
    /// Create from a raw JSON Schema value.
    pub fn from_schema(schema: serde_json::Value) -> Self {
        Self { schema }
    }

    /// Create an empty parameter schema (no parameters).
    pub fn empty() -> Self {
        Self {
            schema: serde_json::json!({
                "type": "object",
                "properties": {},
                "required": [],
            }),
        }
    }

    /// Builder: create an object schema with properties.
    pub fn object() -> ParameterBuilder {
        ParameterBuilder {
            properties: serde_json::Map::new(),
            required: Vec::new(),
            description: None,
        }
    }
}

/// Builder for constructing tool parameter schemas.
pub struct ParameterBuilder {
    properties: serde_json::Map<String, serde_json::Value>,
    required: Vec<String>,
    description: Option<String>,
}

impl ParameterBuilder {
    fn property(
        mut self,
        name: impl Into<String>,
        property: serde_json::Value,
        required: bool,
    ) -> Self {
        let name = name.into();
        self.properties.insert(name.clone(), property);
        if required {
            self.required.push(name);
        }
        self
    }

    /// Add a string property.
    pub fn string(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        let property = serde_json::json!({
            "type": "string",
            "description": description.into(),
        });
        self.property(name, property, required)
    }

    /// Add a number property.
    pub fn number(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        let property = serde_json::json!({
            "type": "number",
            "description": description.into(),
        });
        self.property(name, property, required)
    }

    /// Add a boolean property.
    pub fn boolean(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        let property = serde_json::json!({
            "type": "boolean",
            "description": description.into(),
        });
        self.property(name, property, required)
    }

    /// Describe the object as a whole.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Build into ToolParameters.
    pub fn build(self) -> ToolParameters {
        let mut schema = serde_json::json!({
            "type": "object",
            "properties": self.properties,
            "required": self.required,
            "additionalProperties": false,
        });
        if let (Some(description), Some(obj)) = (self.description, schema.as_object_mut()) {
            obj.insert("description".into(), description.into());
        }
        ToolParameters { schema }
    }
}
