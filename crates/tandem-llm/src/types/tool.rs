use serde::{Deserialize, Serialize};

/// Tool description advertised to a backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name
    pub name: String,
    /// What the tool does, shown to the model
    pub description: String,
    /// JSON Schema for the arguments object
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Parameter schema, defaulting to an empty object schema
    pub(crate) fn schema_or_empty(&self) -> serde_json::Value {
        if self.parameters.is_null() {
            serde_json::json!({"type": "object", "properties": {}})
        } else {
            self.parameters.clone()
        }
    }
}
