use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};
use tandem_llm::ToolDefinition;

/// Permission tier of a tool
///
/// The registry only classifies. Whether an `unsafe` tool may run is decided
/// by the layer that drives the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Permission {
    /// Read-only or otherwise side-effect free
    Safe,
    /// Writes files, runs commands or otherwise changes the machine
    Unsafe,
}

impl Permission {
    /// Whether the user must approve a call before it runs
    pub const fn requires_confirmation(self) -> bool {
        matches!(self, Self::Unsafe)
    }
}

/// Everything the model and the permission gate need to know about a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique tool name
    pub name: String,
    /// Description shown to the model
    pub description: String,
    /// JSON Schema of the arguments object
    pub parameters: Value,
    /// Permission tier
    pub permission: Permission,
}

impl ToolSchema {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            permission: Permission::Safe,
        }
    }

    /// Mark the tool as requiring confirmation
    #[must_use]
    pub const fn unsafe_tool(mut self) -> Self {
        self.permission = Permission::Unsafe;
        self
    }

    /// Definition advertised to the backend
    pub fn to_definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name.clone(), self.description.clone(), self.parameters.clone())
    }
}
