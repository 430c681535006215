/// Failure reported by a tool handler
///
/// The message is what the model sees in the error-flagged tool result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ToolError {
    pub message: String,
}

impl ToolError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// A required argument is missing or has the wrong type
    pub fn invalid_argument(name: &str, expected: &str) -> Self {
        Self::new(format!("'{name}' must be {expected}"))
    }
}

impl From<std::io::Error> for ToolError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Errors from registry lookups
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// No tool with this name is registered
    #[error("tool not found: {tool}")]
    NotFound { tool: String },

    /// Configuration named a category that does not exist
    #[error("unknown tool category: {category}")]
    UnknownCategory { category: String },
}
