use serde::Deserialize;

/// Which tool categories to register at startup
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsConfig {
    /// Category names, checked when the tool registry loads them.
    /// Unset means every built-in category.
    #[serde(default)]
    pub categories: Option<Vec<String>>,
}
