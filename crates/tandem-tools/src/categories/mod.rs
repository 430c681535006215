//! Built-in tool categories
//!
//! Each category registers a fixed set of tools in declaration order. The
//! registry loads a category at most once through
//! [`ToolRegistry::ensure_category`].

pub mod diagnostics;
pub mod files;
pub mod search;
pub mod shell;
pub mod tasks;

use serde_json::Value;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::error::{RegistryError, ToolError};
use crate::registry::ToolRegistry;

/// Group of related built-in tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ToolCategory {
    Files,
    Search,
    Shell,
    Tasks,
    Diagnostics,
}

impl ToolCategory {
    /// Register this category's tools, overwriting same-named tools
    pub fn register(self, registry: &ToolRegistry) {
        match self {
            Self::Files => files::register_file_tools(registry),
            Self::Search => search::register_search_tools(registry),
            Self::Shell => shell::register_shell_tools(registry),
            Self::Tasks => tasks::register_task_tools(registry),
            Self::Diagnostics => diagnostics::register_diagnostic_tools(registry),
        }
    }
}

/// Load every built-in category
pub fn register_builtin_tools(registry: &ToolRegistry) {
    for category in ToolCategory::iter() {
        registry.ensure_category(category);
    }
}

/// Load the named categories, as listed in configuration
///
/// Nothing is registered if any name is unknown.
pub fn register_categories<S: AsRef<str>>(registry: &ToolRegistry, names: &[S]) -> Result<(), RegistryError> {
    let categories = names
        .iter()
        .map(|name| {
            name.as_ref()
                .parse::<ToolCategory>()
                .map_err(|_| RegistryError::UnknownCategory {
                    category: name.as_ref().to_owned(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    for category in categories {
        registry.ensure_category(category);
    }
    Ok(())
}

// -- Argument helpers shared by the handlers --

pub(crate) fn required_str<'a>(args: &'a Value, name: &str) -> Result<&'a str, ToolError> {
    args.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::invalid_argument(name, "a string"))
}

pub(crate) fn optional_str<'a>(args: &'a Value, name: &str) -> Result<Option<&'a str>, ToolError> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(ToolError::invalid_argument(name, "a string")),
    }
}

pub(crate) fn optional_u64(args: &Value, name: &str) -> Result<Option<u64>, ToolError> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .map(Some)
            .ok_or_else(|| ToolError::invalid_argument(name, "a non-negative integer")),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::Permission;

    #[test]
    fn builtin_tools_have_expected_tiers() {
        let registry = ToolRegistry::new();
        register_builtin_tools(&registry);

        assert_eq!(
            registry.names(),
            [
                "read_file",
                "write_file",
                "list_directory",
                "glob_files",
                "search_files",
                "run_command",
                "todo_write",
                "todo_read",
                "environment_info",
                "validate_json",
            ]
        );
        assert_eq!(registry.permission("write_file").unwrap(), Permission::Unsafe);
        assert_eq!(registry.permission("run_command").unwrap(), Permission::Unsafe);
        assert_eq!(registry.permission("read_file").unwrap(), Permission::Safe);
        assert_eq!(registry.overwrite_count(), 0);
    }

    #[test]
    fn categories_parse_from_config_names() {
        assert_eq!("files".parse::<ToolCategory>().unwrap(), ToolCategory::Files);
        assert_eq!(ToolCategory::Diagnostics.to_string(), "diagnostics");
        let name: &'static str = ToolCategory::Shell.into();
        assert_eq!(name, "shell");
    }

    #[test]
    fn every_category_name_is_accepted() {
        let names: Vec<&'static str> = ToolCategory::iter().map(Into::into).collect();
        let registry = ToolRegistry::new();
        register_categories(&registry, &names).unwrap();

        for category in ToolCategory::iter() {
            assert!(registry.is_loaded(category), "{category} not loaded");
        }
    }

    #[test]
    fn unknown_category_registers_nothing() {
        let registry = ToolRegistry::new();
        let err = register_categories(&registry, &["files", "network"]).unwrap_err();

        assert_eq!(
            err,
            RegistryError::UnknownCategory {
                category: "network".to_owned()
            }
        );
        assert!(registry.is_empty());

        register_categories(&registry, &["tasks".to_owned()]).unwrap();
        assert!(registry.is_loaded(ToolCategory::Tasks));
        assert!(!registry.is_loaded(ToolCategory::Files));
    }

    #[test]
    fn argument_helpers_validate_types() {
        let args = json!({"path": "a.txt", "limit": 5, "bad": -1, "none": null});

        assert_eq!(required_str(&args, "path").unwrap(), "a.txt");
        assert!(required_str(&args, "limit").is_err());
        assert_eq!(optional_u64(&args, "limit").unwrap(), Some(5));
        assert_eq!(optional_u64(&args, "none").unwrap(), None);
        assert!(optional_u64(&args, "bad").is_err());
        assert_eq!(optional_str(&args, "missing").unwrap(), None);
        assert!(optional_str(&args, "limit").is_err());
    }
}
