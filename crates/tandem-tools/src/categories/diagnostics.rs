//! Diagnostic tools: host environment and JSON validation

use serde_json::{Value, json};

use super::required_str;
use crate::error::ToolError;
use crate::handler::{ToolOutput, handler_fn};
use crate::registry::ToolRegistry;
use crate::schema::ToolSchema;

/// Register `environment_info` and `validate_json`
pub fn register_diagnostic_tools(registry: &ToolRegistry) {
    registry.register(
        ToolSchema::new(
            "environment_info",
            "Describe the host: operating system, architecture, working directory and CPU count.",
            json!({"type": "object", "properties": {}}),
        ),
        handler_fn(|_args: Value| async move { environment_info().map(|info| ToolOutput::json(&info)) }),
    );

    registry.register(
        ToolSchema::new(
            "validate_json",
            "Check whether text is valid JSON and report where parsing fails.",
            json!({
                "type": "object",
                "properties": {
                    "text": {"type": "string", "description": "Text to validate"}
                },
                "required": ["text"]
            }),
        ),
        handler_fn(|args: Value| async move { required_str(&args, "text").map(validate_json) }),
    );
}

fn environment_info() -> Result<Value, ToolError> {
    let cwd = std::env::current_dir()?;
    let cpus = std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);

    Ok(json!({
        "os": std::env::consts::OS,
        "family": std::env::consts::FAMILY,
        "arch": std::env::consts::ARCH,
        "current_dir": cwd.display().to_string(),
        "temp_dir": std::env::temp_dir().display().to_string(),
        "cpus": cpus,
        "tandem_version": env!("CARGO_PKG_VERSION"),
    }))
}

fn validate_json(text: &str) -> String {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => {
            let kind = match &value {
                Value::Null => "null".to_owned(),
                Value::Bool(_) => "boolean".to_owned(),
                Value::Number(_) => "number".to_owned(),
                Value::String(_) => "string".to_owned(),
                Value::Array(items) => format!("array with {} items", items.len()),
                Value::Object(map) => format!("object with {} keys", map.len()),
            };
            format!("valid JSON: {kind}")
        }
        Err(e) => format!("invalid JSON: {e}"),
    }
}
