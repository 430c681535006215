//! Tool call dispatch
//!
//! Every failure mode becomes an error-flagged [`ToolResult`] so the model
//! can read it and recover; nothing here returns `Err` or panics outward.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tandem_llm::{Message, ToolCall};

use crate::registry::ToolRegistry;

/// Outcome of one tool call, fed back to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: String,
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }

    /// Tool message answering the given call
    ///
    /// Error results are prefixed so backends without an error flag still
    /// show the failure to the model.
    pub fn into_message(self, call_id: impl Into<String>) -> Message {
        let content = if self.is_error {
            format!("Error: {}", self.content)
        } else {
            self.content
        };
        Message::tool(call_id, content)
    }
}

/// Resolves tool calls against a registry and runs their handlers
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    pub const fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run one tool call
    ///
    /// No permission check happens here; callers gate `unsafe` tools before
    /// dispatching.
    pub async fn dispatch(&self, call: &ToolCall) -> ToolResult {
        let Ok(tool) = self.registry.get(&call.name) else {
            tracing::debug!(tool = %call.name, call_id = %call.id, "tool not found");
            return ToolResult::error(format!("tool not found: {}", call.name));
        };

        let args = match parse_arguments(&call.arguments) {
            Ok(args) => args,
            Err(e) => {
                tracing::debug!(tool = %call.name, call_id = %call.id, error = %e, "invalid tool arguments");
                return ToolResult::error(format!("invalid arguments for {}: {e}", call.name));
            }
        };

        let outcome = AssertUnwindSafe(tool.handler.call(args)).catch_unwind().await;

        let result = match outcome {
            Ok(Ok(output)) => ToolResult::success(output.content),
            Ok(Err(e)) => ToolResult::error(e.message),
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                tracing::error!(tool = %call.name, call_id = %call.id, %reason, "tool handler panicked");
                ToolResult::error(format!("tool {} panicked: {reason}", call.name))
            }
        };

        tracing::debug!(
            tool = %call.name,
            call_id = %call.id,
            is_error = result.is_error,
            "tool call finished"
        );
        result
    }

    /// Run calls concurrently, returning results in call order
    pub async fn dispatch_all(&self, calls: &[ToolCall]) -> Vec<ToolResult> {
        join_all(calls.iter().map(|call| self.dispatch(call))).await
    }
}

/// Decode argument text, treating blank text as an empty object
fn parse_arguments(arguments: &str) -> Result<Value, serde_json::Error> {
    if arguments.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(arguments)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_owned())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::error::ToolError;
    use crate::handler::{ToolHandler, ToolOutput, handler_fn};
    use crate::schema::ToolSchema;

    fn echo() -> impl ToolHandler {
        handler_fn(|args: Value| async move {
            args["text"]
                .as_str()
                .map(str::to_owned)
                .ok_or_else(|| ToolError::invalid_argument("text", "a string"))
        })
    }

    fn dispatcher_with_echo() -> Dispatcher {
        let registry = Arc::new(ToolRegistry::new());
        registry.register(ToolSchema::new("echo", "Echo text", json!({"type": "object"})), echo());
        Dispatcher::new(registry)
    }

    #[tokio::test]
    async fn echo_succeeds() {
        let dispatcher = dispatcher_with_echo();

        let result = dispatcher
            .dispatch(&ToolCall::new("c1", "echo", r#"{"text":"hi"}"#))
            .await;

        assert_eq!(result, ToolResult::success("hi"));
    }

    #[tokio::test]
    async fn missing_tool_is_error_result() {
        let dispatcher = dispatcher_with_echo();

        let result = dispatcher.dispatch(&ToolCall::new("c1", "missing", "{}")).await;

        assert!(result.is_error);
        assert!(result.content.contains("missing"));
    }

    #[tokio::test]
    async fn malformed_arguments_are_error_result() {
        let dispatcher = dispatcher_with_echo();

        let result = dispatcher.dispatch(&ToolCall::new("c1", "echo", "{not json")).await;

        assert!(result.is_error);
        assert!(result.content.starts_with("invalid arguments for echo:"));
    }

    #[tokio::test]
    async fn blank_arguments_are_empty_object() {
        let registry = Arc::new(ToolRegistry::new());
        registry.register(
            ToolSchema::new("keys", "Count keys", json!({"type": "object"})),
            handler_fn(|args: Value| async move {
                Ok::<_, ToolError>(args.as_object().map_or(0, serde_json::Map::len).to_string())
            }),
        );
        let dispatcher = Dispatcher::new(registry);

        let result = dispatcher.dispatch(&ToolCall::new("c1", "keys", "  ")).await;
        assert_eq!(result, ToolResult::success("0"));
    }

    #[tokio::test]
    async fn handler_error_is_error_result() {
        let dispatcher = dispatcher_with_echo();

        let result = dispatcher.dispatch(&ToolCall::new("c1", "echo", r#"{"text": 5}"#)).await;

        assert_eq!(result, ToolResult::error("'text' must be a string"));
    }

    struct Panics;

    #[async_trait::async_trait]
    impl ToolHandler for Panics {
        async fn call(&self, _args: Value) -> Result<ToolOutput, ToolError> {
            panic!("handler exploded")
        }
    }

    #[tokio::test]
    async fn handler_panic_is_contained() {
        let registry = Arc::new(ToolRegistry::new());
        registry.register(ToolSchema::new("boom", "Panics", json!({})), Panics);
        let dispatcher = Dispatcher::new(registry);

        let result = dispatcher.dispatch(&ToolCall::new("c1", "boom", "{}")).await;

        assert!(result.is_error);
        assert_eq!(result.content, "tool boom panicked: handler exploded");
    }

    #[tokio::test]
    async fn overwritten_tool_dispatches_to_new_handler() {
        let dispatcher = dispatcher_with_echo();
        dispatcher.registry().register(
            ToolSchema::new("echo", "Shout text", json!({"type": "object"})),
            handler_fn(|args: Value| async move {
                Ok::<_, ToolError>(args["text"].as_str().unwrap_or_default().to_uppercase())
            }),
        );

        let result = dispatcher
            .dispatch(&ToolCall::new("c1", "echo", r#"{"text":"hi"}"#))
            .await;
        assert_eq!(result, ToolResult::success("HI"));
    }

    #[tokio::test]
    async fn dispatch_all_keeps_call_order() {
        let registry = Arc::new(ToolRegistry::new());
        registry.register(
            ToolSchema::new("sleep", "Sleep then echo", json!({})),
            handler_fn(|args: Value| async move {
                let ms = args["ms"].as_u64().unwrap_or(0);
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok::<_, ToolError>(ms.to_string())
            }),
        );
        let dispatcher = Dispatcher::new(registry);

        let calls = [
            ToolCall::new("a", "sleep", r#"{"ms": 60}"#),
            ToolCall::new("b", "nope", "{}"),
            ToolCall::new("c", "sleep", r#"{"ms": 1}"#),
        ];
        let results = dispatcher.dispatch_all(&calls).await;

        assert_eq!(results[0], ToolResult::success("60"));
        assert!(results[1].is_error);
        assert_eq!(results[2], ToolResult::success("1"));
    }

    #[test]
    fn error_results_become_prefixed_tool_messages() {
        let msg = ToolResult::error("tool not found: x").into_message("call_9");
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_9"));
        assert_eq!(msg.content, "Error: tool not found: x");

        let msg = ToolResult::success("ok").into_message("call_9");
        assert_eq!(msg.content, "ok");
    }
}
