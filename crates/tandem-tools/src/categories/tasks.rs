//! Task list tools the model uses to plan multi-step work

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use strum::{Display, EnumString};
use tokio::sync::Mutex;

use crate::error::ToolError;
use crate::handler::handler_fn;
use crate::registry::ToolRegistry;
use crate::schema::ToolSchema;

/// Progress of a task list entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TodoStatus {
    Pending,
    InProgress,
    Completed,
}

impl TodoStatus {
    const fn marker(self) -> &'static str {
        match self {
            Self::Pending => "[ ]",
            Self::InProgress => "[~]",
            Self::Completed => "[x]",
        }
    }
}

/// One entry of the task list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub content: String,
    pub status: TodoStatus,
}

#[derive(Deserialize)]
struct TodoWriteArgs {
    todos: Vec<TodoItem>,
}

/// Render the list the way both tools report it
fn render(todos: &[TodoItem]) -> String {
    if todos.is_empty() {
        return "no tasks".to_owned();
    }

    let done = todos.iter().filter(|t| t.status == TodoStatus::Completed).count();
    let lines = todos
        .iter()
        .map(|todo| format!("{} {}", todo.status.marker(), todo.content));
    std::iter::once(format!("{done}/{} completed", todos.len()))
        .chain(lines)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Register `todo_write` and `todo_read` over one shared list
pub fn register_task_tools(registry: &ToolRegistry) {
    let todos: Arc<Mutex<Vec<TodoItem>>> = Arc::default();

    let list = Arc::clone(&todos);
    registry.register(
        ToolSchema::new(
            "todo_write",
            "Replace the task list. Use it to plan multi-step work and to mark progress.",
            json!({
                "type": "object",
                "properties": {
                    "todos": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "content": {"type": "string"},
                                "status": {"type": "string", "enum": ["pending", "in_progress", "completed"]}
                            },
                            "required": ["content", "status"]
                        }
                    }
                },
                "required": ["todos"]
            }),
        ),
        handler_fn(move |args: Value| {
            let list = Arc::clone(&list);
            async move {
                let TodoWriteArgs { todos } =
                    serde_json::from_value(args).map_err(|e| ToolError::new(format!("invalid todos: {e}")))?;

                if let Some(empty) = todos.iter().position(|t| t.content.trim().is_empty()) {
                    return Err(ToolError::new(format!("todo {} has empty content", empty + 1)));
                }

                let mut guard = list.lock().await;
                *guard = todos;
                tracing::debug!(tasks = guard.len(), "task list updated");
                Ok(render(&guard))
            }
        }),
    );

    registry.register(
        ToolSchema::new(
            "todo_read",
            "Show the current task list.",
            json!({"type": "object", "properties": {}}),
        ),
        handler_fn(move |_args: Value| {
            let list = Arc::clone(&todos);
            async move { Ok::<_, ToolError>(render(&list.lock().await)) }
        }),
    );
}
