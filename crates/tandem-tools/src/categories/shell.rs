//! Shell command execution

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::process::Command;

use super::{optional_u64, required_str};
use crate::error::ToolError;
use crate::handler::{ToolHandler, ToolOutput};
use crate::registry::ToolRegistry;
use crate::schema::ToolSchema;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_TIMEOUT_SECS: u64 = 300;

/// Register `run_command`
pub fn register_shell_tools(registry: &ToolRegistry) {
    registry.register(
        ToolSchema::new(
            "run_command",
            "Run a shell command and return its combined output. Non-zero exit codes are reported as errors.",
            json!({
                "type": "object",
                "properties": {
                    "command": {"type": "string", "description": "Command line passed to the system shell"},
                    "timeout_secs": {"type": "integer", "description": "Timeout in seconds (default 30, max 300)"}
                },
                "required": ["command"]
            }),
        )
        .unsafe_tool(),
        RunCommand,
    );
}

fn shell(command: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }
}

struct RunCommand;

#[async_trait]
impl ToolHandler for RunCommand {
    async fn call(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let command = required_str(&args, "command")?;
        let timeout_secs = optional_u64(&args, "timeout_secs")?
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(1, MAX_TIMEOUT_SECS);

        tracing::debug!(command, timeout_secs, "running command");

        let child = shell(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ToolError::new(format!("failed to spawn shell: {e}")))?;

        let output = tokio::time::timeout(Duration::from_secs(timeout_secs), child.wait_with_output())
            .await
            .map_err(|_| {
                tracing::warn!(command, timeout_secs, "command timed out");
                ToolError::new(format!("command timed out after {timeout_secs}s"))
            })?
            .map_err(|e| ToolError::new(format!("command execution error: {e}")))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let combined = match (stdout.is_empty(), stderr.is_empty()) {
            (_, true) => stdout.into_owned(),
            (true, false) => stderr.into_owned(),
            (false, false) => format!("{stdout}\n--- stderr ---\n{stderr}"),
        };

        if output.status.success() {
            return Ok(combined.into());
        }

        let code = output
            .status
            .code()
            .map_or_else(|| "signal".to_owned(), |c| c.to_string());
        tracing::debug!(command, exit_code = %code, "command failed");
        Err(ToolError::new(format!("exit code {code}\n{combined}").trim_end().to_owned()))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout() {
        let out = RunCommand.call(json!({"command": "echo hello"})).await.unwrap();
        assert_eq!(out.content.trim(), "hello");
    }

    #[tokio::test]
    async fn non_zero_exit_is_an_error() {
        let err = RunCommand
            .call(json!({"command": "echo oops >&2; exit 3"}))
            .await
            .unwrap_err();
        assert_eq!(err.message, "exit code 3\noops");
    }

    #[tokio::test]
    async fn times_out() {
        let err = RunCommand
            .call(json!({"command": "sleep 5", "timeout_secs": 1}))
            .await
            .unwrap_err();
        assert_eq!(err.message, "command timed out after 1s");
    }

    #[tokio::test]
    async fn requires_command() {
        let err = RunCommand.call(json!({"command": 7})).await.unwrap_err();
        assert_eq!(err.message, "'command' must be a string");
    }
}
