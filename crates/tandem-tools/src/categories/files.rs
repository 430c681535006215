//! File tools: read, write and list

use std::path::Path;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{optional_u64, required_str};
use crate::error::ToolError;
use crate::handler::{ToolHandler, ToolOutput};
use crate::registry::ToolRegistry;
use crate::schema::ToolSchema;

/// Lines returned when the caller gives no limit
const DEFAULT_READ_LIMIT: usize = 2000;

/// Register `read_file`, `write_file` and `list_directory`
pub fn register_file_tools(registry: &ToolRegistry) {
    registry.register(
        ToolSchema::new(
            "read_file",
            "Read a text file. Lines are numbered starting at 1.",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "File to read"},
                    "offset": {"type": "integer", "description": "First line to return (1-based, default 1)"},
                    "limit": {"type": "integer", "description": "Maximum number of lines (default 2000)"}
                },
                "required": ["path"]
            }),
        ),
        ReadFile,
    );

    registry.register(
        ToolSchema::new(
            "write_file",
            "Write content to a file, creating parent directories and replacing any existing file.",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "File to write"},
                    "content": {"type": "string", "description": "Full file content"}
                },
                "required": ["path", "content"]
            }),
        )
        .unsafe_tool(),
        WriteFile,
    );

    registry.register(
        ToolSchema::new(
            "list_directory",
            "List the entries of a directory. Directories end with '/'.",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "Directory to list"}
                },
                "required": ["path"]
            }),
        ),
        ListDirectory,
    );
}

fn is_binary(bytes: &[u8]) -> bool {
    bytes[..bytes.len().min(8192)].contains(&0)
}

struct ReadFile;

#[async_trait]
impl ToolHandler for ReadFile {
    async fn call(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let path = required_str(&args, "path")?;
        let offset = optional_u64(&args, "offset")?
            .map_or(1, |v| usize::try_from(v).unwrap_or(usize::MAX))
            .max(1);
        let limit = optional_u64(&args, "limit")?.map_or(DEFAULT_READ_LIMIT, |v| {
            usize::try_from(v).unwrap_or(usize::MAX)
        });

        tracing::debug!(path, offset, limit, "reading file");

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ToolError::new(format!("failed to read '{path}': {e}")))?;

        if is_binary(&bytes) {
            return Ok(ToolOutput::new(format!("binary file, {} bytes", bytes.len())));
        }

        let text = String::from_utf8_lossy(&bytes);
        let numbered: Vec<String> = text
            .lines()
            .enumerate()
            .skip(offset - 1)
            .take(limit)
            .map(|(i, line)| format!("{:>6}\t{line}", i + 1))
            .collect();

        Ok(numbered.join("\n").into())
    }
}

struct WriteFile;

#[async_trait]
impl ToolHandler for WriteFile {
    async fn call(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let path = required_str(&args, "path")?;
        let content = required_str(&args, "content")?;

        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(path, content)
            .await
            .map_err(|e| ToolError::new(format!("failed to write '{path}': {e}")))?;

        tracing::debug!(path, bytes = content.len(), "wrote file");
        Ok(format!("wrote {} bytes to {path}", content.len()).into())
    }
}

struct ListDirectory;

#[async_trait]
impl ToolHandler for ListDirectory {
    async fn call(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let path = required_str(&args, "path")?;

        let mut dir = tokio::fs::read_dir(path)
            .await
            .map_err(|e| ToolError::new(format!("failed to list '{path}': {e}")))?;

        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let mut name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type().await?.is_dir() {
                name.push('/');
            }
            entries.push(name);
        }
        entries.sort();

        if entries.is_empty() {
            return Ok("(empty directory)".into());
        }
        Ok(entries.join("\n").into())
    }
}
