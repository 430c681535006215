//! Search tools: glob matching and regex content search

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use regex::Regex;
use serde_json::{Value, json};

use super::{optional_str, optional_u64, required_str};
use crate::error::ToolError;
use crate::handler::{ToolHandler, ToolOutput};
use crate::registry::ToolRegistry;
use crate::schema::ToolSchema;

/// Upper bound on paths returned by `glob_files`
const MAX_GLOB_RESULTS: usize = 500;
/// Matches returned by `search_files` when the caller gives no limit
const DEFAULT_SEARCH_RESULTS: usize = 100;
/// Files larger than this are skipped by `search_files`
const MAX_SEARCH_FILE_BYTES: u64 = 1024 * 1024;

/// Directories never descended into
const SKIPPED_DIRS: &[&str] = &["target", "node_modules"];

/// Register `glob_files` and `search_files`
pub fn register_search_tools(registry: &ToolRegistry) {
    registry.register(
        ToolSchema::new(
            "glob_files",
            "Find files whose path relative to the search root matches a glob such as 'src/**/*.rs'.",
            json!({
                "type": "object",
                "properties": {
                    "pattern": {"type": "string", "description": "Glob pattern"},
                    "path": {"type": "string", "description": "Search root (default '.')"}
                },
                "required": ["pattern"]
            }),
        ),
        GlobFiles,
    );

    registry.register(
        ToolSchema::new(
            "search_files",
            "Search file contents with a regular expression. Returns 'path:line: text' matches.",
            json!({
                "type": "object",
                "properties": {
                    "pattern": {"type": "string", "description": "Regular expression"},
                    "path": {"type": "string", "description": "Search root (default '.')"},
                    "max_results": {"type": "integer", "description": "Maximum matches (default 100)"}
                },
                "required": ["pattern"]
            }),
        ),
        SearchFiles,
    );
}

/// Collect regular files under `root`, skipping hidden and build directories
fn walk_files(root: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries: Vec<_> = std::fs::read_dir(&dir)?.collect::<Result<_, _>>()?;
        entries.sort_by_key(std::fs::DirEntry::file_name);

        for entry in entries {
            let path = entry.path();
            let file_type = entry.file_type()?;
            let name = entry.file_name();
            let name = name.to_string_lossy();

            if file_type.is_dir() {
                if !name.starts_with('.') && !SKIPPED_DIRS.iter().any(|skip| *skip == name) {
                    pending.push(path);
                }
            } else if file_type.is_file() {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Path relative to the search root with forward slashes
fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Run blocking filesystem work off the async runtime
async fn blocking<T, F>(work: F) -> Result<T, ToolError>
where
    F: FnOnce() -> Result<T, ToolError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ToolError::new(format!("search task failed: {e}")))?
}

struct GlobFiles;

#[async_trait]
impl ToolHandler for GlobFiles {
    async fn call(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let pattern = required_str(&args, "pattern")?.to_owned();
        let root = PathBuf::from(optional_str(&args, "path")?.unwrap_or("."));

        tracing::debug!(%pattern, root = %root.display(), "globbing files");

        let matches = blocking(move || {
            let files = walk_files(&root)
                .map_err(|e| ToolError::new(format!("failed to walk '{}': {e}", root.display())))?;
            Ok(files
                .iter()
                .map(|path| relative(&root, path))
                .filter(|rel| fast_glob::glob_match(&pattern, rel))
                .take(MAX_GLOB_RESULTS)
                .collect::<Vec<_>>())
        })
        .await?;

        if matches.is_empty() {
            return Ok("no files matched".into());
        }
        Ok(matches.join("\n").into())
    }
}

struct SearchFiles;

#[async_trait]
impl ToolHandler for SearchFiles {
    async fn call(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let pattern = required_str(&args, "pattern")?;
        let regex = Regex::new(pattern).map_err(|e| ToolError::new(format!("invalid regex: {e}")))?;
        let root = PathBuf::from(optional_str(&args, "path")?.unwrap_or("."));
        let max_results = optional_u64(&args, "max_results")?
            .map_or(DEFAULT_SEARCH_RESULTS, |v| usize::try_from(v).unwrap_or(usize::MAX));

        tracing::debug!(pattern, root = %root.display(), max_results, "searching files");

        let matches = blocking(move || {
            let files = walk_files(&root)
                .map_err(|e| ToolError::new(format!("failed to walk '{}': {e}", root.display())))?;
            let mut matches = Vec::new();

            'files: for path in files {
                let too_large = std::fs::metadata(&path).is_ok_and(|m| m.len() > MAX_SEARCH_FILE_BYTES);
                if too_large {
                    continue;
                }
                // Non-UTF-8 files are skipped
                let Ok(text) = std::fs::read_to_string(&path) else {
                    continue;
                };

                for (index, line) in text.lines().enumerate() {
                    if matches.len() >= max_results {
                        break 'files;
                    }
                    if regex.is_match(line) {
                        matches.push(format!("{}:{}: {}", relative(&root, &path), index + 1, line.trim_end()));
                    }
                }
            }

            Ok(matches)
        })
        .await?;

        if matches.is_empty() {
            return Ok("no matches".into());
        }
        Ok(matches.join("\n").into())
    }
}
