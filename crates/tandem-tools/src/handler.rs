//! Tool handler trait and closure adapter

use std::fmt;
use std::future::Future;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ToolError;

/// Text returned to the model by a successful tool call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub content: String,
}

impl ToolOutput {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Pretty-printed JSON output
    pub fn json(value: &Value) -> Self {
        Self::new(serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()))
    }
}

impl From<String> for ToolOutput {
    fn from(content: String) -> Self {
        Self { content }
    }
}

impl From<&str> for ToolOutput {
    fn from(content: &str) -> Self {
        Self::new(content)
    }
}

/// Executes one tool
///
/// Handlers receive the decoded arguments object and validate it themselves;
/// the dispatcher performs no schema checks.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, args: Value) -> Result<ToolOutput, ToolError>;
}

/// Handler backed by an async closure, created by [`handler_fn`]
pub struct FnHandler<F> {
    f: F,
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut, O> ToolHandler for FnHandler<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<O, ToolError>> + Send + 'static,
    O: Into<ToolOutput> + Send + 'static,
{
    async fn call(&self, args: Value) -> Result<ToolOutput, ToolError> {
        (self.f)(args).await.map(Into::into)
    }
}

/// Wrap an async closure as a [`ToolHandler`]
///
/// ```
/// use tandem_tools::{ToolError, handler_fn};
///
/// let echo = handler_fn(|args: serde_json::Value| async move {
///     args["text"]
///         .as_str()
///         .map(str::to_owned)
///         .ok_or_else(|| ToolError::invalid_argument("text", "a string"))
/// });
/// # let _ = echo;
/// ```
pub const fn handler_fn<F, Fut, O>(f: F) -> FnHandler<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<O, ToolError>> + Send + 'static,
    O: Into<ToolOutput> + Send + 'static,
{
    FnHandler { f }
}
