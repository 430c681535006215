//! Tool registry and dispatch for tandem
//!
//! Tools are registered once per category into an explicit [`ToolRegistry`]
//! and invoked through a [`Dispatcher`], which turns every failure into an
//! error-flagged [`ToolResult`] instead of propagating it.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod categories;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod registry;
pub mod schema;

pub use categories::{ToolCategory, register_builtin_tools, register_categories};
pub use dispatch::{Dispatcher, ToolResult};
pub use error::{RegistryError, ToolError};
pub use handler::{FnHandler, ToolHandler, ToolOutput, handler_fn};
pub use registry::{RegisteredTool, Registration, ToolRegistry};
pub use schema::{Permission, ToolSchema};
