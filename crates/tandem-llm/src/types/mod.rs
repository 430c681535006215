//! Provider-agnostic conversation and stream types
//!
//! Wire formats in [`crate::protocol`] convert to and from these; nothing
//! outside an adapter sees a backend-specific shape.

pub mod message;
pub mod request;
pub mod stream;
pub mod tool;

pub use message::{Message, Role, ToolCall};
pub use request::{CompletionOptions, DEFAULT_MAX_TOKENS};
pub use stream::{FinishReason, StreamChunk, Usage};
pub use tool::ToolDefinition;
