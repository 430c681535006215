//! Provider streaming abstraction for tandem
//!
//! Every backend speaks its own wire format. Adapters in [`provider`] turn a
//! single batched response into the shared [`StreamChunk`] sequence so the
//! agent loop never sees backend-specific shapes.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod convert;
pub mod error;
pub mod protocol;
pub mod provider;
pub mod registry;
pub mod types;

pub use error::LlmError;
pub use provider::{ChunkStream, Provider, ProviderKind, ProviderSettings};
pub use registry::ProviderRegistry;
pub use types::{
    CompletionOptions, FinishReason, Message, Role, StreamChunk, ToolCall, ToolDefinition, Usage,
};
