//! Normalization between shared types and backend wire formats
//!
//! Each submodule builds the outbound request for one protocol and turns its
//! batched response into the primary chunk plus an optional usage chunk.

pub mod anthropic;
pub mod openai;

use crate::types::{FinishReason, StreamChunk, ToolCall, Usage};

/// Resolve the primary chunk's finish reason
///
/// A reason the backend did not report, or one with no shared equivalent,
/// is inferred from whether the model asked for tools.
pub(crate) fn resolve_finish_reason(mapped: Option<FinishReason>, has_tool_calls: bool) -> FinishReason {
    mapped.unwrap_or(if has_tool_calls {
        FinishReason::ToolCalls
    } else {
        FinishReason::Stop
    })
}

/// Assemble the chunk sequence for one response
pub(crate) fn into_chunks(
    content: Option<String>,
    tool_calls: Vec<ToolCall>,
    reasoning: Option<String>,
    finish_reason: Option<FinishReason>,
    usage: Option<Usage>,
) -> Vec<StreamChunk> {
    let has_tool_calls = !tool_calls.is_empty();
    let primary = StreamChunk {
        content: content.filter(|text| !(has_tool_calls && text.is_empty())),
        tool_calls: has_tool_calls.then_some(tool_calls),
        reasoning: reasoning.filter(|text| !text.is_empty()),
        finish_reason: Some(resolve_finish_reason(finish_reason, has_tool_calls)),
        usage: None,
    };

    let mut chunks = vec![primary];
    chunks.extend(usage.map(StreamChunk::usage));
    chunks
}
