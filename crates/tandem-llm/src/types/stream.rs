use serde::{Deserialize, Serialize};

use super::message::ToolCall;

/// Why a chunk ends the model's output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural end of generation
    Stop,
    /// Model requested one or more tools
    ToolCalls,
    /// Hit the token limit
    Length,
    /// Synthetic token-accounting chunk, never assistant text
    Usage,
    /// Generation failed on the backend
    Error,
}

/// Token accounting reported by a backend
///
/// Exactly these fields are copied; anything else the backend reports is
/// dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens consumed by the prompt
    pub prompt_tokens: u32,
    /// Tokens generated in the completion
    pub completion_tokens: u32,
    /// Prompt plus completion
    pub total_tokens: u32,
    /// Prompt tokens served from the backend's cache
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_tokens: Option<u32>,
}

/// One unit of an adapter's normalized output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Assistant text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Tools the model asked to invoke
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// Backend-specific reasoning text, not part of the answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    /// Set on the last chunk of a response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
    /// Token accounting; only present on the `usage` chunk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl StreamChunk {
    /// Build the synthetic accounting chunk that trails a response
    pub const fn usage(usage: Usage) -> Self {
        Self {
            content: None,
            tool_calls: None,
            reasoning: None,
            finish_reason: Some(FinishReason::Usage),
            usage: Some(usage),
        }
    }

    /// Whether this is the out-of-band accounting chunk
    pub fn is_usage(&self) -> bool {
        self.finish_reason == Some(FinishReason::Usage)
    }

    /// Assistant text, never taken from an accounting chunk
    pub fn text(&self) -> Option<&str> {
        if self.is_usage() {
            return None;
        }
        self.content.as_deref()
    }
}
