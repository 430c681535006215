//! Anthropic Messages API wire format

use serde::{Deserialize, Serialize};

/// Sent as the `anthropic-version` header on every request
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

// -- Outbound --

/// Body of `POST {base}/messages`
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicRequest {
    pub model: String,
    /// Required by the API, unlike `OpenAI`
    pub max_tokens: u32,
    /// System prompt lives here, never inside `messages`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Strictly alternating user/assistant turns
    pub messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<AnthropicTool>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnthropicMessage {
    /// `user` or `assistant`
    pub role: String,
    pub content: Vec<AnthropicContentBlock>,
}

/// Block inside an outbound turn
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicContentBlock {
    Text {
        text: String,
    },
    /// Earlier tool request by the assistant, replayed as history
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    /// Tool output, always carried in a user turn
    ToolResult {
        tool_use_id: String,
        content: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct AnthropicTool {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input_schema: serde_json::Value,
}

// -- Inbound --

#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub content: Vec<AnthropicResponseBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<AnthropicUsage>,
}

/// Block inside a response
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicResponseBlock {
    Text {
        text: String,
    },
    /// Extended thinking output
    Thinking {
        thinking: String,
        #[serde(default)]
        signature: Option<String>,
    },
    /// Encrypted thinking, never surfaced
    RedactedThinking {
        data: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    /// Server-side tool blocks and anything newer
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicUsage {
    /// Uncached input only
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
    #[serde(default)]
    pub cache_read_input_tokens: Option<u32>,
    #[serde(default)]
    pub cache_creation_input_tokens: Option<u32>,
}

/// Error envelope: `{"type": "error", "error": {"type": ..., "message": ...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicErrorResponse {
    pub error: AnthropicErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicErrorDetail {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}
