//! `OpenAI` chat completion wire format
//!
//! Also spoken by Groq, Ollama, LM Studio, llama.cpp and most hosted
//! "OpenAI-compatible" endpoints, which add a few optional fields of their own.
//! Outbound shapes only serialize and inbound shapes only deserialize.

use serde::{Deserialize, Serialize};

// -- Outbound --

/// Body of `POST {base}/chat/completions`
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiRequest {
    pub model: String,
    pub messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Always false; adapters issue one batched request
    pub stream: bool,
    /// Omitted when no tools are advertised; some local servers reject `[]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<OpenAiTool>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenAiMessage {
    pub role: String,
    /// Null for assistant turns that only call tools
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<OpenAiToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// Advertised tool, always of type `function`
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiTool {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: OpenAiFunction,
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenAiFunction {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema of the arguments object
    pub parameters: serde_json::Value,
}

// -- Shared by both directions --

/// Tool invocation, sent back in history and received in responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiToolCall {
    pub id: String,
    /// Some compatible servers leave this out
    #[serde(rename = "type", default = "function_type")]
    pub tool_type: String,
    pub function: OpenAiFunctionCall,
}

fn function_type() -> String {
    "function".to_owned()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiFunctionCall {
    pub name: String,
    /// Arguments as JSON text, not a JSON object
    #[serde(default)]
    pub arguments: String,
}

// -- Inbound --

/// Batched completion response
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<OpenAiChoice>,
    /// Absent on several local servers
    #[serde(default)]
    pub usage: Option<OpenAiUsage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiChoice {
    #[serde(default)]
    pub index: u32,
    pub message: OpenAiChoiceMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiChoiceMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<OpenAiToolCall>>,
    /// Reasoning as reported by `DeepSeek`, vLLM and llama.cpp
    #[serde(default)]
    pub reasoning_content: Option<String>,
    /// Reasoning as reported by Groq and Ollama
    #[serde(default)]
    pub reasoning: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
    #[serde(default)]
    pub prompt_tokens_details: Option<OpenAiPromptTokensDetails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiPromptTokensDetails {
    /// Prompt tokens served from the provider's cache
    #[serde(default)]
    pub cached_tokens: Option<u32>,
}

/// Error envelope: `{"error": {"message": ..., "type": ..., "code": ...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiErrorResponse {
    pub error: OpenAiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiErrorDetail {
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub code: Option<serde_json::Value>,
}
