//! Conversion between shared types and `OpenAI` wire format

use crate::error::LlmError;
use crate::protocol::openai::{
    OpenAiFunction, OpenAiFunctionCall, OpenAiMessage, OpenAiRequest, OpenAiResponse, OpenAiTool, OpenAiToolCall,
    OpenAiUsage,
};
use crate::types::{CompletionOptions, FinishReason, Message, Role, StreamChunk, ToolCall, ToolDefinition, Usage};

// -- Outbound: shared types -> OpenAI wire request --

/// Build the batched chat completion request
pub fn build_request(messages: &[Message], options: &CompletionOptions) -> OpenAiRequest {
    let tools = options.tools();

    OpenAiRequest {
        model: options.model.clone(),
        messages: messages.iter().map(Into::into).collect(),
        temperature: options.temperature,
        max_tokens: Some(options.max_tokens),
        stream: false,
        tools: (!tools.is_empty()).then(|| tools.iter().map(Into::into).collect()),
    }
}

impl From<&Message> for OpenAiMessage {
    fn from(msg: &Message) -> Self {
        let role = match msg.role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        };

        let tool_calls: Option<Vec<OpenAiToolCall>> = msg.tool_calls.as_ref().filter(|calls| !calls.is_empty()).map(
            |calls| {
                calls
                    .iter()
                    .map(|tc| OpenAiToolCall {
                        id: tc.id.clone(),
                        tool_type: "function".to_owned(),
                        function: OpenAiFunctionCall {
                            name: tc.name.clone(),
                            arguments: tc.arguments.clone(),
                        },
                    })
                    .collect()
            },
        );

        // Assistant turns that only call tools send a null content
        let content = if tool_calls.is_some() && msg.content.is_empty() {
            None
        } else {
            Some(msg.content.clone())
        };

        Self {
            role: role.to_owned(),
            content,
            tool_calls,
            tool_call_id: msg.tool_call_id.clone(),
        }
    }
}

impl From<&ToolDefinition> for OpenAiTool {
    fn from(tool: &ToolDefinition) -> Self {
        Self {
            tool_type: "function".to_owned(),
            function: OpenAiFunction {
                name: tool.name.clone(),
                description: (!tool.description.is_empty()).then(|| tool.description.clone()),
                parameters: tool.schema_or_empty(),
            },
        }
    }
}

// -- Inbound: OpenAI wire response -> chunks --

/// Normalize a batched response into the primary chunk and optional usage chunk
pub fn response_to_chunks(resp: OpenAiResponse) -> Result<Vec<StreamChunk>, LlmError> {
    let usage = resp.usage.as_ref().map(Usage::from);
    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::Upstream("response contained no choices".to_owned()))?;

    let message = choice.message;
    let tool_calls = message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|tc| ToolCall {
            id: tc.id,
            name: tc.function.name,
            arguments: tc.function.arguments,
        })
        .collect();

    Ok(super::into_chunks(
        message.content,
        tool_calls,
        message.reasoning_content.or(message.reasoning),
        choice.finish_reason.as_deref().and_then(parse_finish_reason),
        usage,
    ))
}

/// Map an `OpenAI` finish reason string to the shared enum
fn parse_finish_reason(s: &str) -> Option<FinishReason> {
    match s {
        "stop" => Some(FinishReason::Stop),
        "length" => Some(FinishReason::Length),
        "tool_calls" | "function_call" => Some(FinishReason::ToolCalls),
        _ => None,
    }
}

impl From<&OpenAiUsage> for Usage {
    fn from(usage: &OpenAiUsage) -> Self {
        Self {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
            cached_tokens: usage.prompt_tokens_details.as_ref().and_then(|d| d.cached_tokens),
        }
    }
}
