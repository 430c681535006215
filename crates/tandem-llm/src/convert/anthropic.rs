//! Conversion between shared types and Anthropic Messages API format

use crate::protocol::anthropic::{
    AnthropicContentBlock, AnthropicMessage, AnthropicRequest, AnthropicResponse, AnthropicResponseBlock,
    AnthropicTool, AnthropicUsage,
};
use crate::types::{CompletionOptions, FinishReason, Message, Role, StreamChunk, ToolCall, ToolDefinition, Usage};

// -- Outbound: shared types -> Anthropic wire request --

/// Build the batched messages request
///
/// System messages move to the top-level `system` field and consecutive
/// turns with the same role are merged, since the API requires strict
/// user/assistant alternation.
pub fn build_request(messages: &[Message], options: &CompletionOptions) -> AnthropicRequest {
    let mut system_parts = Vec::new();
    let mut turns: Vec<AnthropicMessage> = Vec::new();

    for msg in messages {
        if msg.role == Role::System {
            system_parts.push(msg.content.as_str());
            continue;
        }

        let Some(turn) = message_to_anthropic(msg) else {
            continue;
        };
        match turns.last_mut() {
            Some(last) if last.role == turn.role => last.content.extend(turn.content),
            _ => turns.push(turn),
        }
    }

    let tools = options.tools();

    AnthropicRequest {
        model: options.model.clone(),
        max_tokens: options.max_tokens,
        system: (!system_parts.is_empty()).then(|| system_parts.join("\n\n")),
        messages: turns,
        temperature: options.temperature,
        tools: (!tools.is_empty()).then(|| tools.iter().map(Into::into).collect()),
    }
}

/// Convert a non-system message to an Anthropic turn
///
/// The API rejects blank text blocks, so they are left out and a turn with
/// nothing left is dropped.
fn message_to_anthropic(msg: &Message) -> Option<AnthropicMessage> {
    let (role, content) = match msg.role {
        Role::Tool => (
            "user",
            vec![AnthropicContentBlock::ToolResult {
                tool_use_id: msg.tool_call_id.clone().unwrap_or_default(),
                content: msg.content.clone(),
            }],
        ),
        Role::Assistant => {
            let mut blocks: Vec<_> = text_block(&msg.content).into_iter().collect();
            blocks.extend(msg.tool_calls().iter().map(|tc| AnthropicContentBlock::ToolUse {
                id: tc.id.clone(),
                name: tc.name.clone(),
                input: parse_tool_input(&tc.arguments),
            }));
            ("assistant", blocks)
        }
        Role::User | Role::System => ("user", text_block(&msg.content).into_iter().collect()),
    };

    (!content.is_empty()).then(|| AnthropicMessage {
        role: role.to_owned(),
        content,
    })
}

fn text_block(text: &str) -> Option<AnthropicContentBlock> {
    (!text.trim().is_empty()).then(|| AnthropicContentBlock::Text { text: text.to_owned() })
}

/// Decode tool arguments for a `tool_use` block, falling back to `{}`
fn parse_tool_input(arguments: &str) -> serde_json::Value {
    serde_json::from_str(arguments).unwrap_or_else(|_| serde_json::json!({}))
}

impl From<&ToolDefinition> for AnthropicTool {
    fn from(tool: &ToolDefinition) -> Self {
        Self {
            name: tool.name.clone(),
            description: (!tool.description.is_empty()).then(|| tool.description.clone()),
            input_schema: tool.schema_or_empty(),
        }
    }
}

// -- Inbound: Anthropic wire response -> chunks --

/// Normalize a batched response into the primary chunk and optional usage chunk
pub fn response_to_chunks(resp: AnthropicResponse) -> Vec<StreamChunk> {
    let mut text = String::new();
    let mut reasoning = String::new();
    let mut tool_calls = Vec::new();

    for block in resp.content {
        match block {
            AnthropicResponseBlock::Text { text: part } => text.push_str(&part),
            AnthropicResponseBlock::Thinking { thinking, .. } => reasoning.push_str(&thinking),
            AnthropicResponseBlock::ToolUse { id, name, input } => tool_calls.push(ToolCall {
                id,
                name,
                arguments: input.to_string(),
            }),
            AnthropicResponseBlock::RedactedThinking { .. } | AnthropicResponseBlock::Unknown => {}
        }
    }

    super::into_chunks(
        Some(text),
        tool_calls,
        Some(reasoning),
        resp.stop_reason.as_deref().and_then(parse_stop_reason),
        resp.usage.as_ref().map(Usage::from),
    )
}

/// Map an Anthropic stop reason to the shared enum
fn parse_stop_reason(s: &str) -> Option<FinishReason> {
    match s {
        "end_turn" | "stop_sequence" => Some(FinishReason::Stop),
        "max_tokens" => Some(FinishReason::Length),
        "tool_use" => Some(FinishReason::ToolCalls),
        _ => None,
    }
}

impl From<&AnthropicUsage> for Usage {
    fn from(usage: &AnthropicUsage) -> Self {
        Self {
            prompt_tokens: usage.input_tokens,
            completion_tokens: usage.output_tokens,
            total_tokens: usage.input_tokens.saturating_add(usage.output_tokens),
            cached_tokens: usage.cache_read_input_tokens,
        }
    }
}
