//! Single-turn runner
//!
//! Drives the model until it answers without requesting tools. This is the
//! one place where permission tiers are enforced: the registry only
//! classifies and the dispatcher never checks.

use std::sync::Arc;

use anyhow::{Context, bail};
use futures_util::StreamExt;
use tandem_llm::{CompletionOptions, Message, Provider, ToolCall, Usage};
use tandem_tools::{Dispatcher, Permission, ToolRegistry, ToolResult};
use tokio_util::sync::CancellationToken;

const SYSTEM_PROMPT: &str = "You are a coding assistant working in the user's current directory. \
Use the available tools to inspect and change files, then answer concisely.";

/// Final answer of a turn plus accumulated accounting
#[derive(Debug, Default)]
pub struct TurnOutcome {
    pub answer: String,
    pub rounds: usize,
    pub tool_calls: usize,
    pub usage: Usage,
}

pub struct TurnRunner {
    provider: Arc<dyn Provider>,
    dispatcher: Dispatcher,
    allow_unsafe: bool,
    max_rounds: usize,
}

impl TurnRunner {
    pub fn new(
        provider: Arc<dyn Provider>,
        registry: Arc<ToolRegistry>,
        allow_unsafe: bool,
        max_rounds: usize,
    ) -> Self {
        Self {
            provider,
            dispatcher: Dispatcher::new(registry),
            allow_unsafe,
            max_rounds: max_rounds.max(1),
        }
    }

    pub async fn run(&self, prompt: &str, model: &str, signal: CancellationToken) -> anyhow::Result<TurnOutcome> {
        let options = CompletionOptions::new(model)
            .with_tools(self.dispatcher.registry().definitions())
            .with_signal(signal);
        let mut messages = vec![Message::system(SYSTEM_PROMPT), Message::user(prompt)];
        let mut outcome = TurnOutcome::default();

        while outcome.rounds < self.max_rounds {
            outcome.rounds += 1;

            let mut stream = self.provider.stream(&messages, &options);
            let mut answer = String::new();
            let mut calls: Vec<ToolCall> = Vec::new();

            while let Some(chunk) = stream.next().await {
                let chunk = chunk.with_context(|| format!("provider '{}' failed", self.provider.name()))?;

                if let Some(usage) = chunk.usage {
                    add_usage(&mut outcome.usage, usage);
                }
                if let Some(reasoning) = &chunk.reasoning {
                    tracing::debug!(%reasoning, "model reasoning");
                }
                if let Some(text) = chunk.text() {
                    answer.push_str(text);
                }
                if let Some(tool_calls) = chunk.tool_calls {
                    calls.extend(tool_calls);
                }
            }

            if calls.is_empty() {
                outcome.answer = answer;
                return Ok(outcome);
            }

            tracing::info!(round = outcome.rounds, calls = calls.len(), "model requested tools");
            outcome.tool_calls += calls.len();

            let results = self.run_tools(&calls).await;
            messages.push(Message::assistant_with_tool_calls(answer, calls.clone()));
            messages.extend(
                calls
                    .iter()
                    .zip(results)
                    .map(|(call, result)| result.into_message(call.id.clone())),
            );
        }

        bail!("no final answer after {} rounds", self.max_rounds)
    }

    /// Gate each call on its permission tier, then dispatch the allowed ones
    /// concurrently. Results come back in call order.
    async fn run_tools(&self, calls: &[ToolCall]) -> Vec<ToolResult> {
        let mut results: Vec<Option<ToolResult>> = calls
            .iter()
            .map(|call| check_permission(self.dispatcher.registry(), call, self.allow_unsafe))
            .collect();

        let allowed: Vec<ToolCall> = calls
            .iter()
            .zip(&results)
            .filter(|(_, refused)| refused.is_none())
            .map(|(call, _)| call.clone())
            .collect();

        let mut dispatched = self.dispatcher.dispatch_all(&allowed).await.into_iter();
        for slot in &mut results {
            if slot.is_none() {
                *slot = dispatched.next();
            }
        }

        results
            .into_iter()
            .map(|result| result.unwrap_or_else(|| ToolResult::error("tool call was not executed")))
            .collect()
    }
}

/// Refuse `unsafe` tools unless the user opted in
///
/// Unknown tools pass through so the dispatcher reports them.
pub fn check_permission(registry: &ToolRegistry, call: &ToolCall, allow_unsafe: bool) -> Option<ToolResult> {
    match registry.permission(&call.name) {
        Ok(Permission::Unsafe) if !allow_unsafe => {
            tracing::warn!(tool = %call.name, call_id = %call.id, "unsafe tool refused");
            Some(ToolResult::error(format!(
                "{} requires confirmation; rerun with --allow-unsafe to permit it",
                call.name
            )))
        }
        _ => None,
    }
}

fn add_usage(total: &mut Usage, usage: Usage) {
    total.prompt_tokens = total.prompt_tokens.saturating_add(usage.prompt_tokens);
    total.completion_tokens = total.completion_tokens.saturating_add(usage.completion_tokens);
    total.total_tokens = total.total_tokens.saturating_add(usage.total_tokens);
    total.cached_tokens = match (total.cached_tokens, usage.cached_tokens) {
        (None, None) => None,
        (a, b) => Some(a.unwrap_or(0).saturating_add(b.unwrap_or(0))),
    };
}
