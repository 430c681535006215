//! Anthropic Messages API provider implementation

use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};

use super::{ChunkStream, Provider, ProviderKind, ProviderSettings, Transport};
use crate::convert::anthropic::{build_request, response_to_chunks};
use crate::error::LlmError;
use crate::protocol::anthropic::{ANTHROPIC_VERSION, AnthropicErrorResponse, AnthropicResponse};
use crate::types::message::validate_messages;
use crate::types::{CompletionOptions, Message};

/// Default Anthropic API base URL
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

/// Anthropic provider
pub struct AnthropicProvider {
    transport: Transport,
}

impl AnthropicProvider {
    /// Create the adapter; a missing key leaves it not ready
    ///
    /// # Errors
    ///
    /// Returns `LlmError::InvalidRequest` if the proxy URL is rejected.
    pub fn new(name: &str, settings: ProviderSettings) -> Result<Self, LlmError> {
        Ok(Self {
            transport: Transport::new(name, DEFAULT_BASE_URL, settings)?,
        })
    }

    fn prepare(&self, messages: &[Message], options: &CompletionOptions) -> Result<RequestBuilder, LlmError> {
        validate_messages(messages)?;
        let state = self.transport.current()?;
        let body = build_request(messages, options);

        tracing::debug!(
            provider = %self.transport.name(),
            model = %options.model,
            messages = body.messages.len(),
            tools = options.tools().len(),
            "sending messages request"
        );

        Ok(state
            .client
            .post(self.transport.endpoint("messages"))
            .header("x-api-key", state.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body))
    }
}

fn describe_error(body: &str) -> Option<String> {
    serde_json::from_str::<AnthropicErrorResponse>(body)
        .ok()
        .map(|e| format!("{}: {}", e.error.error_type, e.error.message))
}

impl Provider for AnthropicProvider {
    fn name(&self) -> &str {
        self.transport.name()
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn is_ready(&self) -> bool {
        self.transport.is_ready()
    }

    fn update_api_key(&self, api_key: SecretString) -> Result<(), LlmError> {
        self.transport.install(api_key)
    }

    fn stream(&self, messages: &[Message], options: &CompletionOptions) -> ChunkStream {
        let prepared = self.prepare(messages, options);
        let provider = self.transport.name().to_owned();

        super::into_chunk_stream(options.signal.clone(), async move {
            let response: AnthropicResponse = super::send_json(&provider, prepared?, describe_error).await?;
            Ok(response_to_chunks(response))
        })
    }
}
