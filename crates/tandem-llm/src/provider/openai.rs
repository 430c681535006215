//! OpenAI-compatible provider implementation

use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};

use super::{ChunkStream, Provider, ProviderKind, ProviderSettings, Transport};
use crate::convert::openai::{build_request, response_to_chunks};
use crate::error::LlmError;
use crate::protocol::openai::{OpenAiErrorResponse, OpenAiResponse};
use crate::types::message::validate_messages;
use crate::types::{CompletionOptions, Message};

/// Default `OpenAI` API base URL
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI-compatible provider
///
/// Pointing `base_url` elsewhere targets Groq, Ollama, LM Studio, llama.cpp
/// or any other server that speaks chat completions.
pub struct OpenAiProvider {
    transport: Transport,
}

impl OpenAiProvider {
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
            messages = messages.len(),
            tools = options.tools().len(),
            "sending chat completion"
        );

        Ok(state
            .client
            .post(self.transport.endpoint("chat/completions"))
            .bearer_auth(state.api_key.expose_secret())
            .json(&body))
    }
}

fn describe_error(body: &str) -> Option<String> {
    serde_json::from_str::<OpenAiErrorResponse>(body)
        .ok()
        .map(|e| e.error.message)
}

impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        self.transport.name()
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
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
            let response: OpenAiResponse = super::send_json(&provider, prepared?, describe_error).await?;
            response_to_chunks(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;

    use super::*;

    #[tokio::test]
    async fn not_ready_adapter_fails_before_any_request() {
        let provider = OpenAiProvider::new("Local", ProviderSettings::default()).unwrap();
        assert_eq!(provider.name(), "local");
        assert!(!provider.is_ready());

        let items: Vec<_> = provider
            .stream(&[Message::user("hi")], &CompletionOptions::new("llama3"))
            .collect()
            .await;

        assert_eq!(items.len(), 1);
        assert!(matches!(&items[0], Err(LlmError::NotConfigured { provider }) if provider == "local"));
    }

    #[tokio::test]
    async fn invalid_messages_are_reported_in_the_stream() {
        let provider = OpenAiProvider::new(
            "openai",
            ProviderSettings {
                api_key: Some(SecretString::from("sk-test".to_owned())),
                ..ProviderSettings::default()
            },
        )
        .unwrap();

        let items: Vec<_> = provider.stream(&[], &CompletionOptions::new("gpt-4o")).collect().await;
        assert!(matches!(items[0], Err(LlmError::InvalidRequest(_))));
    }

    #[test]
    fn reinitialize_keeps_name() {
        let provider = OpenAiProvider::new("groq", ProviderSettings::default()).unwrap();
        provider.update_api_key(SecretString::from("gsk-1".to_owned())).unwrap();

        assert!(provider.is_ready());
        assert_eq!(provider.name(), "groq");
        assert_eq!(provider.kind(), ProviderKind::OpenAi);
    }

    #[test]
    fn extracts_error_message_from_envelope() {
        let body = r#"{"error":{"message":"model not found","type":"invalid_request_error"}}"#;
        assert_eq!(describe_error(body).as_deref(), Some("model not found"));
        assert_eq!(describe_error("gateway timeout"), None);
    }
}
