//! Provider trait and the adapters for each backend protocol

pub mod anthropic;
pub mod openai;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use futures_util::stream::{self, Stream, StreamExt};
use http::header::{HeaderMap, HeaderName, HeaderValue};
use indexmap::IndexMap;
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tandem_config::{LlmProviderConfig, LlmProviderType};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::LlmError;
use crate::types::{CompletionOptions, Message, StreamChunk};

/// Sequence of chunks produced by one [`Provider::stream`] call
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, LlmError>> + Send>>;

/// Wire protocol an adapter speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// `OpenAI` chat completions and compatible servers
    OpenAi,
    /// Anthropic Messages API
    Anthropic,
}

impl ProviderKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LlmProviderType> for ProviderKind {
    fn from(value: LlmProviderType) -> Self {
        match value {
            LlmProviderType::Openai => Self::OpenAi,
            LlmProviderType::Anthropic => Self::Anthropic,
        }
    }
}

/// Uniform interface over LLM backends
///
/// Adapters live for the whole process. Credentials are swapped in place
/// by [`Provider::update_api_key`], so holders of the `Arc` never need to
/// re-resolve the adapter.
pub trait Provider: Send + Sync {
    /// Stable lowercase identifier
    fn name(&self) -> &str;

    /// Wire protocol spoken by this adapter
    fn kind(&self) -> ProviderKind;

    /// Whether a live client with a non-empty key is installed
    fn is_ready(&self) -> bool;

    /// Rebuild the HTTP client with a new key
    ///
    /// An empty key leaves the adapter not ready. Requests already in
    /// flight keep whichever client they started with.
    fn update_api_key(&self, api_key: SecretString) -> Result<(), LlmError>;

    /// Send one batched request and expose the response as chunks
    ///
    /// Yields the primary chunk, then a usage chunk when the backend
    /// reported token accounting. Failures, including cancellation through
    /// `options.signal`, end the sequence with an error item.
    fn stream(&self, messages: &[Message], options: &CompletionOptions) -> ChunkStream;
}

/// Construction settings shared by every adapter
#[derive(Debug, Clone, Default)]
pub struct ProviderSettings {
    /// Initial API key; absent or empty means not ready
    pub api_key: Option<SecretString>,
    /// Base URL override
    pub base_url: Option<Url>,
    /// Extra headers sent with every request
    pub headers: IndexMap<String, String>,
    /// Route all traffic through this proxy
    pub proxy: Option<Url>,
    /// Whole-request timeout
    pub timeout: Option<Duration>,
}

impl From<&LlmProviderConfig> for ProviderSettings {
    fn from(config: &LlmProviderConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            headers: config.headers.clone(),
            proxy: config.proxy.clone(),
            timeout: config.timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Build the adapter for one configured provider
pub fn from_config(name: &str, config: &LlmProviderConfig) -> Result<Arc<dyn Provider>, LlmError> {
    let settings = ProviderSettings::from(config);
    let provider: Arc<dyn Provider> = match ProviderKind::from(config.provider_type) {
        ProviderKind::OpenAi => Arc::new(openai::OpenAiProvider::new(name, settings)?),
        ProviderKind::Anthropic => Arc::new(anthropic::AnthropicProvider::new(name, settings)?),
    };
    Ok(provider)
}

/// Client and key installed together so readers never see a mix
pub(crate) struct ClientState {
    pub(crate) client: Client,
    pub(crate) api_key: SecretString,
}

/// HTTP plumbing shared by the adapters
///
/// Holds the swappable client state plus the settings needed to rebuild it.
pub(crate) struct Transport {
    name: String,
    base_url: Url,
    headers: HeaderMap,
    proxy: Option<reqwest::Proxy>,
    timeout: Option<Duration>,
    state: ArcSwapOption<ClientState>,
}

impl Transport {
    /// Create the transport and install the initial client, if a key was given
    ///
    /// # Panics
    ///
    /// Panics if `default_base_url` is not a valid URL.
    pub(crate) fn new(name: &str, default_base_url: &str, settings: ProviderSettings) -> Result<Self, LlmError> {
        let name = name.to_lowercase();
        let headers = parse_headers(&name, &settings.headers);
        let proxy = settings
            .proxy
            .map(|url| {
                reqwest::Proxy::all(url.as_str())
                    .map_err(|e| LlmError::InvalidRequest(format!("invalid proxy for provider '{name}': {e}")))
            })
            .transpose()?;
        let transport = Self {
            base_url: settings
                .base_url
                .unwrap_or_else(|| Url::parse(default_base_url).expect("valid default URL")),
            headers,
            proxy,
            timeout: settings.timeout,
            state: ArcSwapOption::empty(),
            name,
        };

        if let Some(api_key) = settings.api_key {
            transport.install(api_key)?;
        }

        Ok(transport)
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.state.load().is_some()
    }

    /// Replace the client state, clearing it for an empty key
    pub(crate) fn install(&self, api_key: SecretString) -> Result<(), LlmError> {
        if api_key.expose_secret().trim().is_empty() {
            self.state.store(None);
            tracing::warn!(provider = %self.name, "empty API key installed, provider is not ready");
            return Ok(());
        }

        let client = self.build_client()?;
        self.state.store(Some(Arc::new(ClientState { client, api_key })));
        tracing::info!(provider = %self.name, "provider client initialized");
        Ok(())
    }

    /// Snapshot of the current client state
    pub(crate) fn current(&self) -> Result<Arc<ClientState>, LlmError> {
        self.state.load_full().ok_or_else(|| LlmError::NotConfigured {
            provider: self.name.clone(),
        })
    }

    /// Absolute URL for an API path under the base URL
    pub(crate) fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/{path}")
    }

    fn build_client(&self) -> Result<Client, LlmError> {
        let mut builder = Client::builder().default_headers(self.headers.clone());

        if let Some(proxy) = &self.proxy {
            builder = builder.proxy(proxy.clone());
        }

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        builder
            .build()
            .map_err(|e| LlmError::Internal(anyhow::anyhow!("failed to build HTTP client for '{}': {e}", self.name)))
    }
}

/// Convert configured headers, skipping entries that are not valid HTTP
fn parse_headers(provider: &str, headers: &IndexMap<String, String>) -> HeaderMap {
    let mut map = HeaderMap::with_capacity(headers.len());

    for (name, value) in headers {
        let Ok(header_name) = HeaderName::try_from(name.as_str()) else {
            tracing::warn!(provider, header = %name, "skipping invalid header name");
            continue;
        };
        let Ok(header_value) = HeaderValue::try_from(value.as_str()) else {
            tracing::warn!(provider, header = %name, "skipping invalid header value");
            continue;
        };
        map.insert(header_name, header_value);
    }

    map
}

/// Send a prepared request and decode the JSON body
///
/// `describe_error` pulls a readable message out of an error body when the
/// backend uses a known error envelope.
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: &str,
    builder: RequestBuilder,
    describe_error: fn(&str) -> Option<String>,
) -> Result<T, LlmError> {
    let response = builder.send().await.map_err(|e| {
        tracing::error!(provider, error = %e, "upstream request failed");
        LlmError::Upstream(e.to_string())
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(provider, status = %status, "upstream returned error");
        let detail = describe_error(&body).unwrap_or(body);
        return Err(LlmError::Upstream(format!("provider returned {status}: {detail}")));
    }

    response
        .json()
        .await
        .map_err(|e| LlmError::Upstream(format!("failed to parse response: {e}")))
}

/// Race a batched request against the caller's cancellation signal
///
/// The request future is dropped as soon as the signal fires, which
/// releases the connection. The resulting chunks, or the single error, are
/// flattened into a [`ChunkStream`].
pub(crate) fn into_chunk_stream<F>(signal: Option<CancellationToken>, request: F) -> ChunkStream
where
    F: Future<Output = Result<Vec<StreamChunk>, LlmError>> + Send + 'static,
{
    let guarded = async move {
        match signal {
            Some(token) => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => Err(LlmError::Cancelled),
                    result = request => result,
                }
            }
            None => request.await,
        }
    };

    Box::pin(stream::once(guarded).flat_map(|result| {
        let items: Vec<Result<StreamChunk, LlmError>> = match result {
            Ok(chunks) => chunks.into_iter().map(Ok).collect(),
            Err(err) => vec![Err(err)],
        };
        stream::iter(items)
    }))
}
