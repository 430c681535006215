use indexmap::IndexMap;
use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Top-level LLM configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    /// Provider used when none is named explicitly
    #[serde(default)]
    pub default_provider: Option<String>,
    /// Provider configurations keyed by name
    #[serde(default)]
    pub providers: IndexMap<String, LlmProviderConfig>,
}

/// Configuration for a single LLM backend
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LlmProviderConfig {
    /// Wire protocol spoken by the backend
    #[serde(rename = "type")]
    pub provider_type: LlmProviderType,
    /// API key for authentication
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override, e.g. a local OpenAI-compatible server
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: IndexMap<String, String>,
    /// Proxy all traffic for this provider through the given URL
    #[serde(default)]
    pub proxy: Option<Url>,
    /// Per-request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl LlmProviderConfig {
    /// Minimal configuration for the given protocol
    pub fn new(provider_type: LlmProviderType) -> Self {
        Self {
            provider_type,
            api_key: None,
            base_url: None,
            headers: IndexMap::new(),
            proxy: None,
            timeout_secs: None,
        }
    }
}

/// Supported LLM wire protocols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProviderType {
    /// OpenAI chat completions, also spoken by Groq and local servers
    Openai,
    /// Anthropic Messages API
    Anthropic,
}
