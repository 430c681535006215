#![allow(dead_code)]

pub mod mock_backend;

use tandem_config::{LlmConfig, LlmProviderConfig, LlmProviderType};

/// Provider configuration pointing at a mock backend
pub fn provider_config(provider_type: LlmProviderType, base_url: url::Url, api_key: Option<&str>) -> LlmProviderConfig {
    let mut config = LlmProviderConfig::new(provider_type);
    config.base_url = Some(base_url);
    config.api_key = api_key.map(|key| secrecy::SecretString::from(key.to_owned()));
    config
}

/// LLM configuration with the given named providers, first one as default
pub fn llm_config(providers: Vec<(&str, LlmProviderConfig)>) -> LlmConfig {
    LlmConfig {
        default_provider: providers.first().map(|(name, _)| (*name).to_owned()),
        providers: providers
            .into_iter()
            .map(|(name, config)| (name.to_owned(), config))
            .collect(),
    }
}
