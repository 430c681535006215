//! Named lookup of provider adapters

use std::sync::Arc;

use indexmap::IndexMap;
use secrecy::SecretString;
use tandem_config::LlmConfig;

use crate::error::LlmError;
use crate::provider::{self, Provider};

/// Adapters keyed by their lowercase name
///
/// Lookups hand out the same `Arc` every time; reinitialization swaps
/// credentials inside that adapter rather than replacing it.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: IndexMap<String, Arc<dyn Provider>>,
    default: Option<String>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one adapter per configured provider
    ///
    /// # Errors
    ///
    /// Returns an error if any adapter fails to construct.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let mut registry = Self::new();

        for (name, provider_config) in &config.providers {
            let adapter = provider::from_config(name, provider_config)?;
            tracing::debug!(
                provider = %adapter.name(),
                kind = %adapter.kind(),
                ready = adapter.is_ready(),
                "registered provider"
            );
            registry.insert(adapter);
        }

        registry.default = config.default_provider.as_deref().map(str::to_lowercase);
        Ok(registry)
    }

    /// Add an adapter under its own name, replacing any previous one
    pub fn insert(&mut self, provider: Arc<dyn Provider>) {
        let name = provider.name().to_owned();
        if self.providers.insert(name.clone(), provider).is_some() {
            tracing::warn!(provider = %name, "provider replaced");
        }
    }

    /// Look up an adapter by name
    pub fn get(&self, name: &str) -> Result<Arc<dyn Provider>, LlmError> {
        self.providers
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| LlmError::ProviderNotFound {
                provider: name.to_owned(),
            })
    }

    /// The configured default, or the first registered adapter
    pub fn default_provider(&self) -> Result<Arc<dyn Provider>, LlmError> {
        match &self.default {
            Some(name) => self.get(name),
            None => self
                .providers
                .values()
                .next()
                .cloned()
                .ok_or_else(|| LlmError::ProviderNotFound {
                    provider: "default".to_owned(),
                }),
        }
    }

    /// Install a new API key in the named adapter
    ///
    /// # Errors
    ///
    /// Returns `ProviderNotFound` for an unknown name, or the adapter's
    /// error if the client cannot be rebuilt.
    pub fn reinitialize(&self, name: &str, api_key: SecretString) -> Result<(), LlmError> {
        let provider = self.get(name)?;
        provider.update_api_key(api_key)?;
        tracing::info!(provider = %provider.name(), ready = provider.is_ready(), "provider reinitialized");
        Ok(())
    }

    /// Adapter names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
