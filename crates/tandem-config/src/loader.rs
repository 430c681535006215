use std::path::Path;

use crate::Config;

/// Proxy schemes reqwest can speak
const PROXY_SCHEMES: &[&str] = &["http", "https", "socks5", "socks5h"];

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, a placeholder cannot be
    /// expanded, the TOML is malformed, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let config = Self::from_toml(&raw)?;
        tracing::debug!(
            path = %path.display(),
            providers = config.llm.providers.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error describing the first inconsistency found
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_llm_config()
    }

    fn validate_llm_config(&self) -> anyhow::Result<()> {
        if let Some(ref default) = self.llm.default_provider
            && !self.llm.providers.contains_key(default)
        {
            anyhow::bail!("default_provider '{default}' is not a configured provider");
        }

        for (name, provider) in &self.llm.providers {
            if name.is_empty() {
                anyhow::bail!("provider names must not be empty");
            }

            if let Some(ref proxy) = provider.proxy
                && !PROXY_SCHEMES.contains(&proxy.scheme())
            {
                anyhow::bail!("unsupported proxy scheme '{}' for provider '{name}'", proxy.scheme());
            }

            if provider.timeout_secs == Some(0) {
                anyhow::bail!("timeout_secs for provider '{name}' must be greater than 0");
            }
        }

        Ok(())
    }
}
