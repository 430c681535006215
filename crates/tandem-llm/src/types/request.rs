use tokio_util::sync::CancellationToken;

use super::tool::ToolDefinition;

/// Token limit used when the caller does not set one
pub const DEFAULT_MAX_TOKENS: u32 = 8000;

/// Per-call settings for [`crate::Provider::stream`]
///
/// The model name is passed through untouched; an unknown model surfaces
/// as a backend failure.
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    /// Backend model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: Option<f64>,
    /// Tools advertised to the model
    pub tools: Option<Vec<ToolDefinition>>,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Cooperative cancellation for the outstanding request
    pub signal: Option<CancellationToken>,
}

impl CompletionOptions {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
            tools: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            signal: None,
        }
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = (!tools.is_empty()).then_some(tools);
        self
    }

    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    #[must_use]
    pub fn with_signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Tools to advertise, empty when none were set
    pub fn tools(&self) -> &[ToolDefinition] {
        self.tools.as_deref().unwrap_or_default()
    }
}
