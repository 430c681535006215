use thiserror::Error;

/// Errors that end a provider stream or a registry lookup
#[derive(Debug, Error)]
pub enum LlmError {
    /// Named provider does not exist in configuration
    #[error("provider not found: {provider}")]
    ProviderNotFound { provider: String },

    /// Provider has no usable client or API key
    #[error("provider '{provider}' is not configured with an API key")]
    NotConfigured { provider: String },

    /// Caller passed messages or options the adapter cannot send
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Transport failure or error status from the backend
    #[error("upstream error: {0}")]
    Upstream(String),

    /// The caller's cancellation signal fired before the response arrived
    #[error("request cancelled")]
    Cancelled,

    /// Unexpected internal error
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl LlmError {
    /// Whether the failure came from the caller's cancellation signal
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Whether an orchestration loop may reasonably try the turn again
    ///
    /// Adapters never retry on their own; this only classifies.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Upstream(_))
    }
}
