//! Configuration for the tandem runtime
//!
//! Loaded from a single TOML file with `{{ env.VAR }}` placeholders expanded
//! before deserialization.

#![allow(clippy::must_use_candidate)]

mod env;
pub mod llm;
mod loader;
pub mod telemetry;
pub mod tools;

use serde::Deserialize;

pub use llm::*;
pub use telemetry::*;
pub use tools::*;

/// Top-level tandem configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// LLM provider configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Tool category selection
    #[serde(default)]
    pub tools: ToolsConfig,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
