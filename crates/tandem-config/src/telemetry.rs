use serde::Deserialize;

/// Logging configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    /// Output format for log lines
    #[serde(default)]
    pub log_format: LogFormat,
    /// `EnvFilter` directive, e.g. `info,tandem_llm=debug`
    #[serde(default)]
    pub log_filter: Option<String>,
}

/// Log line format
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text
    #[default]
    Text,
    /// One JSON object per line
    Json,
}
