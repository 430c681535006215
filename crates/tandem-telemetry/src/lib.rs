//! Logging setup for tandem
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and a text or
//! JSON `fmt` layer.

use tandem_config::{LogFormat, TelemetryConfig};
use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};

/// Resolve the effective filter directive
///
/// `RUST_LOG` wins over the configured filter, which wins over the
/// caller's default.
pub fn resolve_filter(config: &TelemetryConfig, default_filter: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let directive = config.log_filter.as_deref().unwrap_or(default_filter);
    EnvFilter::try_new(directive).unwrap_or_else(|e| {
        eprintln!("invalid log filter '{directive}': {e}, falling back to 'info'");
        EnvFilter::new("info")
    })
}

/// Build the formatting layer for the configured format
fn fmt_layer(format: LogFormat) -> Box<dyn Layer<Registry> + Send + Sync> {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    match format {
        LogFormat::Text => layer.boxed(),
        LogFormat::Json => layer.json().flatten_event(true).boxed(),
    }
}

/// Initialize global logging
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init(config: &TelemetryConfig, default_filter: &str) -> anyhow::Result<()> {
    let filter = resolve_filter(config, default_filter);

    tracing_subscriber::registry()
        .with(fmt_layer(config.log_format))
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(filter: Option<&str>) -> TelemetryConfig {
        TelemetryConfig {
            log_format: LogFormat::Text,
            log_filter: filter.map(str::to_owned),
        }
    }

    #[test]
    fn configured_filter_beats_default() {
        temp_env::with_var_unset("RUST_LOG", || {
            assert_eq!(resolve_filter(&config(Some("tandem_llm=debug")), "warn").to_string(), "tandem_llm=debug");
            assert_eq!(resolve_filter(&config(None), "warn").to_string(), "warn");
        });
    }

    #[test]
    fn rust_log_beats_configuration() {
        temp_env::with_var("RUST_LOG", Some("trace"), || {
            assert_eq!(resolve_filter(&config(Some("info")), "warn").to_string(), "trace");
        });
    }

    #[test]
    fn invalid_filter_falls_back_to_info() {
        temp_env::with_var_unset("RUST_LOG", || {
            assert_eq!(resolve_filter(&config(Some("tandem=loud")), "warn").to_string(), "info");
        });
    }
}
