#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;
mod turn;

use std::sync::Arc;

use anyhow::Context;
use args::{Args, Command};
use clap::Parser;
use secrecy::SecretString;
use tandem_config::Config;
use tandem_llm::ProviderRegistry;
use tandem_tools::{ToolRegistry, register_builtin_tools, register_categories};
use tokio_util::sync::CancellationToken;
use turn::TurnRunner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration, falling back to defaults when the file is absent
    let mut config = if args.config.exists() {
        Config::load(&args.config)?
    } else {
        Config::default()
    };

    if let Some(filter) = args.log_filter {
        config.telemetry.log_filter = Some(filter);
    }

    tandem_telemetry::init(&config.telemetry, "warn")?;

    tracing::debug!(config_path = %args.config.display(), "starting tandem");

    let tools = Arc::new(ToolRegistry::new());
    match config.tools.categories {
        Some(ref names) => register_categories(&tools, names).context("invalid tool configuration")?,
        None => register_builtin_tools(&tools),
    }

    match args.command {
        Command::Tools => {
            for schema in tools.schemas() {
                println!(
                    "{:<18} {:<7} {}",
                    schema.name,
                    schema.permission.to_string(),
                    schema.description
                );
            }
        }
        Command::Ask {
            provider,
            model,
            allow_unsafe,
            api_key,
            max_rounds,
            prompt,
        } => {
            let providers = ProviderRegistry::from_config(&config.llm)?;
            let provider = match provider {
                Some(name) => providers.get(&name)?,
                None => providers.default_provider()?,
            };

            if let Some(key) = api_key {
                providers.reinitialize(provider.name(), SecretString::from(key))?;
            }

            let signal = CancellationToken::new();
            let cancel = signal.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("interrupt received, cancelling request");
                    cancel.cancel();
                }
            });

            let runner = TurnRunner::new(provider, tools, allow_unsafe, max_rounds);
            let outcome = runner.run(&prompt, &model, signal).await?;

            tracing::info!(
                rounds = outcome.rounds,
                tool_calls = outcome.tool_calls,
                prompt_tokens = outcome.usage.prompt_tokens,
                completion_tokens = outcome.usage.completion_tokens,
                cached_tokens = outcome.usage.cached_tokens,
                "turn finished"
            );
            println!("{}", outcome.answer);
        }
    }

    Ok(())
}
