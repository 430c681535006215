use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tandem coding assistant runtime
#[derive(Debug, Parser)]
#[command(name = "tandem", about = "Run coding-assistant turns against any configured LLM backend")]
pub struct Args {
    /// Path to configuration file; defaults apply when it does not exist
    #[arg(short, long, default_value = "tandem.toml", env = "TANDEM_CONFIG")]
    pub config: PathBuf,

    /// Override the log filter, e.g. `debug` or `info,tandem_llm=trace`
    #[arg(long, env = "TANDEM_LOG")]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List registered tools and their permission tiers
    Tools,

    /// Send one prompt and run the tool calls the model asks for
    Ask {
        /// Provider name from the configuration; the default provider when omitted
        #[arg(short, long)]
        provider: Option<String>,

        /// Backend model identifier
        #[arg(short, long)]
        model: String,

        /// Allow tools that modify the machine to run without confirmation
        #[arg(long)]
        allow_unsafe: bool,

        /// API key that replaces the configured one for this run
        #[arg(long, env = "TANDEM_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Maximum model round trips before giving up
        #[arg(long, default_value_t = 8)]
        max_rounds: usize,

        /// The prompt
        prompt: String,
    },
}
