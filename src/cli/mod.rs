//! CLI module for the router client
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `chat` - Interactive session (persisted, restorable)
//! - `ask` - Route a single query and print the answer
//! - `health` - Show router backend health
//! - `metrics` - Show aggregate routing metrics
//!
//! # Example
//!
//! ```bash
//! # Interactive session against a local router
//! router-client chat
//!
//! # One-shot query forcing the deep model
//! router-client ask "Prove there are infinitely many primes" --model gemini-2.5-flash
//!
//! # Machine-readable metrics
//! router-client metrics --json --base-url http://router.internal:8000
//! ```

pub mod ask;
pub mod chat;
pub mod output;
pub mod status;

use crate::config::ClientConfig;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_PATH: &str = "router-client.toml";

/// Smart router client - System 1 / System 2 query routing from the terminal
#[derive(Parser, Debug)]
#[command(
    name = "router-client",
    version,
    about = "Interactive client for a System 1 / System 2 LLM query router"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive session
    Chat(ChatArgs),
    /// Route a single query
    Ask(AskArgs),
    /// Show router backend health
    Health(StatusArgs),
    /// Show aggregate routing metrics
    Metrics(StatusArgs),
}

/// Options shared by every command
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Override router backend URL
    #[arg(short = 'u', long, env = "ROUTER_CLIENT_BASE_URL")]
    pub base_url: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "ROUTER_CLIENT_LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Args, Debug)]
pub struct ChatArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Initial system prompt
    #[arg(short, long)]
    pub system_prompt: Option<String>,

    /// Force every query to this model
    #[arg(short, long)]
    pub model: Option<String>,

    /// Start with an empty session instead of loading the stored one
    #[arg(long)]
    pub fresh: bool,

    /// Disable background health polling
    #[arg(long)]
    pub no_health_check: bool,
}

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Query text
    pub query: String,

    #[command(flatten)]
    pub common: CommonArgs,

    /// System prompt sent with the query
    #[arg(short, long)]
    pub system_prompt: Option<String>,

    /// Force the query to this model
    #[arg(short, long)]
    pub model: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(args: &CommonArgs) -> anyhow::Result<ClientConfig> {
    // Only an explicitly chosen file must exist
    let mut config = if args.config.exists() {
        ClientConfig::load(Some(&args.config))?
    } else if args.config.as_os_str() == DEFAULT_CONFIG_PATH {
        tracing::debug!("Config file not found, using defaults");
        ClientConfig::default()
    } else {
        ClientConfig::load(Some(&args.config))?
    };

    config = config.with_env_overrides();

    if let Some(ref base_url) = args.base_url {
        config.server.base_url = base_url.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }

    config.validate()?;
    Ok(config)
}
