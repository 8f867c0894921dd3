//! Chat topic clusterer
//!
//! Groups a batch of chat messages into topics.
//!
//! # Usage
//!
//! ```bash
//! chat-topics cluster --input messages.json --output out/ [--label] [--profiles]
//! chat-topics config
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/chat-topics/config.toml)
//! 3. `--config` file
//! 4. Environment variables (CHAT_TOPICS_*)
//! 5. CLI flags

use anyhow::Result;
use clap::Parser;

use chat_cli::{handle_cluster, handle_config, Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Cluster(args) => {
            handle_cluster(cli.config.as_deref(), cli.log_level.as_deref(), args)?;
        }
        Commands::Config => {
            handle_config(cli.config.as_deref(), cli.log_level.as_deref())?;
        }
    }

    Ok(())
}
