//! CLI argument parsing for the topic clusterer.
//!
//! CLI flags override every other configuration source.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Chat topic clusterer
///
/// Groups chat messages into topics by time, replies and text similarity.
#[derive(Parser, Debug)]
#[command(name = "chat-topics")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides the default config.toml location)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cluster a message batch into topics
    Cluster(ClusterArgs),

    /// Print the effective configuration as TOML
    Config,
}

/// Arguments for `cluster`
#[derive(Args, Debug, Clone)]
pub struct ClusterArgs {
    /// JSON file with a message array, or a directory of such files
    #[arg(short, long)]
    pub input: PathBuf,

    /// Directory for topics.json (and profiles.json)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Base time window in seconds
    #[arg(long)]
    pub time_window: Option<i64>,

    /// Minimum messages per topic
    #[arg(long)]
    pub min_messages: Option<usize>,

    /// Similarity a group pair must exceed to merge (0.0-1.0)
    #[arg(long)]
    pub semantic_threshold: Option<f32>,

    /// Do not merge groups connected by replies
    #[arg(long)]
    pub no_reply_chain: bool,

    /// Do not merge groups by text similarity
    #[arg(long)]
    pub no_semantic: bool,

    /// Use the fixed time window instead of density-based sizing
    #[arg(long)]
    pub no_adaptive_window: bool,

    /// Fill titles and conclusions with the keyword labeler
    #[arg(long)]
    pub label: bool,

    /// Also write per-sender profiles
    #[arg(long)]
    pub profiles: bool,
}
