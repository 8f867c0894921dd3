//! Chat topics CLI library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (cluster, config)
//! - `settings`: Layered configuration loading

pub mod cli;
pub mod commands;
pub mod settings;

pub use cli::{Cli, ClusterArgs, Commands};
pub use commands::{
    apply_cluster_overrides, handle_cluster, handle_config, init_logging, load_messages,
    run_cluster, ClusterReport, PROFILES_FILE, TOPICS_FILE,
};
pub use settings::Settings;
