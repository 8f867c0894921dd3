//! Layered settings for the CLI.
//!
//! Sources, later overriding earlier:
//! 1. Built-in defaults
//! 2. `<config dir>/chat-topics/config.toml` (optional)
//! 3. `--config` file (required when given)
//! 4. `CHAT_TOPICS_*` environment variables
//!
//! CLI flags are applied by the caller after loading.

use std::path::{Path, PathBuf};

use chat_topics::{ClusteringConfig, LabelingConfig};
use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Clustering engine configuration
    #[serde(default)]
    pub clustering: ClusteringConfig,

    /// Keyword labeler configuration
    #[serde(default)]
    pub labeling: LabelingConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            clustering: ClusteringConfig::default(),
            labeling: LabelingConfig::default(),
        }
    }
}

/// Default config file location, without extension.
pub fn default_config_path() -> PathBuf {
    ProjectDirs::from("", "", "chat-topics")
        .map(|p| p.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
        .join("config")
}

impl Settings {
    /// Load settings from the default file, `cli_config_path` and environment.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, ConfigError> {
        Self::load_from(&default_config_path(), cli_config_path)
    }

    /// Load with an explicit default config file location.
    pub fn load_from(default_path: &Path, cli_config_path: Option<&str>) -> Result<Self, ConfigError> {
        let defaults = ClusteringConfig::default();

        let mut builder = Config::builder()
            .set_default("log_level", default_log_level())?
            .set_default("clustering.time_window", defaults.time_window)?
            .set_default("clustering.min_messages", defaults.min_messages as i64)?
            .set_default(
                "clustering.semantic_threshold",
                f64::from(defaults.semantic_threshold),
            )?
            .add_source(File::with_name(&default_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // CHAT_TOPICS_LOG_LEVEL, CHAT_TOPICS_CLUSTERING__TIME_WINDOW, ...
        builder = builder.add_source(
            Environment::with_prefix("CHAT_TOPICS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
