//! Command implementations.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chat_topics::{apply_labels, build_profiles, ClusterStats, KeywordLabeler, TopicClusterer};
use chat_types::Message;
use serde::Serialize;
use tracing::{debug, info};

use crate::cli::ClusterArgs;
use crate::settings::Settings;

/// Topics file written to the output directory.
pub const TOPICS_FILE: &str = "topics.json";
/// Profiles file written with `--profiles`.
pub const PROFILES_FILE: &str = "profiles.json";

/// Outcome of one `cluster` run.
#[derive(Debug)]
pub struct ClusterReport {
    pub stats: ClusterStats,
    pub topics_path: PathBuf,
    pub profiles_path: Option<PathBuf>,
    pub labeled: usize,
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `level`. A second call is a no-op.
pub fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load settings and apply the global `--log-level` override.
fn load_settings(config_path: Option<&str>, log_level: Option<&str>) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    if let Some(level) = log_level {
        settings.log_level = level.to_string();
    }
    Ok(settings)
}

/// Apply `cluster` flags on top of loaded settings.
pub fn apply_cluster_overrides(settings: &mut Settings, args: &ClusterArgs) {
    let clustering = &mut settings.clustering;
    if let Some(window) = args.time_window {
        clustering.time_window = window;
    }
    if let Some(min) = args.min_messages {
        clustering.min_messages = min;
    }
    if let Some(threshold) = args.semantic_threshold {
        clustering.semantic_threshold = threshold;
    }
    if args.no_reply_chain {
        clustering.enable_reply_chain = false;
    }
    if args.no_semantic {
        clustering.enable_semantic = false;
    }
    if args.no_adaptive_window {
        clustering.enable_adaptive_window = false;
    }
}

/// Handle `chat-topics cluster`.
pub fn handle_cluster(
    config_path: Option<&str>,
    log_level: Option<&str>,
    args: &ClusterArgs,
) -> Result<()> {
    let mut settings = load_settings(config_path, log_level)?;
    apply_cluster_overrides(&mut settings, args);
    init_logging(&settings.log_level);

    let report = run_cluster(&settings, args)?;

    println!(
        "Clustered {} messages into {} topics ({} groups dropped)",
        report.stats.input_messages, report.stats.topics, report.stats.dropped_groups
    );
    println!("  Topics: {}", report.topics_path.display());
    if report.labeled > 0 {
        println!("  Labeled: {}", report.labeled);
    }
    if let Some(path) = &report.profiles_path {
        println!("  Profiles: {}", path.display());
    }
    Ok(())
}

/// Handle `chat-topics config`.
pub fn handle_config(config_path: Option<&str>, log_level: Option<&str>) -> Result<()> {
    let settings = load_settings(config_path, log_level)?;
    let rendered = settings
        .to_toml()
        .context("Failed to render configuration")?;
    print!("{rendered}");
    Ok(())
}

/// Load, cluster and write one batch.
///
/// Output is rendered before any file is written; a failed run leaves no
/// topics file behind.
pub fn run_cluster(settings: &Settings, args: &ClusterArgs) -> Result<ClusterReport> {
    let clusterer = TopicClusterer::new(settings.clustering.clone())
        .context("Invalid clustering configuration")?;

    let messages = load_messages(&args.input)?;
    info!(
        messages = messages.len(),
        input = %args.input.display(),
        "Loaded messages"
    );
    let unit = settings.clustering.timestamp_unit;
    let first = messages.iter().map(|m| m.timestamp).min();
    let last = messages.iter().map(|m| m.timestamp).max();
    if let (Some(first), Some(last)) = (first, last) {
        info!(
            from = ?unit.to_datetime(first),
            to = ?unit.to_datetime(last),
            %unit,
            "Batch time range"
        );
    }

    let (mut topics, stats) = clusterer
        .cluster_with_stats(&messages)
        .context("Clustering failed")?;
    debug!(?stats, "Clustering stats");

    let labeled = if args.label {
        let labeler = KeywordLabeler::new(settings.labeling.clone());
        apply_labels(&mut topics, &messages, &labeler).context("Labeling failed")?
    } else {
        0
    };

    let topics_json = render_json(&topics)?;
    let profiles_json = if args.profiles {
        Some(render_json(&build_profiles(&messages, &topics))?)
    } else {
        None
    };

    fs::create_dir_all(&args.output).with_context(|| {
        format!(
            "Failed to create output directory {}",
            args.output.display()
        )
    })?;

    let topics_path = args.output.join(TOPICS_FILE);
    write_file(&topics_path, &topics_json)?;

    let profiles_path = match profiles_json {
        Some(json) => {
            let path = args.output.join(PROFILES_FILE);
            if let Err(err) = write_file(&path, &json) {
                let _ = fs::remove_file(&topics_path);
                return Err(err);
            }
            Some(path)
        }
        None => None,
    };

    Ok(ClusterReport {
        stats,
        topics_path,
        profiles_path,
        labeled,
    })
}

/// Load messages from a JSON file or every `*.json` file of a directory.
///
/// Directory files are read in file-name order and concatenated.
pub fn load_messages(path: &Path) -> Result<Vec<Message>> {
    if path.is_dir() {
        let mut files: Vec<PathBuf> = fs::read_dir(path)
            .with_context(|| format!("Failed to read directory {}", path.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();

        if files.is_empty() {
            bail!("No .json files in {}", path.display());
        }

        let mut messages = Vec::new();
        for file in files {
            let batch = load_message_file(&file)?;
            debug!(file = %file.display(), messages = batch.len(), "Loaded file");
            messages.extend(batch);
        }
        Ok(messages)
    } else {
        load_message_file(path)
    }
}

fn load_message_file(path: &Path) -> Result<Vec<Message>> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Message::batch_from_slice(&bytes)
        .with_context(|| format!("Failed to parse messages in {}", path.display()))
}

/// Render `value` as pretty-printed UTF-8 JSON with a trailing newline.
fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    json.push('\n');
    Ok(json)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}
