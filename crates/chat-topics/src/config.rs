//! Clustering configuration.
//!
//! One immutable value threaded through every stage. Nothing here is read
//! from ambient state; the pipeline driver supplies it.

use chat_types::TimestampUnit;
use serde::{Deserialize, Serialize};

use crate::error::ClusterError;

/// Master configuration for topic clustering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringConfig {
    /// Base window in seconds, used when adaptive sizing is off or the
    /// input has a single message
    #[serde(default = "default_time_window")]
    pub time_window: i64,

    /// Groups smaller than this are dropped
    #[serde(default = "default_min_messages")]
    pub min_messages: usize,

    /// Cosine similarity a group pair must strictly exceed to merge
    #[serde(default = "default_semantic_threshold")]
    pub semantic_threshold: f32,

    /// Merge groups connected by quoted replies
    #[serde(default = "default_true")]
    pub enable_reply_chain: bool,

    /// Merge groups with similar text
    #[serde(default = "default_true")]
    pub enable_semantic: bool,

    /// Pick the window from message density
    #[serde(default = "default_true")]
    pub enable_adaptive_window: bool,

    /// Unit of message timestamps
    #[serde(default)]
    pub timestamp_unit: TimestampUnit,

    /// What to do with input that is not timestamp-ascending
    #[serde(default)]
    pub on_unsorted: UnsortedPolicy,

    /// Density thresholds for adaptive windows
    #[serde(default)]
    pub adaptive: AdaptiveWindowConfig,

    /// Group document construction and vectorization
    #[serde(default)]
    pub document: DocumentConfig,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            time_window: default_time_window(),
            min_messages: default_min_messages(),
            semantic_threshold: default_semantic_threshold(),
            enable_reply_chain: true,
            enable_semantic: true,
            enable_adaptive_window: true,
            timestamp_unit: TimestampUnit::default(),
            on_unsorted: UnsortedPolicy::default(),
            adaptive: AdaptiveWindowConfig::default(),
            document: DocumentConfig::default(),
        }
    }
}

impl ClusteringConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ClusterError> {
        if self.time_window <= 0 {
            return Err(ClusterError::InvalidConfig(format!(
                "time_window must be > 0, got {}",
                self.time_window
            )));
        }
        if self.min_messages == 0 {
            return Err(ClusterError::InvalidConfig(
                "min_messages must be >= 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.semantic_threshold) {
            return Err(ClusterError::InvalidConfig(format!(
                "semantic_threshold must be 0.0-1.0, got {}",
                self.semantic_threshold
            )));
        }
        self.adaptive.validate()?;
        if self.document.max_features == Some(0) {
            return Err(ClusterError::InvalidConfig(
                "document.max_features must be > 0 when set".to_string(),
            ));
        }
        if self.document.max_messages_per_group == Some(0) {
            return Err(ClusterError::InvalidConfig(
                "document.max_messages_per_group must be > 0 when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Window in native timestamp units for a window given in seconds.
    pub fn native_window(&self, window_secs: i64) -> i64 {
        self.timestamp_unit.from_secs(window_secs)
    }
}

fn default_time_window() -> i64 {
    300 // 5 minutes
}
fn default_min_messages() -> usize {
    2
}
fn default_semantic_threshold() -> f32 {
    0.3
}
fn default_true() -> bool {
    true
}

/// Policy for input that violates timestamp order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsortedPolicy {
    /// Stable sort by timestamp; ties keep arrival order
    #[default]
    Sort,
    /// Fail with `ClusterError::UnsortedInput`
    Reject,
}

/// One row of the density -> window table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityTier {
    /// Density (messages/second) that must be strictly exceeded
    pub min_density: f64,
    /// Window in seconds for this tier
    pub window_secs: i64,
}

/// Density thresholds for the adaptive window.
///
/// Tiers are checked in order; the first whose `min_density` is exceeded
/// wins. Anything at or below every tier uses `sparse_window_secs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveWindowConfig {
    /// Tiers in strictly descending `min_density` order
    #[serde(default = "default_tiers")]
    pub tiers: Vec<DensityTier>,

    /// Window for sparse conversations
    #[serde(default = "default_sparse_window")]
    pub sparse_window_secs: i64,
}

impl Default for AdaptiveWindowConfig {
    fn default() -> Self {
        Self {
            tiers: default_tiers(),
            sparse_window_secs: default_sparse_window(),
        }
    }
}

impl AdaptiveWindowConfig {
    /// Window in seconds for a density in messages/second.
    pub fn window_for_density(&self, density: f64) -> i64 {
        self.tiers
            .iter()
            .find(|tier| density > tier.min_density)
            .map(|tier| tier.window_secs)
            .unwrap_or(self.sparse_window_secs)
    }

    fn validate(&self) -> Result<(), ClusterError> {
        if self.sparse_window_secs <= 0 {
            return Err(ClusterError::InvalidConfig(format!(
                "adaptive.sparse_window_secs must be > 0, got {}",
                self.sparse_window_secs
            )));
        }
        for tier in &self.tiers {
            if !tier.min_density.is_finite() || tier.min_density < 0.0 {
                return Err(ClusterError::InvalidConfig(format!(
                    "adaptive tier density must be a finite value >= 0, got {}",
                    tier.min_density
                )));
            }
            if tier.window_secs <= 0 {
                return Err(ClusterError::InvalidConfig(format!(
                    "adaptive tier window must be > 0, got {}",
                    tier.window_secs
                )));
            }
        }
        let descending = self
            .tiers
            .windows(2)
            .all(|pair| pair[0].min_density > pair[1].min_density);
        if !descending {
            return Err(ClusterError::InvalidConfig(
                "adaptive tiers must be in strictly descending density order".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_tiers() -> Vec<DensityTier> {
    vec![
        DensityTier {
            min_density: 0.5,
            window_secs: 150,
        },
        DensityTier {
            min_density: 0.2,
            window_secs: 300,
        },
    ]
}
fn default_sparse_window() -> i64 {
    600
}

/// How a group is turned into a text document for similarity scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// Message texts that carry no content (media placeholders)
    #[serde(default = "default_placeholder_texts")]
    pub placeholder_texts: Vec<String>,

    /// Append link title/description to the document
    #[serde(default = "default_true")]
    pub include_link_metadata: bool,

    /// Only the first N messages of a group feed its document
    #[serde(default)]
    pub max_messages_per_group: Option<usize>,

    /// Vocabulary cap, most frequent terms first
    #[serde(default = "default_max_features")]
    pub max_features: Option<usize>,

    /// Add adjacent-token bigrams
    #[serde(default = "default_true")]
    pub bigrams: bool,

    /// Drop common English stop words
    #[serde(default = "default_true")]
    pub remove_stop_words: bool,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            placeholder_texts: default_placeholder_texts(),
            include_link_metadata: true,
            max_messages_per_group: None,
            max_features: default_max_features(),
            bigrams: true,
            remove_stop_words: true,
        }
    }
}

impl DocumentConfig {
    /// Whether `text` is a media placeholder.
    pub fn is_placeholder(&self, text: &str) -> bool {
        self.placeholder_texts.iter().any(|p| p == text)
    }
}

pub(crate) fn default_placeholder_texts() -> Vec<String> {
    ["[图片]", "[语音]", "[视频]", "[表情]"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_max_features() -> Option<usize> {
    Some(100)
}

/// Offline keyword labeling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelingConfig {
    /// Maximum title length in characters
    #[serde(default = "default_max_label_length")]
    pub max_label_length: usize,

    /// Number of keywords in a title
    #[serde(default = "default_top_keywords")]
    pub top_keywords: usize,

    /// Messages quoted in a conclusion
    #[serde(default = "default_conclusion_messages")]
    pub conclusion_messages: usize,

    /// Characters kept per quoted message
    #[serde(default = "default_snippet_chars")]
    pub snippet_chars: usize,

    /// Maximum conclusion length in characters
    #[serde(default = "default_max_conclusion_length")]
    pub max_conclusion_length: usize,

    /// Message texts skipped when labeling
    #[serde(default = "default_placeholder_texts")]
    pub placeholder_texts: Vec<String>,
}

impl Default for LabelingConfig {
    fn default() -> Self {
        Self {
            max_label_length: default_max_label_length(),
            top_keywords: default_top_keywords(),
            conclusion_messages: default_conclusion_messages(),
            snippet_chars: default_snippet_chars(),
            max_conclusion_length: default_max_conclusion_length(),
            placeholder_texts: default_placeholder_texts(),
        }
    }
}

fn default_max_label_length() -> usize {
    50
}
fn default_top_keywords() -> usize {
    5
}
fn default_conclusion_messages() -> usize {
    5
}
fn default_snippet_chars() -> usize {
    100
}
fn default_max_conclusion_length() -> usize {
    300
}
