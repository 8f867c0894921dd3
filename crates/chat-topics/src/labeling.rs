//! Topic labeling.
//!
//! Clustering leaves `title` and `conclusion` empty. `TopicLabeler` is the
//! seam where a summarizer fills them; `KeywordLabeler` is the offline
//! implementation built on TF-IDF keywords and message excerpts.

use std::collections::HashMap;

use chat_types::{Message, Topic};
use tracing::{debug, info};

use crate::config::LabelingConfig;
use crate::error::ClusterError;
use crate::tfidf::TfIdf;

/// Title used when a topic has no usable text.
const UNKNOWN_TITLE: &str = "Unknown Topic";

/// Generated label for one topic.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicLabel {
    /// Short human-readable title
    pub title: String,
    /// Short summary, absent for trivial topics
    pub conclusion: Option<String>,
    /// Keywords behind the title, best first
    pub keywords: Vec<String>,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
}

/// Produces titles and conclusions for topics.
pub trait TopicLabeler: Send + Sync {
    /// Label `topic` given its member messages in timestamp order.
    fn label_topic(&self, topic: &Topic, messages: &[&Message]) -> Result<TopicLabel, ClusterError>;
}

/// Keyword-based labeler using TF-IDF.
///
/// Needs no external service. The title is the top keywords, the conclusion
/// quotes the opening messages.
pub struct KeywordLabeler {
    config: LabelingConfig,
}

impl KeywordLabeler {
    pub fn new(config: LabelingConfig) -> Self {
        Self { config }
    }

    /// Member texts worth reading: non-blank and not media placeholders.
    fn content_texts<'m>(&self, messages: &[&'m Message]) -> Vec<&'m str> {
        messages
            .iter()
            .map(|m| m.text.trim())
            .filter(|t| !t.is_empty() && !self.config.placeholder_texts.iter().any(|p| p == *t))
            .collect()
    }

    fn extract_keywords(&self, texts: &[&str]) -> Vec<(String, f32)> {
        if texts.is_empty() {
            return Vec::new();
        }
        TfIdf::new(texts).top_terms(self.config.top_keywords)
    }

    fn generate_title(&self, keywords: &[(String, f32)], texts: &[&str]) -> String {
        if !keywords.is_empty() {
            let words: Vec<&str> = keywords.iter().map(|(w, _)| w.as_str()).collect();
            return self.truncate_label(&words.join(" "));
        }
        match texts.first() {
            Some(first) => self.truncate_label(first),
            None => UNKNOWN_TITLE.to_string(),
        }
    }

    /// Truncate to `max_label_length` characters, breaking at a word boundary.
    fn truncate_label(&self, label: &str) -> String {
        let max = self.config.max_label_length;
        if label.chars().count() <= max {
            return label.to_string();
        }

        let truncated: String = label.chars().take(max).collect();
        match truncated.rfind(' ') {
            Some(last_space) if last_space > 0 => truncated[..last_space].to_string(),
            _ => truncated,
        }
    }

    fn generate_conclusion(&self, texts: &[&str], message_count: usize) -> Option<String> {
        if message_count <= 1 || texts.is_empty() {
            return None;
        }

        let snippets: Vec<String> = texts
            .iter()
            .take(self.config.conclusion_messages)
            .map(|t| t.chars().take(self.config.snippet_chars).collect())
            .collect();
        let joined = snippets.join(" | ");

        if joined.chars().count() > self.config.max_conclusion_length {
            let cut: String = joined
                .chars()
                .take(self.config.max_conclusion_length)
                .collect();
            Some(format!("{cut}..."))
        } else {
            Some(joined)
        }
    }

    /// Higher when the top keyword dominates the rest.
    fn calculate_confidence(&self, keywords: &[(String, f32)]) -> f32 {
        match keywords {
            [] => 0.0,
            [(_, score)] => score.min(1.0),
            [(_, top), ..] => {
                let total: f32 = keywords.iter().map(|(_, s)| s).sum();
                if total == 0.0 {
                    return 0.0;
                }
                0.5 + (top / total) * 0.5
            }
        }
    }
}

impl Default for KeywordLabeler {
    fn default() -> Self {
        Self::new(LabelingConfig::default())
    }
}

impl TopicLabeler for KeywordLabeler {
    fn label_topic(&self, topic: &Topic, messages: &[&Message]) -> Result<TopicLabel, ClusterError> {
        if messages.is_empty() {
            return Err(ClusterError::Labeling(format!(
                "topic {} has no messages",
                topic.topic_id
            )));
        }

        let texts = self.content_texts(messages);
        let keywords = self.extract_keywords(&texts);

        Ok(TopicLabel {
            title: self.generate_title(&keywords, &texts),
            conclusion: self.generate_conclusion(&texts, messages.len()),
            confidence: self.calculate_confidence(&keywords),
            keywords: keywords.into_iter().map(|(w, _)| w).collect(),
        })
    }
}

/// Fill `title` and `conclusion` of every topic in place.
///
/// `messages` must contain every member of every topic. Returns the number of
/// topics labeled.
pub fn apply_labels(
    topics: &mut [Topic],
    messages: &[Message],
    labeler: &dyn TopicLabeler,
) -> Result<usize, ClusterError> {
    let by_id: HashMap<&str, &Message> = messages.iter().map(|m| (m.id.as_str(), m)).collect();

    for topic in topics.iter_mut() {
        let members = topic
            .message_ids
            .iter()
            .map(|id| {
                by_id.get(id.as_str()).copied().ok_or_else(|| {
                    ClusterError::Labeling(format!(
                        "message {id} of topic {} not found",
                        topic.topic_id
                    ))
                })
            })
            .collect::<Result<Vec<&Message>, ClusterError>>()?;

        let label = labeler.label_topic(topic, &members)?;
        debug!(
            topic_id = %topic.topic_id,
            title = %label.title,
            confidence = label.confidence,
            "Labeled topic"
        );
        topic.title = Some(label.title);
        topic.conclusion = label.conclusion;
    }

    info!(topics = topics.len(), "Labeled topics");
    Ok(topics.len())
}
