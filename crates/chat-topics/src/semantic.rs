//! Text-similarity merging.
//!
//! Each group becomes one document; groups whose TF-IDF cosine similarity
//! strictly exceeds the threshold are joined, and connected components of
//! that graph become the final groups (single-linkage). IDF is fitted over
//! the current group set on every run.

use tracing::{debug, instrument};

use crate::config::{ClusteringConfig, DocumentConfig};
use crate::context::ClusterContext;
use crate::group::{merge_components, DisjointSet, Group};
use crate::pipeline::ClusterStats;
use crate::similarity::{pairwise_similarities, SparseVector};
use crate::stage::{GroupStage, StageKind};
use crate::tfidf::{TfIdfVectorizer, TokenizerOptions, VectorizerOptions};

/// Merges groups with similar text.
#[derive(Debug, Clone)]
pub struct SimilarityMerger {
    threshold: f32,
    document: DocumentConfig,
}

impl SimilarityMerger {
    /// Create a merger from the clustering configuration.
    pub fn new(config: &ClusteringConfig) -> Self {
        Self {
            threshold: config.semantic_threshold,
            document: config.document.clone(),
        }
    }

    fn vectorizer_options(&self) -> VectorizerOptions {
        VectorizerOptions {
            tokenizer: TokenizerOptions {
                remove_stop_words: self.document.remove_stop_words,
                bigrams: self.document.bigrams,
            },
            max_features: self.document.max_features,
        }
    }

    /// Build the text document for one group.
    ///
    /// Member texts in time order, skipping blanks and media placeholders,
    /// followed by each message's link title and description.
    pub fn group_document(&self, ctx: &ClusterContext<'_>, group: &Group) -> String {
        let limit = self
            .document
            .max_messages_per_group
            .unwrap_or(usize::MAX);
        let mut parts: Vec<&str> = Vec::new();

        for message in ctx.group_messages(group).take(limit) {
            let text = message.text.trim();
            if !text.is_empty() && !self.document.is_placeholder(text) {
                parts.push(text);
            }
            if self.document.include_link_metadata {
                if let Some(link) = &message.link {
                    parts.extend(link.text_parts());
                }
            }
        }

        parts.join(" ")
    }

    /// Vectorize the documents at `eligible`; every other slot stays `None`.
    fn vectorize(&self, documents: &[String], eligible: &[usize]) -> Vec<Option<SparseVector>> {
        let corpus: Vec<&str> = eligible.iter().map(|&i| documents[i].as_str()).collect();
        let (vectorizer, fitted) = TfIdfVectorizer::fit_transform(&corpus, self.vectorizer_options());
        debug!(
            documents = corpus.len(),
            vocabulary = vectorizer.vocabulary_size(),
            "Fitted group vectors"
        );

        let mut vectors: Vec<Option<SparseVector>> = vec![None; documents.len()];
        for (&index, vector) in eligible.iter().zip(fitted) {
            vectors[index] = Some(vector);
        }
        vectors
    }
}

impl GroupStage for SimilarityMerger {
    fn kind(&self) -> StageKind {
        StageKind::Semantic
    }

    #[instrument(skip_all, fields(groups = groups.len(), threshold = self.threshold))]
    fn transform(
        &self,
        ctx: &ClusterContext<'_>,
        groups: Vec<Group>,
        stats: &mut ClusterStats,
    ) -> Vec<Group> {
        if groups.len() <= 1 {
            return groups;
        }

        let documents: Vec<String> = groups.iter().map(|g| self.group_document(ctx, g)).collect();
        let eligible: Vec<usize> = documents
            .iter()
            .enumerate()
            .filter(|(_, doc)| !doc.trim().is_empty())
            .map(|(i, _)| i)
            .collect();
        stats.ineligible_documents += documents.len() - eligible.len();

        if eligible.len() < 2 {
            debug!(eligible = eligible.len(), "Too few documents to compare");
            return groups;
        }

        let vectors = self.vectorize(&documents, &eligible);

        let mut sets = DisjointSet::new(groups.len());
        for (i, j, score) in pairwise_similarities(&vectors) {
            if score > self.threshold {
                stats.similarity_edges += 1;
                sets.union(i, j);
                debug!(left = i, right = j, score, "Similar groups linked");
            }
        }

        merge_components(groups, &mut sets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_types::{LinkInfo, Message};

    fn config_with(threshold: f32) -> ClusteringConfig {
        ClusteringConfig {
            semantic_threshold: threshold,
            ..Default::default()
        }
    }

    /// One group per message.
    fn singleton_groups(messages: &[Message]) -> Vec<Group> {
        messages
            .iter()
            .enumerate()
            .map(|(i, m)| Group::new(i, m.timestamp))
            .collect()
    }

    fn merge(messages: &[Message], threshold: f32) -> (Vec<Vec<usize>>, ClusterStats) {
        let config = config_with(threshold);
        let ctx = ClusterContext::new(messages.iter().collect());
        let mut stats = ClusterStats::default();
        let merged =
            SimilarityMerger::new(&config).transform(&ctx, singleton_groups(messages), &mut stats);
        (merged.iter().map(|g| g.members().to_vec()).collect(), stats)
    }

    fn sample_messages() -> Vec<Message> {
        vec![
            Message::new("a", 0, "u1", "A", "tokio runtime panics under load"),
            Message::new("b", 1_000, "u2", "B", "weekend hiking trip photos"),
            Message::new("c", 2_000, "u3", "C", "tokio runtime panics again under load"),
            Message::new("d", 3_000, "u4", "D", "[图片]"),
        ]
    }

    #[test]
    fn test_similar_groups_merge() {
        let (groups, stats) = merge(&sample_messages(), 0.3);
        assert_eq!(groups, vec![vec![0, 2], vec![1], vec![3]]);
        assert_eq!(stats.similarity_edges, 1);
    }

    #[test]
    fn test_placeholder_group_is_ineligible() {
        let (_, stats) = merge(&sample_messages(), 0.3);
        assert_eq!(stats.ineligible_documents, 1);
    }

    #[test]
    fn test_threshold_one_never_merges() {
        let (groups, _) = merge(&sample_messages(), 1.0);
        assert_eq!(groups.len(), 4);
    }

    #[test]
    fn test_single_group_untouched() {
        let messages = vec![Message::new("a", 0, "u1", "A", "anything")];
        let (groups, stats) = merge(&messages, 0.0);
        assert_eq!(groups, vec![vec![0]]);
        assert_eq!(stats, ClusterStats::default());
    }

    #[test]
    fn test_single_linkage_is_transitive() {
        let messages = vec![
            Message::new("a", 0, "u1", "A", "alpha beta gamma"),
            Message::new("b", 1, "u2", "B", "gamma delta epsilon"),
            Message::new("c", 2, "u3", "C", "epsilon zeta theta"),
            Message::new("d", 3, "u4", "D", "unrelated pasta recipe"),
        ];
        let (groups, _) = merge(&messages, 0.05);
        assert_eq!(groups, vec![vec![0, 1, 2], vec![3]]);
    }

    #[test]
    fn test_group_document_includes_link_metadata() {
        let messages = vec![
            Message::new("a", 0, "u1", "A", "  check this  ").with_link(LinkInfo::new(
                "Async Rust book",
                Some("Chapter on executors".to_string()),
            )),
            Message::new("b", 1, "u2", "B", "[视频]"),
        ];
        let config = ClusteringConfig::default();
        let ctx = ClusterContext::new(messages.iter().collect());
        let mut group = Group::new(0, 0);
        group.push(1, 1);

        let doc = SimilarityMerger::new(&config).group_document(&ctx, &group);
        assert_eq!(doc, "check this Async Rust book Chapter on executors");
    }

    #[test]
    fn test_group_document_respects_message_limit() {
        let messages = vec![
            Message::new("a", 0, "u1", "A", "first"),
            Message::new("b", 1, "u2", "B", "second"),
        ];
        let mut config = ClusteringConfig::default();
        config.document.max_messages_per_group = Some(1);
        let ctx = ClusterContext::new(messages.iter().collect());
        let mut group = Group::new(0, 0);
        group.push(1, 1);

        let doc = SimilarityMerger::new(&config).group_document(&ctx, &group);
        assert_eq!(doc, "first");
    }

    #[test]
    fn test_scores_repeatable() {
        let first = merge(&sample_messages(), 0.3);
        let second = merge(&sample_messages(), 0.3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_lone_text_document_not_counted_ineligible() {
        let messages = vec![
            Message::new("a", 0, "u1", "A", "release notes draft"),
            Message::new("b", 1_000, "u2", "B", "[图片]"),
            Message::new("c", 2_000, "u3", "C", "   "),
        ];
        let (groups, stats) = merge(&messages, 0.0);

        assert_eq!(groups, vec![vec![0], vec![1], vec![2]]);
        assert_eq!(stats.ineligible_documents, 2);
        assert_eq!(stats.similarity_edges, 0);
    }

    #[test]
    fn test_identical_documents_do_not_merge_at_threshold_one() {
        for text in [
            "deploy pipeline failing on staging again today",
            "rust borrow checker lifetimes async await futures pinning executors",
            "周末去爬山吗 好啊 一起吃饭",
        ] {
            let messages = vec![
                Message::new("a", 0, "u1", "A", text),
                Message::new("b", 10_000, "u2", "B", text),
            ];
            let (groups, stats) = merge(&messages, 1.0);

            assert_eq!(groups, vec![vec![0], vec![1]], "merged at 1.0: {text}");
            assert_eq!(stats.similarity_edges, 0);

            let (groups, _) = merge(&messages, 0.99);
            assert_eq!(groups, vec![vec![0, 1]], "did not merge below 1.0: {text}");
        }
    }
}
