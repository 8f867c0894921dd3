//! Clustering pipeline driver.
//!
//! Runs one batch through validation, window sizing, segmentation, the
//! ordered group stages and topic assembly. The run is synchronous and either
//! yields every topic or fails as a whole.

use std::collections::HashSet;

use chat_types::{Message, Topic};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::assembler::TopicAssembler;
use crate::config::{ClusteringConfig, UnsortedPolicy};
use crate::context::ClusterContext;
use crate::density::DensityEstimator;
use crate::error::ClusterError;
use crate::reply_chain::ReplyChainLinker;
use crate::segmenter::segment_messages;
use crate::semantic::SimilarityMerger;
use crate::stage::{GroupStage, IdentityStage, StageKind};

/// Counters collected during one clustering run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClusterStats {
    /// Messages in the batch
    pub input_messages: usize,
    /// Window used by the segmenter, in seconds
    pub window_secs: i64,
    /// Groups produced by the segmenter
    pub initial_groups: usize,
    /// Groups after reply-chain linking
    pub after_reply_chain: usize,
    /// Groups after similarity merging
    pub after_semantic: usize,
    /// Groups removed by the quality filter
    pub dropped_groups: usize,
    /// Topics emitted
    pub topics: usize,
    /// Replies that crossed group boundaries
    pub reply_edges: usize,
    /// Replies whose target is not in the batch
    pub dangling_replies: usize,
    /// Group pairs above the similarity threshold
    pub similarity_edges: usize,
    /// Groups with no usable text
    pub ineligible_documents: usize,
}

/// Topic clustering engine.
///
/// Owns a validated configuration and the ordered stage list. Disabled steps
/// are present as `IdentityStage` so every run walks the same list.
pub struct TopicClusterer {
    config: ClusteringConfig,
    stages: Vec<Box<dyn GroupStage>>,
}

impl TopicClusterer {
    /// Create a clusterer, validating `config`.
    pub fn new(config: ClusteringConfig) -> Result<Self, ClusterError> {
        config.validate()?;

        let reply: Box<dyn GroupStage> = if config.enable_reply_chain {
            Box::new(ReplyChainLinker::new())
        } else {
            Box::new(IdentityStage::new(StageKind::ReplyChain))
        };
        let semantic: Box<dyn GroupStage> = if config.enable_semantic {
            Box::new(SimilarityMerger::new(&config))
        } else {
            Box::new(IdentityStage::new(StageKind::Semantic))
        };

        Ok(Self {
            config,
            stages: vec![reply, semantic],
        })
    }

    /// Cluster a batch of messages into topics ordered by start time.
    pub fn cluster(&self, messages: &[Message]) -> Result<Vec<Topic>, ClusterError> {
        self.cluster_with_stats(messages).map(|(topics, _)| topics)
    }

    /// Cluster a batch and return run counters alongside the topics.
    #[instrument(skip_all, fields(messages = messages.len()))]
    pub fn cluster_with_stats(
        &self,
        messages: &[Message],
    ) -> Result<(Vec<Topic>, ClusterStats), ClusterError> {
        let ordered = self.prepare(messages)?;
        let mut stats = ClusterStats {
            input_messages: ordered.len(),
            ..Default::default()
        };

        let window_secs = if self.config.enable_adaptive_window {
            DensityEstimator::new(&self.config).window_secs(&ordered)?
        } else {
            self.config.time_window
        };
        stats.window_secs = window_secs;

        let ctx = ClusterContext::new(ordered);
        let mut groups = segment_messages(ctx.messages(), self.config.native_window(window_secs));
        stats.initial_groups = groups.len();
        info!(
            window_secs,
            groups = groups.len(),
            "Segmented messages by time window"
        );

        for stage in &self.stages {
            let before = groups.len();
            groups = stage.transform(&ctx, groups, &mut stats);
            match stage.kind() {
                StageKind::ReplyChain => stats.after_reply_chain = groups.len(),
                StageKind::Semantic => stats.after_semantic = groups.len(),
            }
            info!(
                stage = %stage.kind(),
                active = stage.is_active(),
                before,
                after = groups.len(),
                "Stage complete"
            );
        }

        let (topics, dropped) = TopicAssembler::new(self.config.min_messages).assemble(&ctx, groups);
        stats.dropped_groups = dropped;
        stats.topics = topics.len();
        info!(
            topics = topics.len(),
            dropped_groups = dropped,
            "Clustering complete"
        );

        Ok((topics, stats))
    }

    /// Validate the batch and return it in timestamp order.
    fn prepare<'a>(&self, messages: &'a [Message]) -> Result<Vec<&'a Message>, ClusterError> {
        if messages.is_empty() {
            return Err(ClusterError::EmptyInput);
        }

        let mut seen: HashSet<&str> = HashSet::with_capacity(messages.len());
        for (index, message) in messages.iter().enumerate() {
            if message.id.is_empty() {
                return Err(ClusterError::InvalidMessage(format!(
                    "message at index {index} has an empty id"
                )));
            }
            if !seen.insert(message.id.as_str()) {
                return Err(ClusterError::DuplicateMessageId(message.id.clone()));
            }
        }

        let mut ordered: Vec<&Message> = messages.iter().collect();
        let disorder = ordered
            .windows(2)
            .position(|pair| pair[1].timestamp < pair[0].timestamp);

        if let Some(at) = disorder {
            let (previous, current) = (ordered[at].timestamp, ordered[at + 1].timestamp);
            match self.config.on_unsorted {
                UnsortedPolicy::Reject => {
                    return Err(ClusterError::UnsortedInput {
                        index: at + 1,
                        previous,
                        current,
                    });
                }
                UnsortedPolicy::Sort => {
                    warn!(
                        index = at + 1,
                        previous, current, "Input not timestamp-ordered, sorting"
                    );
                    ordered.sort_by_key(|m| m.timestamp);
                }
            }
        }

        debug!(messages = ordered.len(), "Validated batch");
        Ok(ordered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn burst() -> Vec<Message> {
        vec![
            Message::new("m1", 0, "A", "Alice", "lunch plans"),
            Message::new("m2", 30, "B", "Bob", "sure"),
            Message::new("m3", 60, "A", "Alice", "noodles?"),
            Message::new("m4", 90, "B", "Bob", "ok"),
            Message::new("m5", 120, "A", "Alice", "see you"),
        ]
    }

    fn config() -> ClusteringConfig {
        ClusteringConfig {
            enable_semantic: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_input_is_error() {
        let clusterer = TopicClusterer::new(config()).unwrap();
        assert!(matches!(
            clusterer.cluster(&[]),
            Err(ClusterError::EmptyInput)
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad = ClusteringConfig {
            semantic_threshold: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            TopicClusterer::new(bad),
            Err(ClusterError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_burst_forms_one_topic() {
        let clusterer = TopicClusterer::new(config()).unwrap();
        let (topics, stats) = clusterer.cluster_with_stats(&burst()).unwrap();

        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].message_count, 5);
        assert_eq!(topics[0].initiator, "A");
        assert_eq!(topics[0].participants, vec!["A", "B"]);
        assert_eq!(stats.input_messages, 5);
        assert_eq!(stats.initial_groups, 1);
        assert_eq!(stats.topics, 1);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut messages = burst();
        messages[3].id = "m1".to_string();
        let clusterer = TopicClusterer::new(config()).unwrap();

        match clusterer.cluster(&messages) {
            Err(ClusterError::DuplicateMessageId(id)) => assert_eq!(id, "m1"),
            other => panic!("expected duplicate id error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_id_rejected() {
        let mut messages = burst();
        messages[0].id.clear();
        let clusterer = TopicClusterer::new(config()).unwrap();
        assert!(matches!(
            clusterer.cluster(&messages),
            Err(ClusterError::InvalidMessage(_))
        ));
    }

    #[test]
    fn test_unsorted_rejected_under_reject_policy() {
        let mut messages = burst();
        messages.swap(1, 2);
        let clusterer = TopicClusterer::new(ClusteringConfig {
            on_unsorted: UnsortedPolicy::Reject,
            ..config()
        })
        .unwrap();

        match clusterer.cluster(&messages) {
            Err(ClusterError::UnsortedInput {
                index,
                previous,
                current,
            }) => {
                assert_eq!(index, 2);
                assert_eq!(previous, 60);
                assert_eq!(current, 30);
            }
            other => panic!("expected unsorted error, got {other:?}"),
        }
    }

    #[test]
    fn test_unsorted_sorted_under_default_policy() {
        let mut messages = burst();
        messages.reverse();
        let clusterer = TopicClusterer::new(config()).unwrap();
        let topics = clusterer.cluster(&messages).unwrap();

        assert_eq!(topics[0].message_ids, vec!["m1", "m2", "m3", "m4", "m5"]);
    }

    #[test]
    fn test_stable_sort_keeps_arrival_order_for_ties() {
        let messages = vec![
            Message::new("late", 50, "A", "Alice", "x"),
            Message::new("tie-1", 10, "B", "Bob", "y"),
            Message::new("tie-2", 10, "A", "Alice", "z"),
        ];
        let clusterer = TopicClusterer::new(config()).unwrap();
        let topics = clusterer.cluster(&messages).unwrap();

        assert_eq!(topics[0].message_ids, vec!["tie-1", "tie-2", "late"]);
        assert_eq!(topics[0].initiator, "B");
    }

    #[test]
    fn test_fixed_window_when_adaptive_disabled() {
        let clusterer = TopicClusterer::new(ClusteringConfig {
            enable_adaptive_window: false,
            time_window: 45,
            ..config()
        })
        .unwrap();
        let (_, stats) = clusterer.cluster_with_stats(&burst()).unwrap();

        assert_eq!(stats.window_secs, 45);
        assert_eq!(stats.initial_groups, 3);
    }

    #[test]
    fn test_disabled_stages_pass_groups_through() {
        let clusterer = TopicClusterer::new(ClusteringConfig {
            enable_reply_chain: false,
            enable_semantic: false,
            ..Default::default()
        })
        .unwrap();
        let (_, stats) = clusterer.cluster_with_stats(&burst()).unwrap();

        assert_eq!(stats.initial_groups, stats.after_reply_chain);
        assert_eq!(stats.after_reply_chain, stats.after_semantic);
        assert_eq!(stats.reply_edges, 0);
        assert_eq!(stats.similarity_edges, 0);
    }

    #[test]
    fn test_all_groups_dropped_is_empty_success() {
        let messages = vec![
            Message::new("a", 0, "A", "Alice", "x"),
            Message::new("b", 10_000, "B", "Bob", "y"),
        ];
        let clusterer = TopicClusterer::new(config()).unwrap();
        let (topics, stats) = clusterer.cluster_with_stats(&messages).unwrap();

        assert!(topics.is_empty());
        assert_eq!(stats.dropped_groups, 2);
    }

    /// Random chat stream with replies, some of them dangling.
    fn random_stream(seed: u64, len: usize) -> Vec<Message> {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        const WORDS: &[&str] = &[
            "deploy", "release", "lunch", "hiking", "bug", "tokio", "coffee", "weekend", "review",
            "[图片]", "周末", "爬山",
        ];

        let mut rng = StdRng::seed_from_u64(seed);
        let mut ts = 0i64;
        (0..len)
            .map(|i| {
                ts += rng.random_range(0..400);
                let text: Vec<&str> = (0..rng.random_range(0..4))
                    .map(|_| WORDS[rng.random_range(0..WORDS.len())])
                    .collect();
                let mut message = Message::new(
                    format!("m{i}"),
                    ts,
                    format!("u{}", rng.random_range(0..4)),
                    "name",
                    text.join(" "),
                );
                if i > 0 && rng.random_bool(0.2) {
                    message = message.with_quote(format!("m{}", rng.random_range(0..i + 3)));
                }
                message
            })
            .collect()
    }

    #[test]
    fn test_random_streams_keep_partition() {
        for seed in 0..20 {
            let messages = random_stream(seed, 60);
            let clusterer = TopicClusterer::new(ClusteringConfig::default()).unwrap();
            let (topics, stats) = clusterer.cluster_with_stats(&messages).unwrap();

            let mut seen = HashSet::new();
            for topic in &topics {
                assert!(topic.message_count >= 2);
                assert_eq!(topic.message_count, topic.message_ids.len());
                for id in &topic.message_ids {
                    assert!(seen.insert(id.clone()), "seed {seed}: {id} in two topics");
                }
            }
            assert!(stats.initial_groups >= stats.after_reply_chain);
            assert!(stats.after_reply_chain >= stats.after_semantic);
            assert_eq!(stats.after_semantic, stats.topics + stats.dropped_groups);
            assert!(topics.windows(2).all(|w| w[0].start_time <= w[1].start_time));
        }
    }

    #[test]
    fn test_random_streams_deterministic() {
        for seed in 0..10 {
            let messages = random_stream(seed, 40);
            let clusterer = TopicClusterer::new(ClusteringConfig::default()).unwrap();
            let first = serde_json::to_string(&clusterer.cluster(&messages).unwrap()).unwrap();
            let second = serde_json::to_string(&clusterer.cluster(&messages).unwrap()).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_raising_threshold_never_adds_merges() {
        for seed in 0..10 {
            let messages = random_stream(seed, 50);
            let mut previous = usize::MAX;
            for threshold in [0.0, 0.1, 0.3, 0.5, 0.8, 1.0] {
                let clusterer = TopicClusterer::new(ClusteringConfig {
                    semantic_threshold: threshold,
                    ..Default::default()
                })
                .unwrap();
                let (_, stats) = clusterer.cluster_with_stats(&messages).unwrap();
                let merges = stats.after_reply_chain - stats.after_semantic;
                assert!(merges <= previous, "seed {seed} threshold {threshold}");
                previous = merges;
            }
        }
    }

    #[test]
    fn test_millisecond_timestamps() {
        let messages: Vec<Message> = burst()
            .into_iter()
            .map(|mut m| {
                m.timestamp *= 1_000;
                m
            })
            .collect();
        let clusterer = TopicClusterer::new(ClusteringConfig {
            timestamp_unit: chat_types::TimestampUnit::Milliseconds,
            ..config()
        })
        .unwrap();
        let (topics, stats) = clusterer.cluster_with_stats(&messages).unwrap();

        assert_eq!(stats.window_secs, 600);
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].end_time, 120_000);
    }
}
