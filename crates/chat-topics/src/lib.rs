//! # chat-topics
//!
//! Topic clustering for chat message batches.
//!
//! Turns a timestamp-ordered stream of messages into topics: coherent
//! conversational units with participants, an initiator and a time range.
//!
//! ## Pipeline
//! 1. Density estimation picks a time window (dense chat, short window)
//! 2. Window segmentation splits the stream into contiguous groups
//! 3. Reply-chain linking merges groups connected by quoted replies
//! 4. Similarity merging joins groups whose TF-IDF vectors are close
//! 5. Assembly drops undersized groups and emits topics by start time
//!
//! Steps 3 and 4 are optional; a disabled step passes groups through.
//! Labeling and sender profiles run on the finished topics.
//!
//! ## Usage
//!
//! ```rust
//! use chat_topics::{ClusteringConfig, TopicClusterer};
//! use chat_types::Message;
//!
//! let messages = vec![
//!     Message::new("m1", 0, "u1", "Alice", "lunch?"),
//!     Message::new("m2", 20, "u2", "Bob", "sure"),
//! ];
//! let clusterer = TopicClusterer::new(ClusteringConfig::default()).unwrap();
//! let topics = clusterer.cluster(&messages).unwrap();
//! assert_eq!(topics.len(), 1);
//! assert_eq!(topics[0].initiator, "u1");
//! ```

pub mod assembler;
pub mod config;
pub mod context;
pub mod density;
pub mod error;
pub mod group;
pub mod labeling;
pub mod pipeline;
pub mod profiles;
pub mod reply_chain;
pub mod segmenter;
pub mod semantic;
pub mod similarity;
pub mod stage;
pub mod tfidf;

pub use assembler::{topic_id_for, TopicAssembler};
pub use config::{
    AdaptiveWindowConfig, ClusteringConfig, DensityTier, DocumentConfig, LabelingConfig,
    UnsortedPolicy,
};
pub use context::ClusterContext;
pub use density::DensityEstimator;
pub use error::ClusterError;
pub use group::{merge_components, DisjointSet, Group};
pub use labeling::{apply_labels, KeywordLabeler, TopicLabel, TopicLabeler};
pub use pipeline::{ClusterStats, TopicClusterer};
pub use profiles::build_profiles;
pub use reply_chain::ReplyChainLinker;
pub use segmenter::{segment_messages, GroupBuilder};
pub use semantic::SimilarityMerger;
pub use similarity::{cosine_similarity, pairwise_similarities, SparseVector};
pub use stage::{GroupStage, IdentityStage, StageKind};
pub use tfidf::{tokenize, TfIdf, TfIdfVectorizer, TokenizerOptions, VectorizerOptions};
