//! Topic type.
//!
//! A topic is one coherent conversation assembled from a clustered group of
//! messages. `title` and `conclusion` are left empty by clustering and filled
//! by a labeler afterwards.

use serde::{Deserialize, Serialize};

/// A coherent conversational unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Deterministic hash of the sorted member message ids
    pub topic_id: String,

    /// Member message ids, timestamp ascending
    pub message_ids: Vec<String>,

    /// Distinct sender ids in first-appearance order
    pub participants: Vec<String>,

    /// Sender id of the earliest message
    pub initiator: String,

    /// Timestamp of the earliest member
    pub start_time: i64,

    /// Timestamp of the latest member
    pub end_time: i64,

    /// Number of member messages
    pub message_count: usize,

    /// Human-readable title (filled externally)
    #[serde(default)]
    pub title: Option<String>,

    /// Short conclusion (filled externally)
    #[serde(default)]
    pub conclusion: Option<String>,
}
