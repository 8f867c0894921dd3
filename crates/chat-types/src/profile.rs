//! Per-sender activity profile.

use serde::{Deserialize, Serialize};

/// Aggregated activity for one sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Sender identifier
    pub user_id: String,
    /// Display name from the sender's first message
    pub user_name: String,
    /// Messages sent in the batch
    pub message_count: usize,
    /// Topics this sender started
    pub topics_initiated: usize,
    /// Topics this sender took part in
    pub topics_participated: usize,
}

impl UserProfile {
    /// Create an empty profile for a sender.
    pub fn new(user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
            message_count: 0,
            topics_initiated: 0,
            topics_participated: 0,
        }
    }
}
