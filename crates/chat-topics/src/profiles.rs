//! Per-sender activity aggregation.

use std::collections::HashMap;

use chat_types::{Message, Topic, UserProfile};
use tracing::debug;

/// Aggregate sender activity over a batch and its topics.
///
/// Profiles come out in first-appearance order of senders in `messages`;
/// the display name is taken from a sender's first message. Senders that
/// appear only in topics are ignored.
pub fn build_profiles(messages: &[Message], topics: &[Topic]) -> Vec<UserProfile> {
    let mut index_of: HashMap<&str, usize> = HashMap::new();
    let mut profiles: Vec<UserProfile> = Vec::new();

    for message in messages {
        let index = *index_of
            .entry(message.sender_id.as_str())
            .or_insert_with(|| {
                profiles.push(UserProfile::new(&message.sender_id, &message.sender_name));
                profiles.len() - 1
            });
        profiles[index].message_count += 1;
    }

    for topic in topics {
        if let Some(&index) = index_of.get(topic.initiator.as_str()) {
            profiles[index].topics_initiated += 1;
        }
        for participant in &topic.participants {
            if let Some(&index) = index_of.get(participant.as_str()) {
                profiles[index].topics_participated += 1;
            }
        }
    }

    debug!(profiles = profiles.len(), "Built user profiles");
    profiles
}
