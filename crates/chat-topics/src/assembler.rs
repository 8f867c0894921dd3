//! Quality filter and topic assembly.

use chat_types::Topic;
use sha2::{Digest, Sha256};
use tracing::{debug, trace};

use crate::context::ClusterContext;
use crate::group::Group;

/// Hex characters kept from the member-id digest.
const TOPIC_ID_LEN: usize = 16;

/// Deterministic topic id from member message ids.
///
/// SHA-256 over the lexicographically sorted ids, each terminated by a NUL so
/// `["ab","c"]` and `["a","bc"]` hash differently.
pub fn topic_id_for<S: AsRef<str>>(message_ids: &[S]) -> String {
    let mut sorted: Vec<&str> = message_ids.iter().map(AsRef::as_ref).collect();
    sorted.sort_unstable();

    let mut hasher = Sha256::new();
    for id in sorted {
        hasher.update(id.as_bytes());
        hasher.update([0u8]);
    }
    let digest = format!("{:x}", hasher.finalize());
    digest[..TOPIC_ID_LEN].to_string()
}

/// Drops undersized groups and turns the rest into topics.
#[derive(Debug, Clone, Copy)]
pub struct TopicAssembler {
    min_messages: usize,
}

impl TopicAssembler {
    pub fn new(min_messages: usize) -> Self {
        Self { min_messages }
    }

    /// Assemble topics ordered by start time.
    ///
    /// Returns the topics and the number of groups dropped by the filter.
    pub fn assemble(&self, ctx: &ClusterContext<'_>, groups: Vec<Group>) -> (Vec<Topic>, usize) {
        let mut dropped = 0usize;
        let mut kept: Vec<(usize, Topic)> = Vec::with_capacity(groups.len());

        for group in groups {
            if group.member_count() < self.min_messages {
                dropped += 1;
                trace!(
                    members = group.member_count(),
                    start_time = group.start_time(),
                    "Dropping undersized group"
                );
                continue;
            }
            kept.push((group.first_position(), self.build_topic(ctx, &group)));
        }

        // Start time first, then earliest member position for equal starts
        kept.sort_by_key(|(position, topic)| (topic.start_time, *position));

        debug!(topics = kept.len(), dropped, "Assembled topics");
        (kept.into_iter().map(|(_, topic)| topic).collect(), dropped)
    }

    fn build_topic(&self, ctx: &ClusterContext<'_>, group: &Group) -> Topic {
        let mut message_ids = Vec::with_capacity(group.member_count());
        let mut participants: Vec<String> = Vec::new();

        for message in ctx.group_messages(group) {
            message_ids.push(message.id.clone());
            if !participants.contains(&message.sender_id) {
                participants.push(message.sender_id.clone());
            }
        }

        let initiator = ctx.message(group.first_position()).sender_id.clone();

        Topic {
            topic_id: topic_id_for(&message_ids),
            message_count: message_ids.len(),
            message_ids,
            participants,
            initiator,
            start_time: group.start_time(),
            end_time: group.end_time(),
            title: None,
            conclusion: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_types::Message;

    fn group_of(positions: &[usize], messages: &[Message]) -> Group {
        let mut iter = positions.iter();
        let &first = iter.next().unwrap();
        let mut group = Group::new(first, messages[first].timestamp);
        for &p in iter {
            group.push(p, messages[p].timestamp);
        }
        group
    }

    fn sample() -> Vec<Message> {
        vec![
            Message::new("m1", 100, "u1", "Alice", "hi"),
            Message::new("m2", 110, "u2", "Bob", "hello"),
            Message::new("m3", 120, "u1", "Alice", "how are you"),
            Message::new("m4", 900, "u3", "Carol", "anyone?"),
        ]
    }

    #[test]
    fn test_topic_id_is_order_independent() {
        assert_eq!(topic_id_for(&["b", "a", "c"]), topic_id_for(&["c", "b", "a"]));
        assert_eq!(topic_id_for(&["a"]).len(), TOPIC_ID_LEN);
    }

    #[test]
    fn test_topic_id_separates_boundaries() {
        assert_ne!(topic_id_for(&["ab", "c"]), topic_id_for(&["a", "bc"]));
    }

    #[test]
    fn test_assemble_builds_topic_fields() {
        let messages = sample();
        let ctx = ClusterContext::new(messages.iter().collect());

        let (topics, dropped) =
            TopicAssembler::new(2).assemble(&ctx, vec![group_of(&[0, 1, 2], &messages)]);

        assert_eq!(dropped, 0);
        let topic = &topics[0];
        assert_eq!(topic.message_ids, vec!["m1", "m2", "m3"]);
        assert_eq!(topic.participants, vec!["u1", "u2"]);
        assert_eq!(topic.initiator, "u1");
        assert_eq!(topic.start_time, 100);
        assert_eq!(topic.end_time, 120);
        assert_eq!(topic.message_count, 3);
        assert_eq!(topic.topic_id, topic_id_for(&["m1", "m2", "m3"]));
        assert!(topic.title.is_none());
        assert!(topic.conclusion.is_none());
    }

    #[test]
    fn test_quality_filter_boundary() {
        let messages = sample();
        let ctx = ClusterContext::new(messages.iter().collect());
        let groups = vec![group_of(&[0, 1], &messages), group_of(&[3], &messages)];

        let (topics, dropped) = TopicAssembler::new(2).assemble(&ctx, groups);

        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].message_count, 2);
        assert_eq!(dropped, 1);
    }

    #[test]
    fn test_topics_sorted_by_start_time() {
        let messages = sample();
        let ctx = ClusterContext::new(messages.iter().collect());
        // Reply merging can emit a later group before an earlier one
        let groups = vec![group_of(&[2, 3], &messages), group_of(&[0, 1], &messages)];

        let (topics, _) = TopicAssembler::new(2).assemble(&ctx, groups);

        let starts: Vec<i64> = topics.iter().map(|t| t.start_time).collect();
        assert_eq!(starts, vec![100, 120]);
    }
}
