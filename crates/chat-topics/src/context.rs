//! Per-run clustering context.

use chat_types::Message;

use crate::group::Group;

/// Read-only state shared by every stage of one clustering run.
///
/// Holds the run's messages in timestamp order; group members are positions
/// into this list.
pub struct ClusterContext<'a> {
    messages: Vec<&'a Message>,
}

impl<'a> ClusterContext<'a> {
    /// Create a context over timestamp-sorted messages.
    pub fn new(messages: Vec<&'a Message>) -> Self {
        Self { messages }
    }

    /// Message at `position` in timestamp order.
    pub fn message(&self, position: usize) -> &'a Message {
        self.messages[position]
    }

    pub fn messages(&self) -> &[&'a Message] {
        &self.messages
    }

    /// Members of `group` in timestamp order.
    pub fn group_messages<'g>(&'g self, group: &'g Group) -> impl Iterator<Item = &'a Message> + 'g {
        group.members().iter().map(move |&p| self.messages[p])
    }
}
