//! Time-window segmentation.
//!
//! Splits a timestamp-sorted message list into contiguous groups. A message
//! starts a new group when its timestamp minus the *first* timestamp of the
//! current group exceeds the window. The anchor is the group start, not the
//! previous message, so one long burst cannot stretch a group indefinitely.

use chat_types::Message;
use tracing::{debug, trace};

use crate::group::Group;

/// Builder that turns a stream of messages into window groups.
pub struct GroupBuilder {
    /// Window in native timestamp units
    window: i64,
    /// Group being built
    current: Option<Group>,
    /// Timestamp of the current group's first message
    anchor: i64,
}

impl GroupBuilder {
    /// Create a builder with a window in native timestamp units.
    pub fn new(window: i64) -> Self {
        Self {
            window,
            current: None,
            anchor: 0,
        }
    }

    /// Add the message at `position` with `timestamp`.
    ///
    /// Returns the completed group if this message crossed the window.
    pub fn add_message(&mut self, position: usize, timestamp: i64) -> Option<Group> {
        trace!(position, timestamp, "Processing message");

        let Some(group) = self.current.as_mut() else {
            self.start_group(position, timestamp);
            return None;
        };

        let offset = timestamp.saturating_sub(self.anchor);
        if offset <= self.window {
            group.push(position, timestamp);
            return None;
        }

        debug!(offset, window = self.window, "Window boundary detected");
        let completed = self.current.take();
        self.start_group(position, timestamp);
        completed
    }

    fn start_group(&mut self, position: usize, timestamp: i64) {
        self.anchor = timestamp;
        self.current = Some(Group::new(position, timestamp));
    }

    /// Flush the group in progress.
    ///
    /// Call this when processing is complete to get any remaining messages.
    pub fn flush(&mut self) -> Option<Group> {
        self.current.take()
    }
}

/// Segment timestamp-sorted messages into window groups.
///
/// Every message lands in exactly one group; groups come out in time order.
pub fn segment_messages(messages: &[&Message], window: i64) -> Vec<Group> {
    let mut builder = GroupBuilder::new(window);
    let mut groups = Vec::new();

    for (position, message) in messages.iter().enumerate() {
        if let Some(group) = builder.add_message(position, message.timestamp) {
            groups.push(group);
        }
    }

    if let Some(group) = builder.flush() {
        groups.push(group);
    }

    debug!(
        messages = messages.len(),
        groups = groups.len(),
        window,
        "Segmented messages"
    );
    groups
}
