//! Chat message type.
//!
//! Messages arrive already cleaned and link-annotated by the upstream stages.
//! Their content is opaque text to the clustering engine, except for the
//! optional link title/description.

use serde::{Deserialize, Serialize};

use crate::error::TypesError;

/// Metadata for a link shared in a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkInfo {
    /// Link title
    #[serde(default)]
    pub title: Option<String>,

    /// Link description
    #[serde(default)]
    pub description: Option<String>,

    /// Target URL
    #[serde(default)]
    pub url: Option<String>,
}

impl LinkInfo {
    /// Create link metadata with a title and optional description.
    pub fn new(title: impl Into<String>, description: Option<String>) -> Self {
        Self {
            title: Some(title.into()),
            description,
            url: None,
        }
    }

    /// Title and description, skipping absent or blank parts.
    pub fn text_parts(&self) -> impl Iterator<Item = &str> {
        self.title
            .iter()
            .chain(self.description.iter())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

/// A chat message.
///
/// Messages are immutable inputs to clustering. `timestamp` is an integer in
/// seconds or milliseconds; the unit is fixed for one clustering run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique, non-empty identifier
    pub id: String,

    /// Source timestamp
    pub timestamp: i64,

    /// Sender identifier
    pub sender_id: String,

    /// Sender display name
    pub sender_name: String,

    /// Message text (may be empty)
    #[serde(default)]
    pub text: String,

    /// Id of the message this one replies to
    #[serde(default)]
    pub quoted_id: Option<String>,

    /// Shared link metadata, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<LinkInfo>,
}

impl Message {
    /// Create a new message without quote or link.
    pub fn new(
        id: impl Into<String>,
        timestamp: i64,
        sender_id: impl Into<String>,
        sender_name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            timestamp,
            sender_id: sender_id.into(),
            sender_name: sender_name.into(),
            text: text.into(),
            quoted_id: None,
            link: None,
        }
    }

    /// Mark this message as a reply to `quoted_id`
    pub fn with_quote(mut self, quoted_id: impl Into<String>) -> Self {
        self.quoted_id = Some(quoted_id.into());
        self
    }

    /// Attach link metadata
    pub fn with_link(mut self, link: LinkInfo) -> Self {
        self.link = Some(link);
        self
    }

    /// Quoted id, ignoring self-references.
    pub fn reply_target(&self) -> Option<&str> {
        self.quoted_id
            .as_deref()
            .filter(|quoted| !quoted.is_empty() && *quoted != self.id)
    }

    /// Decode a JSON array of messages.
    pub fn batch_from_slice(bytes: &[u8]) -> Result<Vec<Self>, TypesError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_defaults_optional_fields() {
        let json = r#"{"id":"m1","timestamp":10,"sender_id":"u1","sender_name":"Alice"}"#;
        let msg = serde_json::from_str::<Message>(json).unwrap();

        assert_eq!(msg.id, "m1");
        assert!(msg.text.is_empty());
        assert!(msg.quoted_id.is_none());
        assert!(msg.link.is_none());
    }

    #[test]
    fn test_message_null_quote() {
        let json = r#"{"id":"m1","timestamp":10,"sender_id":"u1","sender_name":"A","text":"hi","quoted_id":null}"#;
        let msg = serde_json::from_str::<Message>(json).unwrap();
        assert!(msg.quoted_id.is_none());
    }

    #[test]
    fn test_reply_target_ignores_self_reference() {
        let msg = Message::new("m1", 0, "u1", "A", "hi").with_quote("m1");
        assert_eq!(msg.reply_target(), None);

        let reply = Message::new("m2", 5, "u2", "B", "yes").with_quote("m1");
        assert_eq!(reply.reply_target(), Some("m1"));
    }

    #[test]
    fn test_reply_target_ignores_empty_quote() {
        let msg = Message::new("m1", 0, "u1", "A", "hi").with_quote("");
        assert_eq!(msg.reply_target(), None);
    }

    #[test]
    fn test_link_text_parts_skip_blank() {
        let link = LinkInfo::new("Rust 2024", Some("   ".to_string()));
        let parts: Vec<&str> = link.text_parts().collect();
        assert_eq!(parts, vec!["Rust 2024"]);
    }

    #[test]
    fn test_batch_from_slice() {
        let json = r#"[
            {"id":"a","timestamp":1,"sender_id":"u1","sender_name":"A","text":"x"},
            {"id":"b","timestamp":2,"sender_id":"u2","sender_name":"B","text":"y","quoted_id":"a",
             "link":{"title":"Docs","description":null,"url":"https://example.com"}}
        ]"#;
        let batch = Message::batch_from_slice(json.as_bytes()).unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1].quoted_id.as_deref(), Some("a"));
        assert_eq!(
            batch[1].link.as_ref().and_then(|l| l.url.as_deref()),
            Some("https://example.com")
        );
    }

    #[test]
    fn test_batch_from_slice_rejects_object() {
        let err = Message::batch_from_slice(b"{}").unwrap_err();
        assert!(matches!(err, TypesError::Serialization(_)));
    }
}
