//! # chat-types
//!
//! Shared domain types for the chat topic pipeline.
//!
//! This crate defines the records exchanged between pipeline stages:
//! - Messages: Immutable, already-cleaned chat messages (input)
//! - Topics: Coherent conversational units produced by clustering (output)
//! - Profiles: Per-sender activity aggregates
//!
//! ## Usage
//!
//! ```rust
//! use chat_types::Message;
//!
//! let msg = Message::new("m1", 1_700_000_000, "u1", "Alice", "hello");
//! assert!(msg.quoted_id.is_none());
//! ```

pub mod error;
pub mod message;
pub mod profile;
pub mod time;
pub mod topic;

pub use error::TypesError;
pub use message::{LinkInfo, Message};
pub use profile::UserProfile;
pub use time::TimestampUnit;
pub use topic::Topic;
