//! Clustering error types.

use thiserror::Error;

/// Errors that can occur during a clustering run.
///
/// Any of these is fatal to the run: no partial topics are produced.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// No messages were supplied
    #[error("No messages to cluster")]
    EmptyInput,

    /// Input is not timestamp-ascending and sorting is disabled
    #[error("Messages out of order at index {index}: timestamp {current} follows {previous}")]
    UnsortedInput {
        /// Position of the first out-of-order message
        index: usize,
        /// Timestamp of the preceding message
        previous: i64,
        /// Timestamp of the offending message
        current: i64,
    },

    /// Two messages share an id
    #[error("Duplicate message id: {0}")]
    DuplicateMessageId(String),

    /// Malformed message
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Labeling failed
    #[error("Labeling error: {0}")]
    Labeling(String),
}
