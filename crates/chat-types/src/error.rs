//! Error types for chat record handling.

use thiserror::Error;

/// Errors raised while encoding or decoding chat records.
#[derive(Debug, Error)]
pub enum TypesError {
    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
