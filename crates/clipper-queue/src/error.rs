//! Error types for the term queue.

use thiserror::Error;

/// Errors raised by term stores.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Could not reach the store
    #[error("term store connection error: {0}")]
    Connection(String),

    /// A store command failed
    #[error("term store command failed: {0}")]
    Command(String),
}

/// Result type for queue operations.
pub type Result<T> = std::result::Result<T, QueueError>;
