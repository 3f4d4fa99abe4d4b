//! Error types for queue management

use queueboard_core::CoreError;
use thiserror::Error;

/// Queue and registry errors
///
/// Every variant is a recoverable condition handed back to the caller. A
/// broken shuffle permutation is not represented here: that is a defect in
/// the queue itself and trips a debug assertion instead.
#[derive(Debug, Error)]
pub enum QueueError {
    /// No queue matches the given id or title
    #[error("Queue not found: {0}")]
    NotFound(String),

    /// Index outside the queue's current bounds
    #[error("Index {index} out of range for queue of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Activation requested while the board holds no queues
    #[error("No queues available")]
    NoQueuesAvailable,

    /// The player cannot accept (or no longer holds) a binding
    #[error("Player unavailable: {0}")]
    PlayerUnavailable(String),

    /// The operation raced with a change that invalidated its target
    #[error("Concurrent modification: {0}")]
    ConcurrentModification(String),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persistence errors
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for queue operations
pub type Result<T> = std::result::Result<T, QueueError>;
