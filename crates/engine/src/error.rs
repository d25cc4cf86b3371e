//! Error types for the simulation core.

use thiserror::Error;

/// Errors from stockpile retrieval.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// Pop was called on an empty queue. Callers are expected to check
    /// `is_empty` first; this is a caller error, never a default value.
    #[error("pop from an empty package queue")]
    Empty,
}
