use thiserror::Error;

use crate::types::RequesterId;

/// Errors that can occur during Capsort core operations.
///
/// A pattern that finds nothing is never an error: extractors return their
/// documented defaults instead. These variants cover misuse of the stateful
/// parts of the engine (sessions, prefix rotation) and collaborator failures.
#[derive(Debug, Error)]
pub enum CapsortError {
    /// A regex pattern failed to compile (should not happen with static patterns).
    #[error("regex compilation error: {0}")]
    RegexError(#[from] regex::Error),

    /// A file was ingested, or a session ended, without a prior begin.
    #[error("no active session for requester {requester}")]
    NoActiveSession {
        /// The requester that has no session.
        requester: RequesterId,
    },

    /// A session was ended before any file was ingested.
    #[error("session for requester {requester} ended with no files")]
    EmptySession {
        /// The requester whose session was empty.
        requester: RequesterId,
    },

    /// The prefix is already part of the rotation.
    #[error("prefix already exists: {0:?}")]
    DuplicatePrefix(String),

    /// A blank prefix was offered to the rotation.
    #[error("prefix is empty or whitespace-only")]
    EmptyPrefix,

    /// A 1-based prefix index outside `1..=len`.
    #[error("invalid prefix index {index}, valid range is 1 to {len}")]
    InvalidPrefixIndex {
        /// The index that was requested.
        index: usize,
        /// Number of prefixes at the time of the request.
        len: usize,
    },

    /// The storage collaborator reported a failure.
    #[error("episode store error: {0}")]
    Store(String),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for Capsort operations.
pub type Result<T> = std::result::Result<T, CapsortError>;
