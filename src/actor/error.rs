//! Errors produced by message handlers.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::hive::HiveError;

/// A fault raised by a handler or a resumed continuation.
///
/// Handler faults never escape the dispatch loop; the hive logs them with
/// the envelope fingerprint and moves on to the next message.
#[derive(Debug, Error)]
pub enum ActorError {
    /// The message body was missing a field or carried the wrong type.
    #[error("malformed message body: {0}")]
    MalformedBody(String),

    /// A hive operation performed by the handler failed.
    #[error(transparent)]
    Hive(#[from] HiveError),

    /// Anything else the handler wants to report.
    #[error("{0}")]
    Other(String),
}

impl ActorError {
    /// Build an [`ActorError::Other`] from any displayable message.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
