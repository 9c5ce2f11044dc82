//! Bridge and transport error types.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::actor::ActorError;

/// Failures of the inter-hive transport layer.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The other end of the transport is gone.
    #[error("transport closed")]
    Closed,

    /// A frame could not be encoded or decoded.
    #[error("frame codec failed: {0}")]
    Codec(#[from] serde_json::Error),

    /// The peer could not be launched.
    #[error("failed to launch peer hive: {0}")]
    Launch(String),
}

impl From<BridgeError> for ActorError {
    fn from(err: BridgeError) -> Self {
        ActorError::other(err.to_string())
    }
}
