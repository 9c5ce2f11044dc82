//! Hive-level error types.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::util::ActorId;

/// Failures of hive operations.
#[derive(Debug, Error)]
pub enum HiveError {
    /// The hive's dispatch loop is gone; nothing can be enqueued or
    /// registered any more.
    #[error("hive is stopped")]
    Stopped,

    /// An actor with this local ID already exists.
    #[error("actor id already registered: {0}")]
    DuplicateActor(String),

    /// The local ID `hive` names the hive itself and cannot be taken.
    #[error("local id `hive` is reserved for the hive itself")]
    ReservedLocalId,

    /// No actor with this ID is registered.
    #[error("actor not found: {0}")]
    ActorNotFound(ActorId),

    /// No factory was registered under this actor type name.
    #[error("unknown actor type: {0}")]
    UnknownActorType(String),

    /// No ambassador is registered for this remote hive.
    #[error("no ambassador registered for hive {0}")]
    UnknownAmbassador(String),

    /// The requester does not match the registered ambassador.
    #[error("{actor} is not the ambassador for hive {hive}")]
    AmbassadorMismatch {
        /// The actor that asked to withdraw the registration.
        actor: ActorId,
        /// The remote hive in question.
        hive: String,
    },

    /// A reply was requested of a message that has no sender.
    #[error("message has no sender to reply to")]
    NoSender,

    /// `reply` was called on an envelope no hive has delivered.
    #[error("message was not dispatched by a hive")]
    Undispatched,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(HiveError::Stopped.to_string(), "hive is stopped");
        assert!(HiveError::DuplicateActor("worker".to_owned())
            .to_string()
            .contains("worker"));
        assert!(HiveError::ActorNotFound(ActorId::from("ghost@h"))
            .to_string()
            .contains("ghost@h"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HiveError>();
    }
}
