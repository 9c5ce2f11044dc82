//! Stable wire projection of a message envelope.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use serde_json::Value;

// Layer 3: Internal module imports
use crate::util::{ActorId, MessageId};

/// The seven routing fields of a message, in transport form.
///
/// This is what crosses a hive boundary: runtime bookkeeping (`replied`,
/// `deferred_reply`, the hive back-reference) never leaves the hive that
/// owns it. `in_reply_to` is omitted entirely when the message answers
/// nothing.
///
/// # Example
/// ```rust
/// use waggle::message::WireMessage;
///
/// let frame = r#"{"to":"a@h","directive":"ping","from_id":null,
///                 "id":"t:0","body":null,"wants_reply":false}"#;
/// let wire = WireMessage::from_json(frame).unwrap();
/// assert_eq!(wire.directive, "ping");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    /// Fully-qualified recipient.
    pub to: ActorId,
    /// Operation requested of the recipient.
    pub directive: String,
    /// Fully-qualified sender, or `None` for runtime-produced messages.
    #[serde(default)]
    pub from_id: Option<ActorId>,
    /// Unique ID assigned by the originating hive.
    pub id: MessageId,
    /// ID of the message this one answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to: Option<MessageId>,
    /// Arbitrary payload; must survive the transport codec.
    #[serde(default)]
    pub body: Value,
    /// Whether the recipient owes the sender exactly one reply.
    #[serde(default)]
    pub wants_reply: bool,
}

impl WireMessage {
    /// Encode as a single JSON frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode from a JSON frame.
    pub fn from_json(frame: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(frame)
    }
}
