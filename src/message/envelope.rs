//! Message envelope with routing fields and reply bookkeeping.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use serde_json::Value;

// Layer 3: Internal module imports
use super::directives;
use super::wire::WireMessage;
use crate::hive::{HiveError, HiveHandle};
use crate::util::{ActorId, MessageId};

/// Parameters of an outgoing message.
///
/// `to` and `directive` are mandatory and fixed at construction; everything
/// else defaults to the fire-and-forget case and can be adjusted through the
/// builder methods before the message is handed to a hive.
///
/// # Example
/// ```rust,ignore
/// let id = hive.send(
///     MessageBuilder::new(worker, "run_errand")
///         .with_body(json!({ "priority": "low" }))
///         .with_wants_reply(true),
/// )?;
/// ```
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    pub(crate) to: ActorId,
    pub(crate) directive: String,
    pub(crate) from_id: Option<ActorId>,
    pub(crate) body: Value,
    pub(crate) in_reply_to: Option<MessageId>,
    pub(crate) id: Option<MessageId>,
    pub(crate) wants_reply: bool,
}

impl MessageBuilder {
    /// Start a message to `to` requesting `directive`.
    pub fn new(to: impl Into<ActorId>, directive: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            directive: directive.into(),
            from_id: None,
            body: Value::Null,
            in_reply_to: None,
            id: None,
            wants_reply: false,
        }
    }

    /// Builder method: set the sender.
    pub fn with_from(mut self, from_id: ActorId) -> Self {
        self.from_id = Some(from_id);
        self
    }

    /// Builder method: set the payload.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// Builder method: mark the message as an answer to `id`.
    pub fn with_in_reply_to(mut self, id: MessageId) -> Self {
        self.in_reply_to = Some(id);
        self
    }

    /// Builder method: use a caller-supplied message ID instead of a fresh
    /// one. Needed when re-injecting a message that already crossed a hive
    /// boundary.
    pub fn with_id(mut self, id: MessageId) -> Self {
        self.id = Some(id);
        self
    }

    /// Builder method: oblige the recipient to produce exactly one reply.
    pub fn with_wants_reply(mut self, wants_reply: bool) -> Self {
        self.wants_reply = wants_reply;
        self
    }
}

impl From<WireMessage> for MessageBuilder {
    /// Rebuild the exact message a peer hive sent, ID included.
    fn from(wire: WireMessage) -> Self {
        Self {
            to: wire.to,
            directive: wire.directive,
            from_id: wire.from_id,
            body: wire.body,
            in_reply_to: wire.in_reply_to,
            id: Some(wire.id),
            wants_reply: wire.wants_reply,
        }
    }
}

/// A message in flight.
///
/// The routing fields are fixed once the originating hive assembles the
/// envelope. The bookkeeping flags (`replied`, `deferred_reply`) only ever
/// move from `false` to `true`, and the hive back-reference is attached at
/// dispatch time so handlers can answer through [`MessageEnvelope::reply`].
///
/// Equality compares the routing fields only, so an envelope survives a trip
/// through [`WireMessage`] unchanged even though the bookkeeping resets.
#[derive(Debug, Clone)]
pub struct MessageEnvelope {
    /// Fully-qualified recipient.
    pub to: ActorId,
    /// Fully-qualified sender, or `None` for runtime-produced messages.
    pub from_id: Option<ActorId>,
    /// Operation requested of the recipient.
    pub directive: String,
    /// ID of the message this one answers.
    pub in_reply_to: Option<MessageId>,
    /// Arbitrary payload.
    pub body: Value,
    /// Whether the recipient owes the sender exactly one reply.
    pub wants_reply: bool,
    id: MessageId,
    replied: bool,
    deferred_reply: bool,
    hive: Option<HiveHandle>,
    sent_at: DateTime<Utc>,
}

impl MessageEnvelope {
    /// Assemble an envelope from builder parameters and an assigned ID.
    ///
    /// Callers are expected to have qualified `to` and `from_id` already.
    pub(crate) fn assemble(msg: MessageBuilder, id: MessageId) -> Self {
        Self {
            to: msg.to,
            from_id: msg.from_id,
            directive: msg.directive,
            in_reply_to: msg.in_reply_to,
            body: msg.body,
            wants_reply: msg.wants_reply,
            id,
            replied: false,
            deferred_reply: false,
            hive: None,
            sent_at: Utc::now(),
        }
    }

    /// Reconstruct an envelope received from another hive.
    ///
    /// Bookkeeping starts over: the receiving hive owes its own reply.
    pub fn from_wire(wire: WireMessage) -> Self {
        Self::assemble(MessageBuilder::from(wire.clone()), wire.id)
    }

    /// Project the routing fields into transport form.
    pub fn to_wire(&self) -> WireMessage {
        WireMessage {
            to: self.to.clone(),
            directive: self.directive.clone(),
            from_id: self.from_id.clone(),
            id: self.id.clone(),
            in_reply_to: self.in_reply_to.clone(),
            body: self.body.clone(),
            wants_reply: self.wants_reply,
        }
    }

    /// The unique ID assigned by the originating hive.
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    /// When this envelope was assembled.
    pub fn sent_at(&self) -> DateTime<Utc> {
        self.sent_at
    }

    /// Whether a reply has already been emitted for this envelope.
    pub fn replied(&self) -> bool {
        self.replied
    }

    /// Whether the handler promised to reply later on its own.
    pub fn deferred_reply(&self) -> bool {
        self.deferred_reply
    }

    /// True while the sender is still owed a reply nobody has produced or
    /// promised.
    pub fn needs_reply(&self) -> bool {
        self.wants_reply && !self.deferred_reply && !self.replied
    }

    /// Declare that a reply will be sent later, suppressing the auto-reply.
    pub fn defer_reply(&mut self) {
        self.deferred_reply = true;
    }

    /// Answer the sender with an empty-directive `reply`.
    ///
    /// Fails with [`HiveError::NoSender`] when the message was produced by
    /// the runtime itself, and with [`HiveError::Undispatched`] when called
    /// on an envelope no hive has delivered.
    pub fn reply(&mut self, body: Value) -> Result<MessageId, HiveError> {
        self.reply_with(directives::REPLY, body, false)
    }

    /// Answer the sender with an arbitrary directive.
    pub fn reply_with(
        &mut self,
        directive: &str,
        body: Value,
        wants_reply: bool,
    ) -> Result<MessageId, HiveError> {
        let hive = self.hive.as_ref().ok_or(HiveError::Undispatched)?;
        let to = self.from_id.clone().ok_or(HiveError::NoSender)?;

        let id = hive.send(
            MessageBuilder::new(to, directive)
                .with_from(self.to.clone())
                .with_in_reply_to(self.id.clone())
                .with_body(body)
                .with_wants_reply(wants_reply),
        )?;
        self.replied = true;
        Ok(id)
    }

    /// Attach the receiving hive so `reply` can originate new messages.
    pub(crate) fn attach_hive(&mut self, hive: HiveHandle) {
        self.hive = Some(hive);
    }
}

impl PartialEq for MessageEnvelope {
    fn eq(&self, other: &Self) -> bool {
        self.to == other.to
            && self.from_id == other.from_id
            && self.directive == other.directive
            && self.id == other.id
            && self.in_reply_to == other.in_reply_to
            && self.body == other.body
            && self.wants_reply == other.wants_reply
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> MessageEnvelope {
        MessageEnvelope::assemble(
            MessageBuilder::new("to@h", "catch_ball")
                .with_from(ActorId::from("from@h"))
                .with_body(json!({ "ball_color": "green" }))
                .with_wants_reply(true),
            MessageId::from("t:0"),
        )
    }

    #[test]
    fn test_builder_defaults() {
        let msg = MessageBuilder::new("to@h", "ping");

        assert_eq!(msg.body, Value::Null);
        assert_eq!(msg.from_id, None);
        assert_eq!(msg.in_reply_to, None);
        assert_eq!(msg.id, None);
        assert!(!msg.wants_reply);
    }

    #[test]
    fn test_needs_reply_lifecycle() {
        let mut env = sample();
        assert!(env.needs_reply());

        env.defer_reply();
        assert!(!env.needs_reply());
        assert!(env.deferred_reply());
        assert!(!env.replied());
    }

    #[test]
    fn test_needs_reply_false_without_wants_reply() {
        let env = MessageEnvelope::assemble(
            MessageBuilder::new("to@h", "ping"),
            MessageId::from("t:1"),
        );

        assert!(!env.needs_reply());
    }

    #[test]
    fn test_reply_without_dispatch_fails() {
        let mut env = sample();

        assert!(matches!(env.reply(Value::Null), Err(HiveError::Undispatched)));
        assert!(!env.replied());
    }

    #[test]
    fn test_wire_round_trip_preserves_routing_fields() {
        let env = sample();
        let rebuilt = MessageEnvelope::from_wire(env.to_wire());

        assert_eq!(rebuilt, env);
        assert!(!rebuilt.replied());
        assert!(!rebuilt.deferred_reply());
    }

    #[test]
    fn test_wire_round_trip_resets_bookkeeping() {
        let mut env = sample();
        env.defer_reply();

        let rebuilt = MessageEnvelope::from_wire(env.to_wire());
        assert!(!rebuilt.deferred_reply());
        assert_eq!(rebuilt, env);
    }
}
