//! Per-actor state: identity, hive access, routing, and waiting tables.

// Layer 1: Standard library imports
use std::collections::HashMap;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use serde_json::Value;

// Layer 3: Internal module imports
use super::flow::{Continuation, Handler};
use crate::hive::{HiveError, HiveHandle};
use crate::message::{directives, MessageBuilder};
use crate::util::{ActorId, HiveId, MessageId};

/// The runtime state every actor owns.
///
/// Holds the actor's qualified ID, its handle to the owning hive, the
/// directive routing table, and the continuations suspended on replies.
/// Constructed by the hive and handed to the actor's build closure; the
/// actor stores it and exposes it through [`crate::actor::Actor`].
///
/// All messaging conveniences stamp the owning actor as `from_id` unless
/// the caller supplied a sender explicitly.
pub struct ActorContext<A> {
    id: ActorId,
    local_id: String,
    hive: HiveHandle,
    created_at: DateTime<Utc>,
    pub(crate) routing: HashMap<&'static str, Handler<A>>,
    pub(crate) waiting: HashMap<MessageId, Continuation<A>>,
}

impl<A> ActorContext<A> {
    /// Create a context for an actor about to be registered.
    pub(crate) fn new(id: ActorId, hive: HiveHandle) -> Self {
        let local_id = id.local_part().to_owned();
        Self {
            id,
            local_id,
            hive,
            created_at: Utc::now(),
            routing: HashMap::new(),
            waiting: HashMap::new(),
        }
    }

    /// The actor's fully-qualified ID.
    pub fn id(&self) -> &ActorId {
        &self.id
    }

    /// The actor's ID within its hive.
    pub fn local_id(&self) -> &str {
        &self.local_id
    }

    /// The handle to the owning hive.
    pub fn hive(&self) -> &HiveHandle {
        &self.hive
    }

    /// The owning hive's ID.
    pub fn hive_id(&self) -> &HiveId {
        self.hive.hive_id()
    }

    /// When this actor was constructed.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Register a handler for a directive.
    ///
    /// Later registrations win, which is how a hive extended for bridging
    /// overrides nothing but gains new directives.
    pub fn route(&mut self, directive: &'static str, handler: Handler<A>) {
        self.routing.insert(directive, handler);
    }

    /// Number of continuations currently suspended on replies.
    pub fn waiting_count(&self) -> usize {
        self.waiting.len()
    }

    /// Send a message, stamping this actor as the sender when the builder
    /// has none.
    pub fn send(&self, msg: MessageBuilder) -> Result<MessageId, HiveError> {
        let msg = if msg.from_id.is_none() {
            msg.with_from(self.id.clone())
        } else {
            msg
        };
        self.hive.send(msg)
    }

    /// Fire-and-forget convenience.
    pub fn send_message(
        &self,
        to: ActorId,
        directive: &str,
        body: Value,
    ) -> Result<MessageId, HiveError> {
        self.send(MessageBuilder::new(to, directive).with_body(body))
    }

    /// Send a message the caller intends to suspend on.
    ///
    /// Returns the new message ID; yielding it through
    /// [`crate::actor::Flow::wait_on`] parks the handler until the reply
    /// arrives.
    pub fn wait_on_message(
        &self,
        to: ActorId,
        directive: &str,
        body: Value,
    ) -> Result<MessageId, HiveError> {
        self.send(
            MessageBuilder::new(to, directive)
                .with_body(body)
                .with_wants_reply(true),
        )
    }

    /// Schedule this actor to run again on the next pass through the queue.
    ///
    /// The message is its own reply (`in_reply_to == id`), so no auto-reply
    /// fires and the returned ID resumes the continuation that waits on it.
    /// A cheap way to drive loops without hogging the hive.
    pub fn wait_on_self(&self) -> Result<MessageId, HiveError> {
        let id = self.hive.gen_message_id();
        self.hive.send(
            MessageBuilder::new(self.id.clone(), directives::SELF_REPLY)
                .with_from(self.id.clone())
                .with_id(id.clone())
                .with_in_reply_to(id.clone()),
        )?;
        Ok(id)
    }
}
