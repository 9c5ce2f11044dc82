//! The hive handle: the capability actors (and tasks) use to reach a hive.

// Layer 1: Standard library imports
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

// Layer 2: Third-party crate imports
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;

// Layer 3: Internal module imports
use super::errors::HiveError;
use super::state::{HiveInner, HIVE_LOCAL_ID};
use crate::actor::{Actor, ActorContext};
use crate::util::{random_token, ActorId, HiveId, MessageId};

/// A cheap, clonable capability onto one hive.
///
/// Handles enqueue messages, mint message IDs, and perform structural
/// operations (create/remove actors, register actor types). They hold the
/// hive's state weakly: once the [`crate::hive::Hive`] itself is dropped,
/// structural operations fail with [`HiveError::Stopped`] while the hive ID
/// and ID generator keep working.
///
/// Every message sent through a handle has its `to` and `from_id` qualified
/// with this hive's ID when they are bare local IDs.
#[derive(Clone)]
pub struct HiveHandle {
    hive_id: HiveId,
    message_token: Arc<str>,
    counter: Arc<AtomicU64>,
    tx: UnboundedSender<crate::message::MessageEnvelope>,
    state: Weak<HiveInner>,
}

impl HiveHandle {
    pub(crate) fn new(
        hive_id: HiveId,
        tx: UnboundedSender<crate::message::MessageEnvelope>,
        state: Weak<HiveInner>,
    ) -> Self {
        Self {
            hive_id,
            message_token: Arc::from(random_token()),
            counter: Arc::new(AtomicU64::new(0)),
            tx,
            state,
        }
    }

    /// The ID of the hive this handle reaches.
    pub fn hive_id(&self) -> &HiveId {
        &self.hive_id
    }

    /// The qualified ID of the hive's own actor (`hive@<hive_id>`).
    pub fn hive_actor_id(&self) -> ActorId {
        ActorId::join(HIVE_LOCAL_ID, &self.hive_id)
    }

    /// Mint a fresh message ID, unique for this hive's lifetime.
    pub fn gen_message_id(&self) -> MessageId {
        MessageId::compose(&self.message_token, self.counter.fetch_add(1, Ordering::Relaxed))
    }

    /// Assemble an envelope without enqueueing it.
    pub(crate) fn make_envelope(
        &self,
        mut msg: crate::message::MessageBuilder,
    ) -> crate::message::MessageEnvelope {
        let id = msg.id.take().unwrap_or_else(|| self.gen_message_id());
        msg.to = msg.to.qualify(&self.hive_id);
        msg.from_id = msg.from_id.map(|from| from.qualify(&self.hive_id));
        crate::message::MessageEnvelope::assemble(msg, id)
    }

    /// Enqueue a message for dispatch, returning its ID.
    pub fn send(&self, msg: crate::message::MessageBuilder) -> Result<MessageId, HiveError> {
        let env = self.make_envelope(msg);
        let id = env.id().clone();
        self.tx.send(env).map_err(|_| HiveError::Stopped)?;
        Ok(id)
    }

    /// Fire-and-forget convenience without a sender.
    pub fn send_message(
        &self,
        to: ActorId,
        directive: &str,
        body: Value,
    ) -> Result<MessageId, HiveError> {
        self.send(crate::message::MessageBuilder::new(to, directive).with_body(body))
    }

    /// Create an actor under a random local ID.
    ///
    /// The build closure receives the actor's [`ActorContext`] and returns
    /// the actor, typically registering its directive handlers on the way.
    pub fn create_actor<A, F>(&self, build: F) -> Result<ActorId, HiveError>
    where
        A: Actor,
        F: FnOnce(ActorContext<A>) -> A,
    {
        self.create_actor_with_id(&random_token(), build)
    }

    /// Create an actor under a caller-chosen local ID.
    pub fn create_actor_with_id<A, F>(&self, local_id: &str, build: F) -> Result<ActorId, HiveError>
    where
        A: Actor,
        F: FnOnce(ActorContext<A>) -> A,
    {
        let state = self.state.upgrade().ok_or(HiveError::Stopped)?;
        // accept qualified ids the way remove_actor does
        let local_id = ActorId::new(local_id).local_part().to_owned();
        if local_id == HIVE_LOCAL_ID {
            return Err(HiveError::ReservedLocalId);
        }

        let id = ActorId::join(&local_id, &self.hive_id);
        let actor = build(ActorContext::new(id.clone(), self.clone()));
        state.insert_actor(local_id, Box::new(actor))?;
        Ok(id)
    }

    /// Remove an actor by local or qualified ID.
    pub fn remove_actor(&self, id: &ActorId) -> Result<(), HiveError> {
        self.state
            .upgrade()
            .ok_or(HiveError::Stopped)?
            .remove_actor(id)
    }

    /// Register a named factory so remote hives can request construction of
    /// this actor type through the `create_actor` directive.
    pub fn register_actor_type<A, F>(&self, name: &str, build: F) -> Result<(), HiveError>
    where
        A: Actor,
        F: Fn(ActorContext<A>, &Value) -> A + Send + Sync + 'static,
    {
        let state = self.state.upgrade().ok_or(HiveError::Stopped)?;
        let factory: super::state::ActorFactory = Box::new(move |handle, args| {
            handle.create_actor(|ctx| build(ctx, args))
        });
        state.factories.insert(name.to_owned(), factory);
        Ok(())
    }

    /// Instantiate a registered actor type by name.
    pub(crate) fn spawn_registered(&self, name: &str, args: &Value) -> Result<ActorId, HiveError> {
        let state = self.state.upgrade().ok_or(HiveError::Stopped)?;
        let factory = state
            .factories
            .get(name)
            .ok_or_else(|| HiveError::UnknownActorType(name.to_owned()))?;
        (factory.value())(self, args)
    }

    /// Record `ambassador` as the relay for messages to `remote_hive`.
    pub(crate) fn insert_ambassador(
        &self,
        remote_hive: &str,
        ambassador: ActorId,
    ) -> Result<(), HiveError> {
        let state = self.state.upgrade().ok_or(HiveError::Stopped)?;
        state
            .ambassadors
            .insert(remote_hive.to_owned(), ambassador);
        Ok(())
    }

    /// Withdraw an ambassador registration; only the registered ambassador
    /// itself may do so.
    pub(crate) fn remove_ambassador(
        &self,
        remote_hive: &str,
        requester: &ActorId,
    ) -> Result<(), HiveError> {
        let state = self.state.upgrade().ok_or(HiveError::Stopped)?;
        let registered = state
            .ambassadors
            .get(remote_hive)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| HiveError::UnknownAmbassador(remote_hive.to_owned()))?;
        if &registered != requester {
            return Err(HiveError::AmbassadorMismatch {
                actor: requester.clone(),
                hive: remote_hive.to_owned(),
            });
        }
        state.ambassadors.remove(remote_hive);
        Ok(())
    }

    /// The ambassador registered for a remote hive, if any.
    pub fn ambassador_for(&self, remote_hive: &str) -> Option<ActorId> {
        self.state
            .upgrade()?
            .ambassadors
            .get(remote_hive)
            .map(|entry| entry.value().clone())
    }

    /// Ask the hive's dispatch loop to stop.
    pub fn send_shutdown(&self) {
        if let Some(state) = self.state.upgrade() {
            state.request_stop();
        }
    }
}

impl fmt::Debug for HiveHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HiveHandle({})", self.hive_id)
    }
}
