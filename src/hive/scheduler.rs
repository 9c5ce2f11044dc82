//! The hive itself: registry owner, queue owner, and dispatch loop.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use serde_json::{json, Value};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tracing::{debug, error, warn};

// Layer 3: Internal module imports
use super::errors::HiveError;
use super::handle::HiveHandle;
use super::hive_actor::HiveActor;
use super::state::{HiveInner, HIVE_LOCAL_ID};
use crate::actor::{Actor, ActorContext};
use crate::message::{directives, MessageBuilder, MessageEnvelope};
use crate::util::{ActorId, HiveId, MessageId};

/// Lifecycle of a hive's dispatch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HiveState {
    /// Created, loop not yet entered.
    New,
    /// The dispatch loop is processing messages.
    Running,
    /// Stop requested; draining messages already queued.
    Stopping,
    /// The loop has exited.
    Stopped,
}

/// A single-threaded cooperative scheduler for a set of actors.
///
/// Messages are dispatched strictly in FIFO order; only one handler runs at
/// a time, so an actor never races itself. Parallelism comes from running
/// several hives and bridging them with ambassadors.
///
/// # Example
/// ```rust,ignore
/// let mut hive = Hive::new();
/// let overseer = hive.create_actor_with_id("overseer", Overseer::new)?;
/// hive.send_message(overseer, "init_world", Value::Null)?;
/// hive.run().await;
/// ```
pub struct Hive {
    state: Arc<HiveInner>,
    handle: HiveHandle,
    queue: UnboundedReceiver<MessageEnvelope>,
    lifecycle: HiveState,
}

impl Hive {
    /// Create a hive with a fresh random ID.
    pub fn new() -> Self {
        Self::with_id(HiveId::generate())
    }

    /// Create a hive with a caller-chosen ID (bridge peers are told theirs).
    pub fn with_id(hive_id: HiveId) -> Self {
        let (tx, queue) = unbounded_channel();
        let state = Arc::new(HiveInner::new(hive_id.clone()));
        let handle = HiveHandle::new(hive_id, tx, Arc::downgrade(&state));

        // The hive is an actor too, reachable under the reserved local id.
        let hive_actor = HiveActor::new(ActorContext::new(
            handle.hive_actor_id(),
            handle.clone(),
        ));
        state
            .actors
            .lock()
            .insert(HIVE_LOCAL_ID.to_owned(), Box::new(hive_actor));

        Self {
            state,
            handle,
            queue,
            lifecycle: HiveState::New,
        }
    }

    /// This hive's ID.
    pub fn hive_id(&self) -> &HiveId {
        self.handle.hive_id()
    }

    /// A fresh handle onto this hive.
    pub fn handle(&self) -> HiveHandle {
        self.handle.clone()
    }

    /// Where the dispatch loop currently is in its lifecycle.
    pub fn lifecycle(&self) -> HiveState {
        self.lifecycle
    }

    /// Number of messages currently queued.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// See [`HiveHandle::create_actor`].
    pub fn create_actor<A, F>(&self, build: F) -> Result<ActorId, HiveError>
    where
        A: Actor,
        F: FnOnce(ActorContext<A>) -> A,
    {
        self.handle.create_actor(build)
    }

    /// See [`HiveHandle::create_actor_with_id`].
    pub fn create_actor_with_id<A, F>(&self, local_id: &str, build: F) -> Result<ActorId, HiveError>
    where
        A: Actor,
        F: FnOnce(ActorContext<A>) -> A,
    {
        self.handle.create_actor_with_id(local_id, build)
    }

    /// See [`HiveHandle::remove_actor`].
    pub fn remove_actor(&self, id: &ActorId) -> Result<(), HiveError> {
        self.handle.remove_actor(id)
    }

    /// See [`HiveHandle::register_actor_type`].
    pub fn register_actor_type<A, F>(&self, name: &str, build: F) -> Result<(), HiveError>
    where
        A: Actor,
        F: Fn(ActorContext<A>, &Value) -> A + Send + Sync + 'static,
    {
        self.handle.register_actor_type(name, build)
    }

    /// See [`HiveHandle::send`].
    pub fn send(&self, msg: MessageBuilder) -> Result<MessageId, HiveError> {
        self.handle.send(msg)
    }

    /// See [`HiveHandle::send_message`].
    pub fn send_message(
        &self,
        to: ActorId,
        directive: &str,
        body: Value,
    ) -> Result<MessageId, HiveError> {
        self.handle.send_message(to, directive, body)
    }

    /// Ask the dispatch loop to stop.
    pub fn send_shutdown(&self) {
        self.handle.send_shutdown();
    }

    /// Run the dispatch loop until shutdown is requested.
    ///
    /// SIGINT and SIGTERM request shutdown too. Once stopping, messages
    /// already queued (and anything they synchronously produce) are still
    /// dispatched, so in-flight acknowledgements depart before the loop
    /// ends; nothing new can arrive afterwards.
    pub async fn run(&mut self) {
        self.lifecycle = HiveState::Running;
        debug!(hive = %self.state.hive_id, "hive running");

        let signal_handle = self.handle.clone();
        let signals = tokio::spawn(async move {
            wait_for_termination().await;
            signal_handle.send_shutdown();
        });

        loop {
            if self.state.stop_requested() {
                break;
            }
            tokio::select! {
                _ = self.state.stop_signal.notified() => {}
                maybe = self.queue.recv() => match maybe {
                    Some(env) => self.dispatch(env),
                    None => break,
                },
            }
        }

        self.lifecycle = HiveState::Stopping;
        while let Ok(env) = self.queue.try_recv() {
            self.dispatch(env);
        }

        signals.abort();
        self.lifecycle = HiveState::Stopped;
        debug!(hive = %self.state.hive_id, "hive stopped");
    }

    /// Route one envelope: locally, through an ambassador, or to the floor.
    fn dispatch(&mut self, env: MessageEnvelope) {
        let (local, hive_part) = {
            let (local, hive) = env.to.split();
            (local.to_owned(), hive.map(str::to_owned))
        };

        match hive_part {
            Some(hive) if hive == self.state.hive_id.as_str() => {
                self.deliver_local(&local, env);
            }
            Some(hive) => self.forward_remote(&hive, env),
            None => {
                // send() qualifies everything, so only hand-built envelopes
                // can end up here
                warn!(to = %env.to, "dropping message with unqualified recipient");
                self.not_found(&env);
            }
        }
    }

    /// Deliver to a local actor, or handle its absence.
    fn deliver_local(&mut self, local: &str, mut env: MessageEnvelope) {
        let Some(mut actor) = self.state.take_actor(local) else {
            self.not_found(&env);
            return;
        };

        env.attach_hive(self.handle.clone());
        debug!(id = %env.id(), directive = %env.directive, to = %env.to, "dispatching");

        self.state.begin_delivery(local);
        actor.deliver(&mut env);
        if self.state.finish_delivery() {
            debug!(actor = %env.to, "actor removed itself during handling");
        } else {
            self.state.restore_actor(local.to_owned(), actor);
        }
    }

    /// Repackage a message for another hive and hand it to the ambassador
    /// registered for that hive, through the same local delivery path.
    fn forward_remote(&mut self, remote_hive: &str, env: MessageEnvelope) {
        let ambassador = self
            .state
            .ambassadors
            .get(remote_hive)
            .map(|entry| entry.value().clone());
        let Some(ambassador) = ambassador else {
            self.not_found(&env);
            return;
        };

        let inner = match serde_json::to_value(env.to_wire()) {
            Ok(inner) => inner,
            Err(err) => {
                error!(id = %env.id(), %err, "failed to encode message for forwarding");
                return;
            }
        };

        let wrapped = self.handle.make_envelope(
            MessageBuilder::new(ambassador.clone(), directives::FORWARD_MESSAGE)
                .with_from(self.handle.hive_actor_id())
                .with_body(inner),
        );
        self.deliver_local(&ambassador.local_part().to_owned(), wrapped);
    }

    /// Routing failure: drop the message, and tell the sender if (and only
    /// if) it asked for a reply and is not the missing recipient itself.
    fn not_found(&self, env: &MessageEnvelope) {
        warn!(
            to = %env.to,
            directive = %env.directive,
            "no route for message; dropping"
        );

        if !env.wants_reply {
            return;
        }
        let Some(from) = &env.from_id else { return };
        if from == &env.to {
            return;
        }

        // goes through the normal queue, so a remote sender receives this
        // through the ambassador path like any other reply
        if let Err(err) = self.handle.send(
            MessageBuilder::new(from.clone(), directives::ERROR_NO_SUCH_ACTOR)
                .with_in_reply_to(env.id().clone())
                .with_body(json!({ "to": env.to })),
        ) {
            warn!(%err, "could not notify sender of routing failure");
        }
    }

    /// Typed access to a registered actor, for inspection.
    ///
    /// Fails while the actor is handling a message (it is out of the
    /// registry for the duration) or when `A` is not its concrete type.
    pub fn with_actor<A, R>(
        &self,
        id: &ActorId,
        inspect: impl FnOnce(&mut A) -> R,
    ) -> Result<R, HiveError>
    where
        A: Actor,
    {
        let mut actors = self.state.actors.lock();
        let slot = actors
            .get_mut(id.local_part())
            .ok_or_else(|| HiveError::ActorNotFound(id.clone()))?;
        let actor = slot
            .as_any_mut()
            .downcast_mut::<A>()
            .ok_or_else(|| HiveError::ActorNotFound(id.clone()))?;
        Ok(inspect(actor))
    }

    /// Access the hive's own actor, for bridge installation.
    pub(crate) fn with_hive_actor<R>(
        &self,
        update: impl FnOnce(&mut HiveActor) -> R,
    ) -> Result<R, HiveError> {
        self.with_actor(&self.handle.hive_actor_id(), update)
    }
}

impl Default for Hive {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for SIGINT or, on Unix, SIGTERM.
async fn wait_for_termination() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
