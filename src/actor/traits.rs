//! The Actor trait and the canonical delivery algorithm.

// Layer 1: Standard library imports
use std::any::Any;

// Layer 2: Third-party crate imports
use serde_json::Value;
use tracing::{debug, error, warn};

// Layer 3: Internal module imports
use super::context::ActorContext;
use super::flow::{Flow, HandlerResult};
use crate::message::{directives, MessageBuilder, MessageEnvelope};

/// An entity with a unique ID, a directive table, and suspended
/// continuations.
///
/// Implementations embed the [`ActorContext`] the hive hands to their build
/// closure and register handlers on it; the runtime drives everything else.
///
/// # Example
/// ```rust,ignore
/// struct Assistant {
///     ctx: ActorContext<Self>,
/// }
///
/// impl Assistant {
///     fn new(mut ctx: ActorContext<Self>) -> Self {
///         ctx.route("run_errand", Self::run_errand);
///         Self { ctx }
///     }
///
///     fn run_errand(&mut self, msg: &mut MessageEnvelope) -> HandlerResult<Self> {
///         msg.reply(json!({ "did_your_grunt_work": true }))?;
///         Ok(Flow::Done)
///     }
/// }
///
/// impl Actor for Assistant {
///     fn context(&self) -> &ActorContext<Self> {
///         &self.ctx
///     }
///     fn context_mut(&mut self) -> &mut ActorContext<Self> {
///         &mut self.ctx
///     }
/// }
/// ```
pub trait Actor: Sized + Send + 'static {
    /// Shared access to the actor's runtime state.
    fn context(&self) -> &ActorContext<Self>;

    /// Exclusive access to the actor's runtime state.
    fn context_mut(&mut self) -> &mut ActorContext<Self>;
}

/// Object-safe shim the hive registry stores actors behind.
pub(crate) trait DynActor: Send {
    /// Run the delivery algorithm for one envelope.
    fn deliver(&mut self, env: &mut MessageEnvelope);

    /// Downcast support for typed access to registered actors.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<A: Actor> DynActor for A {
    /// Deliver one envelope to this actor.
    ///
    /// A reply resumes the continuation waiting on its `in_reply_to`; any
    /// other message (including a reply nobody awaits, which is how
    /// self-driven loops work) dispatches through the directive table. The
    /// produced flow is then folded back into the waiting table, and the
    /// auto-reply fires if the sender is still owed one.
    fn deliver(&mut self, env: &mut MessageEnvelope) {
        let outcome = resume_or_dispatch(self, env);
        if let Some(result) = outcome {
            advance(self, result, env);
        }

        if env.needs_reply() {
            if let Err(err) = env.reply(Value::Null) {
                warn!(id = %env.id(), %err, "auto-reply failed");
            }
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn resume_or_dispatch<A: Actor>(
    actor: &mut A,
    env: &mut MessageEnvelope,
) -> Option<HandlerResult<A>> {
    if let Some(in_reply_to) = env.in_reply_to.clone() {
        if let Some(continuation) = actor.context_mut().waiting.remove(&in_reply_to) {
            debug!(id = %env.id(), %in_reply_to, "resuming suspended handler");
            return Some(continuation(actor, env));
        }
    }

    match actor.context().routing.get(env.directive.as_str()).copied() {
        Some(handler) => Some(handler(actor, env)),
        None => {
            error!(
                directive = %env.directive,
                actor = %actor.context().id(),
                "unregistered directive"
            );
            debug!(id = %env.id(), body = %env.body, "unhandled message details");
            None
        }
    }
}

fn advance<A: Actor>(actor: &mut A, result: HandlerResult<A>, env: &MessageEnvelope) {
    match result {
        Ok(Flow::Done) => {}
        Ok(Flow::Wait { on, then }) => {
            // At most one continuation may wait on a message ID; IDs are
            // unique per hive lifetime, so a collision is a handler bug.
            if actor.context_mut().waiting.insert(on.clone(), then).is_some() {
                warn!(%on, "replaced a continuation already waiting on this message");
            }
        }
        Ok(Flow::Await { future, then }) => {
            let ctx = actor.context_mut();
            let wait_id = ctx.hive().gen_message_id();
            ctx.waiting.insert(wait_id.clone(), then);

            let handle = ctx.hive().clone();
            let to = ctx.id().clone();
            tokio::spawn(async move {
                let value = future.await;
                let _ = handle.send(
                    MessageBuilder::new(to.clone(), directives::FUTURE_REPLY)
                        .with_from(to)
                        .with_in_reply_to(wait_id)
                        .with_body(value),
                );
            });
        }
        Err(err) => {
            error!(
                id = %env.id(),
                directive = %env.directive,
                to = %env.to,
                %err,
                "handler failed"
            );
        }
    }
}
