//! Handler control flow: run to completion, or suspend awaiting a reply.

// Layer 1: Standard library imports
use std::future::Future;

// Layer 2: Third-party crate imports
use futures::future::BoxFuture;
use serde_json::Value;

// Layer 3: Internal module imports
use super::error::ActorError;
use crate::message::MessageEnvelope;
use crate::util::MessageId;

/// A directive handler: one invocation per delivered message.
///
/// Plain function pointers keep the routing table `Copy`-cheap and let
/// method references like `Self::run_errand` register directly.
pub type Handler<A> = fn(&mut A, &mut MessageEnvelope) -> HandlerResult<A>;

/// The rest of a suspended handler, resumed with the reply it awaited.
pub type Continuation<A> =
    Box<dyn FnOnce(&mut A, &mut MessageEnvelope) -> HandlerResult<A> + Send>;

/// What a handler (or resumed continuation) produces.
pub type HandlerResult<A> = Result<Flow<A>, ActorError>;

/// Where a handler goes after one step.
///
/// A handler that suspends at N points is an N-state machine: each
/// [`Flow::wait_on`] call site is one state, keyed in the actor's waiting
/// table by the message ID it awaits.
pub enum Flow<A> {
    /// The handler is finished with this message.
    Done,
    /// Park `then` until the reply to message `on` is delivered.
    Wait {
        /// ID of the `wants_reply` message just sent.
        on: MessageId,
        /// Continuation resumed with the reply envelope.
        then: Continuation<A>,
    },
    /// Park `then` until an external future completes; its output comes
    /// back as the body of a `future_reply` envelope.
    Await {
        /// The future to drive off-loop.
        future: BoxFuture<'static, Value>,
        /// Continuation resumed with the `future_reply` envelope.
        then: Continuation<A>,
    },
}

impl<A> Flow<A> {
    /// Suspend until the reply to `on` arrives, then run `then`.
    pub fn wait_on<F>(on: MessageId, then: F) -> Self
    where
        F: FnOnce(&mut A, &mut MessageEnvelope) -> HandlerResult<A> + Send + 'static,
    {
        Flow::Wait {
            on,
            then: Box::new(then),
        }
    }

    /// Suspend until `future` completes, then run `then` with its output
    /// delivered as a `future_reply` message body.
    pub fn await_future<Fut, F>(future: Fut, then: F) -> Self
    where
        Fut: Future<Output = Value> + Send + 'static,
        F: FnOnce(&mut A, &mut MessageEnvelope) -> HandlerResult<A> + Send + 'static,
    {
        Flow::Await {
            future: Box::pin(future),
            then: Box::new(then),
        }
    }
}
