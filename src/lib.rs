//! # waggle - Hive Actor Runtime
//!
//! A message-routing scheduler for cooperative actors. A [`Hive`] owns a
//! registry of actors and a FIFO queue of directive-bearing messages; each
//! message is delivered to the handler its recipient registered for that
//! directive. Handlers may suspend awaiting a reply, in which case the rest
//! of the work is parked as a continuation and resumed when the reply
//! arrives.
//!
//! Hives compose: messages addressed to an actor on another hive are handed
//! to the *ambassador* registered for that hive, which relays them over a
//! transport to a peer hive and feeds replies back, transparently to the
//! sender (see [`bridge`]).
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use serde_json::json;
//! use waggle::prelude::*;
//!
//! struct Assistant {
//!     ctx: ActorContext<Self>,
//! }
//!
//! impl Assistant {
//!     fn new(mut ctx: ActorContext<Self>) -> Self {
//!         ctx.route("run_errand", Self::run_errand);
//!         Self { ctx }
//!     }
//!
//!     fn run_errand(&mut self, msg: &mut MessageEnvelope) -> HandlerResult<Self> {
//!         msg.reply(json!({ "did_your_grunt_work": true }))?;
//!         Ok(Flow::Done)
//!     }
//! }
//!
//! impl Actor for Assistant {
//!     fn context(&self) -> &ActorContext<Self> {
//!         &self.ctx
//!     }
//!     fn context_mut(&mut self) -> &mut ActorContext<Self> {
//!         &mut self.ctx
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), HiveError> {
//!     let mut hive = Hive::new();
//!     let assistant = hive.create_actor(Assistant::new)?;
//!     hive.send(
//!         MessageBuilder::new(assistant, "run_errand").with_wants_reply(true),
//!     )?;
//!     hive.run().await;
//!     Ok(())
//! }
//! ```
//!
//! # Model
//!
//! - **Directive routing**: a message names the operation it requests; the
//!   recipient's routing table maps directive names to handler functions.
//! - **Cooperative continuations**: a handler that needs an answer sends a
//!   `wants_reply` message, returns [`Flow::wait_on`] with the new message
//!   ID, and is resumed with the reply. [`ActorContext::wait_on_self`]
//!   turns the same machinery into a cheap reschedule primitive.
//! - **Auto-reply**: when a `wants_reply` message would otherwise go
//!   unanswered, the runtime emits an empty `reply` on the actor's behalf,
//!   so request/reply protocols never hang on a forgetful handler.
//! - **One dispatch path**: the hive registers *itself* as an actor under
//!   the reserved local ID `hive` and handles its structural directives
//!   (`create_actor`, `register_ambassador`, `unregister_ambassador`)
//!   through the ordinary routing table.
//!
//! # Concurrency
//!
//! A hive processes its queue on one task; only one handler executes at a
//! time within a hive and an actor never runs concurrently with itself.
//! Handlers are synchronous between suspension points. External async work
//! goes through [`Flow::await_future`], which delivers the future's output
//! back into the queue as a `future_reply` message.
//!
//! # Module Organization
//!
//! - [`actor`] - Actor trait, per-actor context, continuation machinery
//! - [`message`] - Message envelope, wire codec, reserved directives
//! - [`hive`] - Hive scheduler, handle, and hive-as-an-actor
//! - [`bridge`] - Ambassadors, transports, and peer hives
//! - [`util`] - Actor, hive, and message ID types

pub mod actor;
pub mod bridge;
pub mod hive;
pub mod message;
pub mod prelude;
pub mod util;

// Re-export commonly used types
pub use actor::{Actor, ActorContext, ActorError, BodyExt, Flow, Handler, HandlerResult};
pub use bridge::{Ambassador, BridgeError, Endpoint, FrameSink, FrameSource};
pub use hive::{Hive, HiveActor, HiveError, HiveHandle, HiveState, HIVE_LOCAL_ID};
pub use message::{directives, MessageBuilder, MessageEnvelope, WireMessage};
pub use util::{ActorId, HiveId, MessageId};
