//! Actors: directive routing, handlers, and suspended continuations
//!
//! An actor owns a table mapping directive names to handler functions and a
//! table of continuations suspended on the reply they await. Handlers run to
//! completion unless they return a [`Flow::Wait`], which parks the rest of
//! the work until the matching reply arrives.

pub mod body;
pub mod context;
pub mod error;
pub mod flow;
pub mod traits;

pub use body::BodyExt;
pub use context::ActorContext;
pub use error::ActorError;
pub use flow::{Continuation, Flow, Handler, HandlerResult};
pub use traits::Actor;

pub(crate) use traits::DynActor;
