//! Message envelopes, the wire codec, and reserved directive names
//!
//! A message asks one actor to perform a *directive* on behalf of another.
//! [`MessageEnvelope`] carries the routing fields together with the reply
//! bookkeeping the runtime maintains; [`WireMessage`] is the stable
//! projection of the routing fields used when a message crosses a hive
//! boundary.

pub mod directives;
pub mod envelope;
pub mod wire;

pub use envelope::{MessageBuilder, MessageEnvelope};
pub use wire::WireMessage;
