//! Prelude module for convenient imports.
//!
//! Re-exports the types most actor implementations need:
//!
//! ```rust
//! use waggle::prelude::*;
//! ```

// Core actor machinery
pub use crate::actor::{Actor, ActorContext, ActorError, BodyExt, Flow, HandlerResult};

// Messaging
pub use crate::message::{directives, MessageBuilder, MessageEnvelope};

// Hive
pub use crate::hive::{Hive, HiveError, HiveHandle, HIVE_LOCAL_ID};

// Bridge
pub use crate::bridge::{local_peer_launcher, Ambassador};

// IDs
pub use crate::util::{ActorId, HiveId, MessageId};
