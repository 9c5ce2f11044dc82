//! The hive: actor registry, message queue, and dispatch loop
//!
//! A hive owns a set of actors and a FIFO queue of envelopes. It routes each
//! envelope to a local actor or, for recipients on another hive, to the
//! ambassador registered for that hive. The hive is itself an actor,
//! reachable under the reserved local ID [`HIVE_LOCAL_ID`].

pub mod errors;
pub mod handle;
pub mod hive_actor;
pub mod scheduler;
pub mod state;

pub use errors::HiveError;
pub use handle::HiveHandle;
pub use hive_actor::HiveActor;
pub use scheduler::{Hive, HiveState};
pub use state::HIVE_LOCAL_ID;
