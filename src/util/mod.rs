//! Utility types and helpers for the hive runtime

pub mod ids;

pub use ids::{random_token, ActorId, HiveId, MessageId};
