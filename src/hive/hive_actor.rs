//! The hive's own actor, registered under the reserved local ID.
//!
//! Reusing the ordinary delivery algorithm for the hive's structural
//! directives means there is exactly one dispatch path; anything addressed
//! to `hive@<hive_id>` goes through the same routing table as everything
//! else, including messages arriving from other hives.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use serde_json::{json, Value};

// Layer 3: Internal module imports
use crate::actor::{Actor, ActorContext, ActorError, BodyExt, Flow, HandlerResult};
use crate::bridge::FrameSink;
use crate::message::{directives, MessageEnvelope};

/// The actor face of a hive.
///
/// Handles `create_actor`, `register_ambassador`, and
/// `unregister_ambassador`. A hive acting as a bridge peer additionally
/// routes the bridge directives (`connect_back`, `forward_message`, the
/// two-step `remote_shutdown`) here; see [`crate::bridge`].
pub struct HiveActor {
    ctx: ActorContext<Self>,
    /// Outbound end of a bridge transport, when this hive is a peer
    /// endpoint relaying for its parent.
    pub(crate) forwarder: Option<Arc<dyn FrameSink>>,
}

impl HiveActor {
    pub(crate) fn new(mut ctx: ActorContext<Self>) -> Self {
        ctx.route(directives::CREATE_ACTOR, Self::create_actor);
        ctx.route(directives::REGISTER_AMBASSADOR, Self::register_ambassador);
        ctx.route(directives::UNREGISTER_AMBASSADOR, Self::unregister_ambassador);
        Self {
            ctx,
            forwarder: None,
        }
    }

    /// `create_actor`: instantiate a registered actor type and reply with
    /// its qualified ID. This is what lets a caller on hive X construct an
    /// actor on hive Y by addressing `hive@Y`.
    fn create_actor(&mut self, msg: &mut MessageEnvelope) -> HandlerResult<Self> {
        let name = msg.body.str_field("class")?.to_owned();
        let args = msg.body.get("args").cloned().unwrap_or(Value::Null);

        let actor_id = self.ctx.hive().spawn_registered(&name, &args)?;
        msg.reply(json!({ "actor_id": actor_id }))?;
        Ok(Flow::Done)
    }

    /// `register_ambassador`: only actors living on this hive may volunteer
    /// to relay for a remote one.
    fn register_ambassador(&mut self, msg: &mut MessageEnvelope) -> HandlerResult<Self> {
        let remote_hive = msg.body.str_field("hive_id")?.to_owned();
        let from = msg
            .from_id
            .clone()
            .ok_or_else(|| ActorError::other("register_ambassador requires a sender"))?;

        if from.hive_part() != Some(self.ctx.hive_id().as_str()) {
            return Err(ActorError::other(format!(
                "refusing ambassador registration from remote actor {from}"
            )));
        }

        self.ctx.hive().insert_ambassador(&remote_hive, from)?;
        Ok(Flow::Done)
    }

    /// `unregister_ambassador`: the registered ambassador withdraws itself.
    fn unregister_ambassador(&mut self, msg: &mut MessageEnvelope) -> HandlerResult<Self> {
        let remote_hive = msg.body.str_field("hive_id")?.to_owned();
        let from = msg
            .from_id
            .clone()
            .ok_or_else(|| ActorError::other("unregister_ambassador requires a sender"))?;

        self.ctx.hive().remove_ambassador(&remote_hive, &from)?;
        Ok(Flow::Done)
    }
}

impl Actor for HiveActor {
    fn context(&self) -> &ActorContext<Self> {
        &self.ctx
    }

    fn context_mut(&mut self) -> &mut ActorContext<Self> {
        &mut self.ctx
    }
}
