//! Peer-side bridging: the hive that lives at the far end of a transport.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use serde_json::json;
use tracing::error;

// Layer 3: Internal module imports
use super::ambassador::{spawn_inbound_pump, PeerLauncher};
use super::error::BridgeError;
use super::transport::{endpoint_pair, FrameSink};
use crate::actor::{Actor, ActorError, BodyExt, Flow, HandlerResult};
use crate::hive::{Hive, HiveActor, HiveError};
use crate::message::{directives, MessageBuilder, MessageEnvelope};

/// Extend a hive's own actor with the peer end of a bridge.
///
/// After this the hive answers `connect_back` (registering itself as the
/// ambassador for its parent), relays `forward_message` bodies onto `sink`,
/// and honours the two-step `remote_shutdown` handshake.
pub fn attach_forwarder(hive: &Hive, sink: Arc<dyn FrameSink>) -> Result<(), HiveError> {
    hive.with_hive_actor(|hive_actor| {
        hive_actor.forwarder = Some(sink);
        let ctx = hive_actor.context_mut();
        ctx.route(directives::CONNECT_BACK, connect_back);
        ctx.route(directives::FORWARD_MESSAGE, forward_message);
        ctx.route(directives::REMOTE_SHUTDOWN, remote_shutdown);
        ctx.route(directives::REMOTE_SHUTDOWN_STEP2, remote_shutdown_step2);
    })
}

/// A launcher that runs the peer hive as an in-process task over a channel
/// transport.
///
/// `configure` runs against the fresh peer before its loop starts; use it
/// to register actor types the parent may ask for.
pub fn local_peer_launcher<F>(configure: F) -> PeerLauncher
where
    F: FnOnce(&Hive) + Send + 'static,
{
    Box::new(move |hive_id| {
        let (near, far) = endpoint_pair();
        tokio::spawn(async move {
            let mut hive = Hive::with_id(hive_id);
            if let Err(err) = attach_forwarder(&hive, far.outbound) {
                error!(%err, "could not attach forwarder to peer hive");
                return;
            }
            configure(&hive);

            let pump = spawn_inbound_pump(hive.handle(), far.inbound);
            hive.run().await;
            pump.abort();
        });
        Ok(near)
    })
}

/// `connect_back`: register this hive itself as the ambassador for the
/// parent hive on the other end of the transport.
fn connect_back(hive: &mut HiveActor, msg: &mut MessageEnvelope) -> HandlerResult<HiveActor> {
    let parent_hive_id = msg.body.str_field("parent_hive_id")?.to_owned();
    let ctx = hive.context();
    ctx.send(
        MessageBuilder::new(ctx.id().clone(), directives::REGISTER_AMBASSADOR)
            .with_body(json!({ "hive_id": parent_hive_id })),
    )?;
    Ok(Flow::Done)
}

/// `forward_message`: relay a repackaged envelope body to the parent.
fn forward_message(hive: &mut HiveActor, msg: &mut MessageEnvelope) -> HandlerResult<HiveActor> {
    let sink = hive
        .forwarder
        .as_ref()
        .ok_or_else(|| ActorError::other("hive has no forwarder attached"))?;
    let frame = serde_json::to_string(&msg.body).map_err(BridgeError::Codec)?;
    sink.push(frame)?;
    Ok(Flow::Done)
}

/// `remote_shutdown`: schedule the real stop for after this message's
/// acknowledgement has been queued.
///
/// Stopping the loop here would lose the auto-reply the initiator is
/// waiting on; the queued second step runs once the acknowledgement is on
/// its way out.
fn remote_shutdown(hive: &mut HiveActor, _msg: &mut MessageEnvelope) -> HandlerResult<HiveActor> {
    let ctx = hive.context();
    ctx.send(MessageBuilder::new(
        ctx.id().clone(),
        directives::REMOTE_SHUTDOWN_STEP2,
    ))?;
    Ok(Flow::Done)
}

/// `remote_shutdown_step2`: actually stop the loop.
fn remote_shutdown_step2(
    hive: &mut HiveActor,
    _msg: &mut MessageEnvelope,
) -> HandlerResult<HiveActor> {
    hive.context().hive().send_shutdown();
    Ok(Flow::Done)
}
