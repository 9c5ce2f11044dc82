//! The ambassador actor: the local face of a remote hive.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use serde_json::json;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

// Layer 3: Internal module imports
use super::error::BridgeError;
use super::transport::{Endpoint, FrameSink, FrameSource};
use crate::actor::{Actor, ActorContext, ActorError, Flow, HandlerResult};
use crate::hive::{HiveHandle, HIVE_LOCAL_ID};
use crate::message::{directives, MessageBuilder, MessageEnvelope, WireMessage};
use crate::util::{ActorId, HiveId};

/// Directive asking an ambassador to establish its bridge.
pub const SETUP: &str = "setup";

/// Directive asking an ambassador which hive it fronts for.
pub const GET_REMOTE_HIVE_ID: &str = "get_remote_hive_id";

/// Launches a peer hive and returns the near-side transport endpoint.
///
/// The launcher decides what a "peer" is: an in-process task
/// ([`super::local_peer_launcher`]), a subprocess over pipes, or a remote
/// process over a socket.
pub type PeerLauncher = Box<dyn FnOnce(HiveId) -> Result<Endpoint, BridgeError> + Send>;

/// An ordinary actor that tunnels envelopes to a peer hive.
///
/// On `setup` it allocates the peer's hive ID, launches the peer, registers
/// itself as that hive's ambassador, starts draining inbound frames, and
/// waits for the peer to `connect_back`. From then on every message the
/// local hive repackages as `forward_message` goes out over the transport.
pub struct Ambassador {
    ctx: ActorContext<Self>,
    launcher: Option<PeerLauncher>,
    peer_hive_id: Option<HiveId>,
    outbound: Option<Arc<dyn FrameSink>>,
    pump: Option<JoinHandle<()>>,
}

impl Ambassador {
    /// Build an ambassador that will launch its peer through `launcher`.
    pub fn new(mut ctx: ActorContext<Self>, launcher: PeerLauncher) -> Self {
        ctx.route(SETUP, Self::setup);
        ctx.route(directives::FORWARD_MESSAGE, Self::forward_message);
        ctx.route(GET_REMOTE_HIVE_ID, Self::get_remote_hive_id);
        Self {
            ctx,
            launcher: Some(launcher),
            peer_hive_id: None,
            outbound: None,
            pump: None,
        }
    }

    /// The hive this ambassador fronts for, once set up.
    pub fn peer_hive_id(&self) -> Option<&HiveId> {
        self.peer_hive_id.as_ref()
    }

    fn setup(&mut self, _msg: &mut MessageEnvelope) -> HandlerResult<Self> {
        let launcher = self
            .launcher
            .take()
            .ok_or_else(|| ActorError::other("ambassador is already set up"))?;

        let peer_hive_id = HiveId::generate();
        let endpoint = launcher(peer_hive_id.clone())?;
        self.outbound = Some(endpoint.outbound);
        self.pump = Some(spawn_inbound_pump(self.ctx.hive().clone(), endpoint.inbound));
        self.peer_hive_id = Some(peer_hive_id.clone());
        debug!(peer = %peer_hive_id, ambassador = %self.ctx.id(), "peer hive launched");

        // declare ourselves the ambassador for the new hive
        self.ctx.send(
            MessageBuilder::new(self.ctx.hive().hive_actor_id(), directives::REGISTER_AMBASSADOR)
                .with_body(json!({ "hive_id": peer_hive_id })),
        )?;

        // and ask the peer to register its end symmetrically
        let wait = self.ctx.wait_on_message(
            ActorId::join(HIVE_LOCAL_ID, &peer_hive_id),
            directives::CONNECT_BACK,
            json!({ "parent_hive_id": self.ctx.hive_id() }),
        )?;
        Ok(Flow::wait_on(wait, |_actor, _ack| Ok(Flow::Done)))
    }

    /// Relay one repackaged envelope to the peer.
    fn forward_message(&mut self, msg: &mut MessageEnvelope) -> HandlerResult<Self> {
        let sink = self
            .outbound
            .as_ref()
            .ok_or_else(|| ActorError::other("ambassador is not connected"))?;
        let frame = serde_json::to_string(&msg.body).map_err(BridgeError::Codec)?;
        sink.push(frame)?;
        Ok(Flow::Done)
    }

    fn get_remote_hive_id(&mut self, msg: &mut MessageEnvelope) -> HandlerResult<Self> {
        let peer = self
            .peer_hive_id
            .clone()
            .ok_or_else(|| ActorError::other("ambassador is not set up"))?;
        msg.reply(json!({ "hive_id": peer }))?;
        Ok(Flow::Done)
    }
}

impl Actor for Ambassador {
    fn context(&self) -> &ActorContext<Self> {
        &self.ctx
    }

    fn context_mut(&mut self) -> &mut ActorContext<Self> {
        &mut self.ctx
    }
}

impl Drop for Ambassador {
    fn drop(&mut self) {
        if let Some(pump) = &self.pump {
            pump.abort();
        }
    }
}

/// Drain a transport's inbound frames into a hive's queue.
///
/// Each frame is decoded as a [`WireMessage`] and re-injected with its
/// exact fields, ID included. Undecodable frames are logged and dropped;
/// the pump ends when the transport closes or the hive stops.
pub fn spawn_inbound_pump(handle: HiveHandle, mut source: Box<dyn FrameSource>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = source.next_frame().await {
            match WireMessage::from_json(&frame) {
                Ok(wire) => {
                    if handle.send(MessageBuilder::from(wire)).is_err() {
                        break;
                    }
                }
                Err(err) => warn!(%err, "dropping undecodable frame"),
            }
        }
        debug!(hive = %handle.hive_id(), "inbound transport drained");
    })
}
