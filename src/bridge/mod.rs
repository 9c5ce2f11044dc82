//! The inter-hive bridge: ambassadors, transports, and peer hives
//!
//! A hive forwards messages for non-local recipients to the *ambassador*
//! registered for the target hive. The ambassador relays them over a
//! transport to a peer hive, whose own end relays replies back, so two
//! bridged hives exchange messages as transparently as two local actors.
//!
//! The transport seam is deliberately small: anything that can push frames
//! one way ([`FrameSink`]) and yield them the other way ([`FrameSource`])
//! will do. In-process channels serve tests, framed byte streams serve
//! subprocesses and sockets.

pub mod ambassador;
pub mod error;
pub mod peer;
pub mod transport;

pub use ambassador::{spawn_inbound_pump, Ambassador, PeerLauncher};
pub use error::BridgeError;
pub use peer::{attach_forwarder, local_peer_launcher};
pub use transport::{endpoint_pair, framed_endpoint, Endpoint, FrameSink, FrameSource};
