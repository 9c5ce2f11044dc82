//! Transport endpoints: frame sinks, frame sources, and their pairings.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};
use tracing::warn;

// Layer 3: Internal module imports
use super::error::BridgeError;

/// The writing half of a transport: push one frame toward the peer.
///
/// Implementations serialise concurrent pushes internally, so an ambassador
/// and a hive actor may share one sink.
pub trait FrameSink: Send + Sync {
    /// Queue a frame for delivery to the peer.
    fn push(&self, frame: String) -> Result<(), BridgeError>;
}

/// The reading half of a transport: frames arriving from the peer.
#[async_trait]
pub trait FrameSource: Send {
    /// The next frame, or `None` once the transport is closed.
    async fn next_frame(&mut self) -> Option<String>;
}

/// One end of a bidirectional transport.
pub struct Endpoint {
    /// Frames pushed here arrive at the peer's `inbound`.
    pub outbound: Arc<dyn FrameSink>,
    /// Frames the peer pushed toward us.
    pub inbound: Box<dyn FrameSource>,
}

/// Build a mirrored pair of in-process endpoints.
///
/// What one side pushes, the other side reads, in order. This is the
/// transport used by in-process peer hives and by tests.
pub fn endpoint_pair() -> (Endpoint, Endpoint) {
    let (left_tx, right_rx) = unbounded_channel();
    let (right_tx, left_rx) = unbounded_channel();

    (
        Endpoint {
            outbound: Arc::new(ChannelSink(left_tx)),
            inbound: Box::new(ChannelSource(left_rx)),
        },
        Endpoint {
            outbound: Arc::new(ChannelSink(right_tx)),
            inbound: Box::new(ChannelSource(right_rx)),
        },
    )
}

struct ChannelSink(UnboundedSender<String>);

impl FrameSink for ChannelSink {
    fn push(&self, frame: String) -> Result<(), BridgeError> {
        self.0.send(frame).map_err(|_| BridgeError::Closed)
    }
}

struct ChannelSource(UnboundedReceiver<String>);

#[async_trait]
impl FrameSource for ChannelSource {
    async fn next_frame(&mut self) -> Option<String> {
        self.0.recv().await
    }
}

/// Adapt a byte-stream pair into an endpoint with newline-delimited frames.
///
/// Covers subprocess pipes and TCP sockets alike: frames are single JSON
/// lines, so any stream transport carries them. A writer task owns the
/// write half; pushing stays synchronous for callers.
pub fn framed_endpoint<R, W>(read: R, write: W) -> Endpoint
where
    R: AsyncRead + Send + Unpin + 'static,
    W: AsyncWrite + Send + Unpin + 'static,
{
    let (tx, mut rx) = unbounded_channel::<String>();
    tokio::spawn(async move {
        let mut frames = FramedWrite::new(write, LinesCodec::new());
        while let Some(frame) = rx.recv().await {
            if let Err(err) = frames.send(frame).await {
                warn!(%err, "transport write failed");
                break;
            }
        }
    });

    Endpoint {
        outbound: Arc::new(ChannelSink(tx)),
        inbound: Box::new(FramedSource(FramedRead::new(read, LinesCodec::new()))),
    }
}

struct FramedSource<R: AsyncRead + Send + Unpin>(FramedRead<R, LinesCodec>);

#[async_trait]
impl<R: AsyncRead + Send + Unpin> FrameSource for FramedSource<R> {
    async fn next_frame(&mut self) -> Option<String> {
        match self.0.next().await? {
            Ok(frame) => Some(frame),
            Err(err) => {
                warn!(%err, "transport read failed");
                None
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_pair_is_mirrored() {
        let (left, mut right) = endpoint_pair();

        left.outbound.push("ping".to_owned()).unwrap();
        assert_eq!(right.inbound.next_frame().await.unwrap(), "ping");

        right.outbound.push("pong".to_owned()).unwrap();
        let mut left = left;
        assert_eq!(left.inbound.next_frame().await.unwrap(), "pong");
    }

    #[tokio::test]
    async fn test_channel_pair_preserves_order() {
        let (left, mut right) = endpoint_pair();

        for n in 0..5 {
            left.outbound.push(format!("frame-{n}")).unwrap();
        }
        for n in 0..5 {
            assert_eq!(right.inbound.next_frame().await.unwrap(), format!("frame-{n}"));
        }
    }

    #[tokio::test]
    async fn test_push_to_dropped_peer_fails() {
        let (left, right) = endpoint_pair();
        drop(right);

        assert!(matches!(
            left.outbound.push("lost".to_owned()),
            Err(BridgeError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_framed_endpoint_round_trip() {
        let (near, far) = tokio::io::duplex(1024);
        let (near_read, near_write) = tokio::io::split(near);
        let (far_read, far_write) = tokio::io::split(far);

        let near_end = framed_endpoint(near_read, near_write);
        let mut far_end = framed_endpoint(far_read, far_write);

        near_end
            .outbound
            .push(r#"{"kind":"greeting"}"#.to_owned())
            .unwrap();

        assert_eq!(
            far_end.inbound.next_frame().await.unwrap(),
            r#"{"kind":"greeting"}"#
        );
    }
}
