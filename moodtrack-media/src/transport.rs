//! Real-time transport seam
//!
//! The browser connection (signaling, ICE, codecs) is owned by the host.
//! The pipeline only needs to pull decoded frames and push annotated ones
//! back over the same connection.

use crate::error::{MediaError, MediaResult};
use crate::tracks::VideoFrame;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

/// Bidirectional frame transport for one session
#[async_trait]
pub trait MediaTransport: Send {
    /// Next decoded frame, or `None` once the remote side has gone away
    async fn recv_frame(&mut self) -> MediaResult<Option<VideoFrame>>;

    /// Send an annotated frame back to the remote side
    async fn send_frame(&mut self, frame: VideoFrame) -> MediaResult<()>;

    /// Release the connection. Idempotent.
    async fn close(&mut self) -> MediaResult<()>;

    /// Whether `close` has been called
    fn is_closed(&self) -> bool;
}

/// In-process transport backed by a pair of tokio channels
#[derive(Debug)]
pub struct ChannelTransport {
    incoming: mpsc::Receiver<VideoFrame>,
    outgoing: Option<mpsc::Sender<VideoFrame>>,
}

/// The remote end of a [`ChannelTransport`]
#[derive(Debug)]
pub struct TransportPeer {
    frames_tx: mpsc::Sender<VideoFrame>,
    annotated_rx: mpsc::Receiver<VideoFrame>,
}

impl ChannelTransport {
    /// Create a transport and its peer, each direction buffering `buffer` frames
    pub fn pair(buffer: usize) -> (ChannelTransport, TransportPeer) {
        let (frames_tx, incoming) = mpsc::channel(buffer.max(1));
        let (outgoing, annotated_rx) = mpsc::channel(buffer.max(1));
        (
            ChannelTransport {
                incoming,
                outgoing: Some(outgoing),
            },
            TransportPeer {
                frames_tx,
                annotated_rx,
            },
        )
    }
}

#[async_trait]
impl MediaTransport for ChannelTransport {
    async fn recv_frame(&mut self) -> MediaResult<Option<VideoFrame>> {
        if self.outgoing.is_none() {
            return Err(MediaError::TransportClosed);
        }
        Ok(self.incoming.recv().await)
    }

    async fn send_frame(&mut self, frame: VideoFrame) -> MediaResult<()> {
        let outgoing = self.outgoing.as_ref().ok_or(MediaError::TransportClosed)?;
        outgoing
            .send(frame)
            .await
            .map_err(|_| MediaError::TransportClosed)
    }

    async fn close(&mut self) -> MediaResult<()> {
        if self.outgoing.take().is_some() {
            self.incoming.close();
            debug!("channel transport closed");
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.outgoing.is_none()
    }
}

impl TransportPeer {
    /// Push a captured frame toward the pipeline
    pub async fn send(&self, frame: VideoFrame) -> MediaResult<()> {
        self.frames_tx
            .send(frame)
            .await
            .map_err(|_| MediaError::TransportClosed)
    }

    /// Next annotated frame; `None` once the transport is closed and drained
    pub async fn recv(&mut self) -> Option<VideoFrame> {
        self.annotated_rx.recv().await
    }

    /// Whether the pipeline side has released the transport
    pub fn is_closed(&self) -> bool {
        self.frames_tx.is_closed()
    }
}
