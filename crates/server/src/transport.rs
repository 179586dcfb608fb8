//! Transport seam between a [`GameSession`](crate::session::GameSession) and
//! its peer.
//!
//! A session only ever sends and receives plain text. Framing, sockets and
//! timeouts live behind [`Transport`].

use std::future::Future;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

use crate::error::TransportError;
use crate::protocol::{FrameCodec, DISCONNECT_MESSAGE};

/// Text in, text out. Both calls may suspend; both fail only fatally.
pub trait Transport: Send {
    fn send(&mut self, text: &str) -> impl Future<Output = Result<(), TransportError>> + Send;

    fn receive(&mut self) -> impl Future<Output = Result<String, TransportError>> + Send;
}

/// Transport over any byte stream: framed inbound, raw or framed outbound.
pub struct FramedTransport<R, W> {
    reader: BufReader<R>,
    writer: BufWriter<W>,
    codec: FrameCodec,
    frame_outbound: bool,
    idle_timeout: Option<Duration>,
}

/// The transport used for accepted TCP connections.
pub type TcpTransport = FramedTransport<OwnedReadHalf, OwnedWriteHalf>;

impl TcpTransport {
    pub fn from_stream(
        stream: TcpStream,
        codec: FrameCodec,
        frame_outbound: bool,
        idle_timeout: Option<Duration>,
    ) -> Self {
        let (reader, writer) = stream.into_split();
        Self::new(reader, writer, codec, frame_outbound, idle_timeout)
    }
}

impl<R, W> FramedTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(
        reader: R,
        writer: W,
        codec: FrameCodec,
        frame_outbound: bool,
        idle_timeout: Option<Duration>,
    ) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer: BufWriter::new(writer),
            codec,
            frame_outbound,
            idle_timeout,
        }
    }

    async fn read_message(&mut self) -> Result<String, TransportError> {
        let message = match self.idle_timeout {
            Some(limit) => tokio::time::timeout(limit, self.codec.read_frame(&mut self.reader))
                .await
                .map_err(|_| TransportError::IdleTimeout)??,
            None => self.codec.read_frame(&mut self.reader).await?,
        };

        if message == DISCONNECT_MESSAGE {
            return Err(TransportError::Disconnected);
        }
        Ok(message)
    }
}

impl<R, W> Transport for FramedTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, text: &str) -> Result<(), TransportError> {
        if self.frame_outbound {
            self.codec.write_frame(&mut self.writer, text).await
        } else {
            self.writer.write_all(text.as_bytes()).await?;
            self.writer.flush().await?;
            Ok(())
        }
    }

    async fn receive(&mut self) -> Result<String, TransportError> {
        self.read_message().await
    }
}

/// In-process transport backed by two unbounded channels.
///
/// The session holds the [`ChannelTransport`]; whoever plays the game holds
/// the [`ChannelPeer`]. Dropping the peer looks like a disconnect.
pub struct ChannelTransport {
    outbound: mpsc::UnboundedSender<String>,
    inbound: mpsc::UnboundedReceiver<String>,
}

/// The player's end of a [`ChannelTransport`].
pub struct ChannelPeer {
    to_session: mpsc::UnboundedSender<String>,
    from_session: mpsc::UnboundedReceiver<String>,
}

/// Create a connected transport/peer pair.
pub fn channel_pair() -> (ChannelTransport, ChannelPeer) {
    let (to_session, inbound) = mpsc::unbounded_channel();
    let (outbound, from_session) = mpsc::unbounded_channel();
    (
        ChannelTransport { outbound, inbound },
        ChannelPeer {
            to_session,
            from_session,
        },
    )
}

impl Transport for ChannelTransport {
    async fn send(&mut self, text: &str) -> Result<(), TransportError> {
        self.outbound
            .send(text.to_string())
            .map_err(|_| TransportError::Disconnected)
    }

    async fn receive(&mut self) -> Result<String, TransportError> {
        match self.inbound.recv().await {
            Some(message) if message != DISCONNECT_MESSAGE => Ok(message),
            _ => Err(TransportError::Disconnected),
        }
    }
}

impl ChannelPeer {
    /// Queue a reply for the session. Returns false once the session is gone.
    pub fn send(&self, text: impl Into<String>) -> bool {
        self.to_session.send(text.into()).is_ok()
    }

    /// Next message from the session, or `None` once it has ended.
    pub async fn recv(&mut self) -> Option<String> {
        self.from_session.recv().await
    }

    /// Non-blocking variant of [`ChannelPeer::recv`].
    pub fn try_recv(&mut self) -> Option<String> {
        self.from_session.try_recv().ok()
    }
}
