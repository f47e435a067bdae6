//! Transport bindings for the live feed
//!
//! The feed client only needs "open a connection" and "next frame"; [`WsTransport`] binds
//! that to a WebSocket, [`ChannelTransport`] to in-process channels.

use std::future::Future;

use futures::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::ReceiverStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};
use url::Url;

use crate::error::{FeedError, FeedResult};

/// A frame as seen by the feed client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedFrame {
    /// One JSON-encoded event
    Text(String),
}

/// An open feed connection
pub trait FeedConnection: Send + 'static {
    /// Next data frame. `None` once the connection has ended.
    fn next_frame(&mut self) -> impl Future<Output = Option<FeedResult<FeedFrame>>> + Send;

    /// Close the connection gracefully
    fn close(self) -> impl Future<Output = ()> + Send;
}

/// Opens feed connections
pub trait FeedTransport: Send + Sync + 'static {
    type Connection: FeedConnection;

    fn connect(&self) -> impl Future<Output = FeedResult<Self::Connection>> + Send;
}

// ============================================================================
// WebSocket
// ============================================================================

/// WebSocket transport for `ws(s)://<backend>/ws/feed`
#[derive(Debug, Clone)]
pub struct WsTransport {
    url: Url,
}

impl WsTransport {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl FeedTransport for WsTransport {
    type Connection = WsConnection;

    async fn connect(&self) -> FeedResult<WsConnection> {
        let (stream, response) = tokio_tungstenite::connect_async(self.url.as_str()).await?;
        debug!(url = %self.url, status = %response.status(), "feed handshake complete");
        Ok(WsConnection { stream })
    }
}

pub struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl FeedConnection for WsConnection {
    async fn next_frame(&mut self) -> Option<FeedResult<FeedFrame>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(FeedFrame::Text(text))),
                Ok(Message::Binary(bytes)) => {
                    if let Some(frame) = binary_frame(bytes) {
                        return Some(Ok(frame));
                    }
                }
                Ok(Message::Close(frame)) => {
                    debug!(?frame, "server closed the feed");
                    return None;
                }
                // Ping/pong are answered by tungstenite itself
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {}
                Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                    return None
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    async fn close(mut self) {
        // Best effort: the peer may already be gone
        let _ = self.stream.close(None).await;
    }
}

/// Binary frames carry the same JSON as text frames; anything else is malformed
fn binary_frame(bytes: Vec<u8>) -> Option<FeedFrame> {
    match String::from_utf8(bytes) {
        Ok(text) => Some(FeedFrame::Text(text)),
        Err(e) => {
            warn!(error = %e, "dropping malformed feed message: binary frame is not UTF-8");
            None
        }
    }
}

// ============================================================================
// In-process channels
// ============================================================================

/// Frame buffer per in-process connection
const CHANNEL_FRAME_BUFFER: usize = 64;

/// Transport whose connections are served by a [`ChannelBackend`] in the same process
///
/// Useful for feeding events from an embedded source, and for driving the feed client
/// deterministically in tests.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    attempts: mpsc::UnboundedSender<ConnectAttempt>,
}

#[derive(Debug)]
struct ConnectAttempt {
    reply: oneshot::Sender<FeedResult<ChannelConnection>>,
}

impl ChannelTransport {
    /// Create a transport and the backend that answers its connection attempts
    pub fn pair() -> (ChannelTransport, ChannelBackend) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChannelTransport { attempts: tx }, ChannelBackend { attempts: rx })
    }
}

impl FeedTransport for ChannelTransport {
    type Connection = ChannelConnection;

    async fn connect(&self) -> FeedResult<ChannelConnection> {
        let (reply, response) = oneshot::channel();
        self.attempts
            .send(ConnectAttempt { reply })
            .map_err(|_| FeedError::WebSocket(tungstenite::Error::ConnectionClosed))?;
        response
            .await
            .map_err(|_| FeedError::WebSocket(tungstenite::Error::ConnectionClosed))?
    }
}

#[derive(Debug)]
pub struct ChannelConnection {
    frames: ReceiverStream<FeedFrame>,
}

impl FeedConnection for ChannelConnection {
    async fn next_frame(&mut self) -> Option<FeedResult<FeedFrame>> {
        self.frames.next().await.map(Ok)
    }

    async fn close(self) {}
}

/// Server side of a [`ChannelTransport`]
#[derive(Debug)]
pub struct ChannelBackend {
    attempts: mpsc::UnboundedReceiver<ConnectAttempt>,
}

impl ChannelBackend {
    /// Wait for the next connection attempt and accept it.
    ///
    /// Returns `None` once the transport (and every clone) is gone.
    pub async fn accept(&mut self) -> Option<ChannelPeer> {
        loop {
            let attempt = self.attempts.recv().await?;
            let (tx, rx) = mpsc::channel(CHANNEL_FRAME_BUFFER);
            let connection = ChannelConnection {
                frames: ReceiverStream::new(rx),
            };
            // The attempt may have been abandoned (client shut down mid-connect)
            if attempt.reply.send(Ok(connection)).is_ok() {
                return Some(ChannelPeer { tx });
            }
        }
    }

    /// Wait for the next connection attempt and fail its handshake
    pub async fn refuse(&mut self) -> bool {
        match self.attempts.recv().await {
            Some(attempt) => {
                let _ = attempt
                    .reply
                    .send(Err(FeedError::WebSocket(tungstenite::Error::ConnectionClosed)));
                true
            }
            None => false,
        }
    }

    /// A connection attempt is waiting, without consuming it
    pub fn has_pending_attempt(&self) -> bool {
        !self.attempts.is_empty()
    }
}

/// Server side of one accepted in-process connection. Dropping it closes the connection.
#[derive(Debug)]
pub struct ChannelPeer {
    tx: mpsc::Sender<FeedFrame>,
}

impl ChannelPeer {
    /// Send one text frame; `false` if the client side is gone
    pub async fn send_text(&self, text: impl Into<String>) -> bool {
        self.tx.send(FeedFrame::Text(text.into())).await.is_ok()
    }

    /// Resolves once the client has dropped or closed the connection
    pub async fn closed(&self) {
        self.tx.closed().await
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
