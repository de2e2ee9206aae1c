//! Message transport seam.
//!
//! The session driver only needs to send and receive text frames and to
//! close the connection. [`WebSocketTransport`] provides that over
//! `tokio-tungstenite`; tests substitute in-memory doubles.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::error::ProtocolError as WsProtocolError;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, instrument, warn};
use url::Url;

/// Transport-level failure.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum TransportError {
    /// The connection could not be established.
    #[display("handshake failed: {_0}")]
    Handshake(String),

    /// A frame could not be written.
    #[display("send failed: {_0}")]
    Send(String),

    /// The connection failed while reading.
    #[display("receive failed: {_0}")]
    Receive(String),
}

impl std::error::Error for TransportError {}

/// A connected, bidirectional text-frame channel.
#[async_trait]
pub trait Transport: Send + 'static {
    /// Writes one text frame.
    async fn send(&mut self, frame: String) -> Result<(), TransportError>;

    /// Reads the next text frame.
    ///
    /// `None` once the peer has closed the connection.
    async fn recv(&mut self) -> Option<Result<String, TransportError>>;

    /// Closes the connection.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Establishes a [`Transport`] to a target URL.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Transport produced on success.
    type Transport: Transport;

    /// Performs the handshake.
    async fn connect(&self, target: &Url) -> Result<Self::Transport, TransportError>;
}

/// Connects over WebSocket (`ws://` or `wss://`).
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

#[async_trait]
impl Connector for WebSocketConnector {
    type Transport = WebSocketTransport;

    #[instrument(skip(self), fields(target = %target))]
    async fn connect(&self, target: &Url) -> Result<Self::Transport, TransportError> {
        debug!("Opening WebSocket");
        let (stream, response) = tokio_tungstenite::connect_async(target.as_str())
            .await
            .map_err(|e| TransportError::Handshake(e.to_string()))?;
        debug!(status = %response.status(), "WebSocket handshake complete");
        Ok(WebSocketTransport { stream })
    }
}

/// WebSocket-backed transport.
pub struct WebSocketTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl std::fmt::Debug for WebSocketTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSocketTransport").finish_non_exhaustive()
    }
}

/// Errors that mean the peer went away rather than that something broke.
fn is_termination(error: &WsError) -> bool {
    matches!(
        error,
        WsError::ConnectionClosed
            | WsError::AlreadyClosed
            | WsError::Protocol(WsProtocolError::ResetWithoutClosingHandshake)
    )
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        self.stream
            .send(Message::Text(frame.into()))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<String, TransportError>> {
        while let Some(message) = self.stream.next().await {
            match message {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_owned())),
                Ok(Message::Close(frame)) => {
                    debug!(?frame, "Server sent close frame");
                    return None;
                }
                Ok(Message::Binary(bytes)) => {
                    debug!(len = bytes.len(), "Skipping binary frame");
                }
                Ok(_) => {}
                Err(e) if is_termination(&e) => {
                    debug!(error = %e, "Connection ended without close frame");
                    return None;
                }
                Err(e) => {
                    warn!(error = %e, "WebSocket read failed");
                    return Some(Err(TransportError::Receive(e.to_string())));
                }
            }
        }
        None
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        match self.stream.close(None).await {
            Ok(()) => Ok(()),
            Err(e) if is_termination(&e) => Ok(()),
            Err(e) => Err(TransportError::Send(e.to_string())),
        }
    }
}
