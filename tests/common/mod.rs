//! Shared fixtures for integration tests: frame builders and an in-memory
//! transport.

#![allow(dead_code)]

use async_trait::async_trait;
use gravity_four::{Connector, SessionEvent, Transport, TransportError};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use url::Url;

/// Upper bound for any single wait in async tests.
pub const WAIT: Duration = Duration::from_secs(2);

/// A `rows x cols` wire grid with every cell empty.
pub fn empty_wire(rows: usize, cols: usize) -> Vec<Vec<i64>> {
    vec![vec![-1; cols]; rows]
}

/// A server frame in the shape the game server pushes.
pub fn game_frame(
    message: &str,
    player_index: i64,
    grid: &[Vec<i64>],
    turn: u64,
    is_over: bool,
    names: &[&str],
) -> String {
    let players: Vec<_> = names.iter().map(|name| json!({ "name": name })).collect();
    json!({
        "message": message,
        "playerIndex": player_index,
        "playerTurn": false,
        "game": {
            "grid": grid,
            "isOver": is_over,
            "turn": turn,
            "players": players,
        }
    })
    .to_string()
}

/// Waits for the next session event, failing the test on timeout.
pub async fn next_event(events: &mut mpsc::UnboundedReceiver<SessionEvent>) -> SessionEvent {
    tokio::time::timeout(WAIT, events.recv())
        .await
        .expect("timed out waiting for session event")
        .expect("event channel closed")
}

/// Waits until the event channel is closed, returning anything left in it.
pub async fn drain(events: &mut mpsc::UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut rest = Vec::new();
    while let Some(event) = tokio::time::timeout(WAIT, events.recv())
        .await
        .expect("timed out draining session events")
    {
        rest.push(event);
    }
    rest
}

/// Client end of an in-memory connection.
pub struct ChannelTransport {
    inbound: mpsc::UnboundedReceiver<Result<String, TransportError>>,
    outbound: mpsc::UnboundedSender<String>,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        self.outbound
            .send(frame)
            .map_err(|_| TransportError::Send("peer gone".to_string()))
    }

    async fn recv(&mut self) -> Option<Result<String, TransportError>> {
        self.inbound.recv().await
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Server end of an in-memory connection.
pub struct ServerHandle {
    to_client: Option<mpsc::UnboundedSender<Result<String, TransportError>>>,
    from_client: mpsc::UnboundedReceiver<String>,
    closed: Arc<AtomicBool>,
}

impl ServerHandle {
    /// Pushes a text frame to the client.
    pub fn push(&self, frame: impl Into<String>) {
        if let Some(tx) = &self.to_client {
            tx.send(Ok(frame.into())).expect("client transport dropped");
        }
    }

    /// Makes the client's next read fail.
    pub fn fail(&self, reason: &str) {
        if let Some(tx) = &self.to_client {
            tx.send(Err(TransportError::Receive(reason.to_string())))
                .expect("client transport dropped");
        }
    }

    /// Ends the connection from the server side.
    pub fn hang_up(&mut self) {
        self.to_client = None;
    }

    /// Next frame the client sent.
    pub async fn next_sent(&mut self) -> String {
        tokio::time::timeout(WAIT, self.from_client.recv())
            .await
            .expect("timed out waiting for client frame")
            .expect("client transport dropped")
    }

    /// True once the client closed its end.
    pub fn client_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Hands out queued in-memory connections in order.
///
/// With nothing queued, the handshake never completes.
#[derive(Clone, Default)]
pub struct MockConnector {
    pending: Arc<Mutex<VecDeque<Result<ChannelTransport, TransportError>>>>,
    targets: Arc<Mutex<Vec<Url>>>,
}

impl MockConnector {
    /// Creates a connector with nothing queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful handshake and returns the server end.
    pub fn accept(&self) -> ServerHandle {
        let (to_client, inbound) = mpsc::unbounded_channel();
        let (outbound, from_client) = mpsc::unbounded_channel();
        let closed = Arc::new(AtomicBool::new(false));
        self.pending
            .lock()
            .expect("connector lock poisoned")
            .push_back(Ok(ChannelTransport {
                inbound,
                outbound,
                closed: Arc::clone(&closed),
            }));
        ServerHandle {
            to_client: Some(to_client),
            from_client,
            closed,
        }
    }

    /// Queues a failed handshake.
    pub fn refuse(&self, reason: &str) {
        self.pending
            .lock()
            .expect("connector lock poisoned")
            .push_back(Err(TransportError::Handshake(reason.to_string())));
    }

    /// URLs the client connected to, in order.
    pub fn targets(&self) -> Vec<Url> {
        self.targets.lock().expect("connector lock poisoned").clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    type Transport = ChannelTransport;

    async fn connect(&self, target: &Url) -> Result<ChannelTransport, TransportError> {
        self.targets
            .lock()
            .expect("connector lock poisoned")
            .push(target.clone());
        let next = self
            .pending
            .lock()
            .expect("connector lock poisoned")
            .pop_front();
        match next {
            Some(result) => result,
            None => futures::future::pending().await,
        }
    }
}
