//! Async session driver.
//!
//! [`SessionClient`] is a thin handle. Each [`SessionClient::connect`] spawns
//! one background task that owns the transport and a [`SessionCore`], and
//! multiplexes inbound frames, user intents and shutdown with
//! `tokio::select!`. Everything that touches game state happens on that one
//! task, in arrival order.

use crate::config::{DEFAULT_SHUTDOWN_TIMEOUT_MS, Endpoint};
use crate::session::{SessionCore, SessionEvent};
use crate::transport::{Connector, Transport};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Default grace period for [`SessionClient::disconnect`].
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(DEFAULT_SHUTDOWN_TIMEOUT_MS);

/// User intent forwarded to the session task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Move { x: usize, y: usize },
    PlayAgain,
}

struct ActiveSession {
    cmd_tx: mpsc::UnboundedSender<Command>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

/// Handle for at most one live game session.
pub struct SessionClient<C: Connector> {
    connector: Arc<C>,
    endpoint: Endpoint,
    shutdown_timeout: Duration,
    active: Option<ActiveSession>,
}

impl<C: Connector> SessionClient<C> {
    /// Creates an idle client.
    pub fn new(connector: C, endpoint: Endpoint) -> Self {
        Self {
            connector: Arc::new(connector),
            endpoint,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            active: None,
        }
    }

    /// Sets the grace period given to the session task on disconnect.
    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Starts a session for `game_id` as `player_name`.
    ///
    /// A session that is still running is torn down first. Connection
    /// failures never surface here; they arrive on the returned receiver as
    /// [`SessionEvent::ConnectionError`] followed by [`SessionEvent::Closed`].
    #[instrument(skip(self))]
    pub async fn connect(
        &mut self,
        game_id: &str,
        player_name: &str,
    ) -> mpsc::UnboundedReceiver<SessionEvent> {
        if self.active.is_some() {
            warn!("Connect called with a live session, tearing it down first");
            self.disconnect().await;
        }

        let target = self.endpoint.target(game_id, player_name);
        info!(target = %target, "Connecting");

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(session_loop(
            Arc::clone(&self.connector),
            target,
            cmd_rx,
            event_tx,
            shutdown_rx,
        ));

        self.active = Some(ActiveSession {
            cmd_tx,
            shutdown_tx: Some(shutdown_tx),
            task,
        });
        event_rx
    }

    /// Asks to drop a piece at column `x`, row `y`.
    ///
    /// Silently dropped when no session is open, when it is not this
    /// client's turn, or when the move is illegal.
    pub fn request_move(&self, x: usize, y: usize) {
        self.send(Command::Move { x, y });
    }

    /// Asks the server for a rematch with the same roster.
    pub fn request_play_again(&self) {
        self.send(Command::PlayAgain);
    }

    /// True while a session task is running.
    pub fn is_active(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.task.is_finished())
    }

    /// Ends the current session, whatever state it is in.
    ///
    /// The task gets the configured grace period to close the transport and
    /// report [`SessionEvent::Closed`]; after that it is aborted.
    #[instrument(skip(self))]
    pub async fn disconnect(&mut self) {
        let Some(mut active) = self.active.take() else {
            return;
        };
        debug!("Disconnect requested");

        if let Some(tx) = active.shutdown_tx.take() {
            let _ = tx.send(());
        }

        match tokio::time::timeout(self.shutdown_timeout, &mut active.task).await {
            Ok(Ok(())) => {}
            Ok(Err(join_err)) => {
                warn!(error = %join_err, "Session task terminated abnormally");
            }
            Err(_) => {
                warn!("Session task did not exit within timeout, aborting");
                active.task.abort();
                if let Err(join_err) = active.task.await {
                    debug!(error = %join_err, "Session task aborted");
                }
            }
        }
    }

    fn send(&self, command: Command) {
        let Some(active) = &self.active else {
            debug!(?command, "No session, dropping intent");
            return;
        };
        if active.cmd_tx.send(command).is_err() {
            debug!(?command, "Session task gone, dropping intent");
        }
    }
}

impl<C: Connector> std::fmt::Debug for SessionClient<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionClient")
            .field("endpoint", &self.endpoint)
            .field("active", &self.is_active())
            .finish()
    }
}

impl<C: Connector> Drop for SessionClient<C> {
    fn drop(&mut self) {
        // No executor to await a graceful close from here.
        if let Some(active) = self.active.take() {
            active.task.abort();
        }
    }
}

fn forward(event_tx: &mpsc::UnboundedSender<SessionEvent>, events: Vec<SessionEvent>) {
    for event in events {
        if event_tx.send(event).is_err() {
            debug!("Event receiver dropped");
            return;
        }
    }
}

/// Body of the per-session task.
#[instrument(skip_all, fields(target = %target))]
async fn session_loop<C: Connector>(
    connector: Arc<C>,
    target: Url,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut core = SessionCore::new();

    let handshake = tokio::select! {
        result = connector.connect(&target) => result,
        _ = &mut shutdown_rx => {
            forward(&event_tx, core.on_shutdown());
            return;
        }
    };

    let mut transport = match handshake {
        Ok(transport) => transport,
        Err(e) => {
            forward(&event_tx, core.on_error(&e.to_string()));
            return;
        }
    };
    forward(&event_tx, core.on_open());

    loop {
        tokio::select! {
            command = cmd_rx.recv() => {
                let Some(command) = command else {
                    debug!("Command channel closed");
                    let _ = transport.close().await;
                    forward(&event_tx, core.on_shutdown());
                    break;
                };
                let (frame, placement) = match command {
                    Command::Move { x, y } => match core.request_move(x, y) {
                        Some(outgoing) => {
                            let (placement, frame) = outgoing.into_parts();
                            (Some(frame), Some(placement))
                        }
                        None => (None, None),
                    },
                    Command::PlayAgain => (core.request_play_again(), None),
                };
                let Some(frame) = frame else { continue };
                if let Err(e) = transport.send(frame).await {
                    forward(&event_tx, core.on_error(&e.to_string()));
                    break;
                }
                if let Some(placement) = placement {
                    forward(&event_tx, vec![SessionEvent::MoveSent(placement)]);
                }
            }

            _ = &mut shutdown_rx => {
                if let Err(e) = transport.close().await {
                    debug!(error = %e, "Close failed during shutdown");
                }
                forward(&event_tx, core.on_shutdown());
                break;
            }

            incoming = transport.recv() => {
                match incoming {
                    Some(Ok(text)) => forward(&event_tx, core.on_frame(&text)),
                    Some(Err(e)) => {
                        forward(&event_tx, core.on_error(&e.to_string()));
                        break;
                    }
                    None => {
                        forward(&event_tx, core.on_closed());
                        break;
                    }
                }
            }
        }
    }

    debug!(state = %core.state(), "Session task exiting");
}
