//! Session state machine.
//!
//! [`SessionCore`] holds everything the client knows about one game session
//! and turns transport happenings (open, frame, close, error) and user
//! intents into [`SessionEvent`]s and outbound frames. It does no I/O; the
//! async driver in [`crate::client`] feeds it serially.

use crate::projector::{RematchLatch, ViewState, project_with_turn_hint};
use crate::protocol::{Inbound, MoveIntent, decode_server_frame};
use crate::snapshot::{GameSnapshot, SessionIdentity};
use derive_getters::Getters;
use gravity_four_grid::{Grid, Placement, check_move};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Status text shown when the connection drops or errors.
pub const CONNECTION_TERMINATED_MESSAGE: &str = "Error: connection has been terminated.";

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum CloseKind {
    /// Expected teardown: the game was over or the user left.
    Normal,
    /// Handshake failure, transport error or unexpected termination.
    Error,
}

/// Connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum ConnectionState {
    /// Handshake in flight.
    Connecting,
    /// Frames flow both ways.
    Open,
    /// Terminal state.
    Closed(CloseKind),
}

/// Notification for the render side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The handshake completed.
    Opened,
    /// A snapshot replaced the previous one.
    Updated {
        /// Projected view of the new snapshot.
        view: ViewState,
        /// Board of the new snapshot.
        grid: Grid,
    },
    /// The round just ended for a seated player; offer a rematch.
    OfferRematch,
    /// A move left for the server; it is not on the board until the next
    /// snapshot confirms it.
    MoveSent(Placement),
    /// Something went wrong with the connection; show `message`.
    ConnectionError {
        /// User-facing status text.
        message: String,
    },
    /// The session reached its terminal state.
    Closed(CloseKind),
}

/// A locally accepted move and the frame carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct OutgoingMove {
    /// Target cell.
    placement: Placement,
    /// Encoded frame to transmit.
    frame: String,
}

impl OutgoingMove {
    /// Splits into the placement and its frame.
    pub fn into_parts(self) -> (Placement, String) {
        (self.placement, self.frame)
    }
}

/// Sans-I/O session state.
#[derive(Debug, Clone)]
pub struct SessionCore {
    state: ConnectionState,
    snapshot: Option<GameSnapshot>,
    identity: Option<SessionIdentity>,
    view: Option<ViewState>,
    rematch: RematchLatch,
}

impl Default for SessionCore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionCore {
    /// A session waiting for its handshake.
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Connecting,
            snapshot: None,
            identity: None,
            view: None,
            rematch: RematchLatch::new(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Latest snapshot, if any arrived.
    pub fn snapshot(&self) -> Option<&GameSnapshot> {
        self.snapshot.as_ref()
    }

    /// Identity assigned by the first snapshot.
    pub fn identity(&self) -> Option<&SessionIdentity> {
        self.identity.as_ref()
    }

    /// View projected from the latest snapshot.
    pub fn view(&self) -> Option<&ViewState> {
        self.view.as_ref()
    }

    /// True while frames may be sent.
    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    fn is_closed(&self) -> bool {
        matches!(self.state, ConnectionState::Closed(_))
    }

    /// Handshake completed.
    #[instrument(skip(self), fields(state = %self.state))]
    pub fn on_open(&mut self) -> Vec<SessionEvent> {
        if self.state != ConnectionState::Connecting {
            warn!("Open reported outside of Connecting, ignoring");
            return Vec::new();
        }
        info!("Session open");
        self.state = ConnectionState::Open;
        vec![SessionEvent::Opened]
    }

    /// One inbound text frame.
    ///
    /// Content-free and malformed frames are dropped without touching state.
    #[instrument(skip(self, text), fields(state = %self.state))]
    pub fn on_frame(&mut self, text: &str) -> Vec<SessionEvent> {
        if !self.is_open() {
            debug!("Frame arrived while not open, ignoring");
            return Vec::new();
        }

        match decode_server_frame(text) {
            Ok(Inbound::Update(update)) => {
                let (snapshot, identity, hint) = update.into_parts();
                self.apply_snapshot(snapshot, identity, hint)
            }
            Ok(Inbound::Ignored) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Dropping undecodable frame");
                Vec::new()
            }
        }
    }

    fn apply_snapshot(
        &mut self,
        snapshot: GameSnapshot,
        identity: SessionIdentity,
        server_turn_hint: bool,
    ) -> Vec<SessionEvent> {
        let identity = match self.identity {
            Some(assigned) => {
                if assigned != identity {
                    warn!(?assigned, ?identity, "Server changed identity, keeping first");
                }
                assigned
            }
            None => {
                info!(?identity, "Identity assigned");
                self.identity = Some(identity);
                identity
            }
        };

        let view = project_with_turn_hint(&snapshot, &identity, server_turn_hint);
        if !snapshot.players().is_empty() && *view.is_local_players_turn() != server_turn_hint {
            debug!(
                projected = *view.is_local_players_turn(),
                server_turn_hint, "Server turn hint differs from projection"
            );
        }

        let mut events = vec![SessionEvent::Updated {
            view: view.clone(),
            grid: snapshot.grid().clone(),
        }];
        if self.rematch.observe(&view, &identity) {
            events.push(SessionEvent::OfferRematch);
        }

        self.snapshot = Some(snapshot);
        self.view = Some(view);
        events
    }

    /// The transport terminated.
    ///
    /// Termination after the game finished is a normal teardown; before that
    /// it surfaces as a connection error.
    #[instrument(skip(self), fields(state = %self.state))]
    pub fn on_closed(&mut self) -> Vec<SessionEvent> {
        if self.is_closed() {
            return Vec::new();
        }
        let was_game_over = self
            .snapshot
            .as_ref()
            .is_some_and(GameSnapshot::is_game_over);

        if was_game_over {
            info!("Connection closed after game over");
            self.state = ConnectionState::Closed(CloseKind::Normal);
            vec![SessionEvent::Closed(CloseKind::Normal)]
        } else {
            warn!("Connection terminated unexpectedly");
            self.state = ConnectionState::Closed(CloseKind::Error);
            vec![
                SessionEvent::ConnectionError {
                    message: CONNECTION_TERMINATED_MESSAGE.to_string(),
                },
                SessionEvent::Closed(CloseKind::Error),
            ]
        }
    }

    /// The transport failed (including a failed handshake). Always surfaced.
    #[instrument(skip(self), fields(state = %self.state))]
    pub fn on_error(&mut self, reason: &str) -> Vec<SessionEvent> {
        if self.is_closed() {
            return Vec::new();
        }
        warn!(reason, "Connection error");
        self.state = ConnectionState::Closed(CloseKind::Error);
        vec![
            SessionEvent::ConnectionError {
                message: CONNECTION_TERMINATED_MESSAGE.to_string(),
            },
            SessionEvent::Closed(CloseKind::Error),
        ]
    }

    /// The local user ended the session.
    #[instrument(skip(self), fields(state = %self.state))]
    pub fn on_shutdown(&mut self) -> Vec<SessionEvent> {
        if self.is_closed() {
            return Vec::new();
        }
        info!("Session shut down locally");
        self.state = ConnectionState::Closed(CloseKind::Normal);
        vec![SessionEvent::Closed(CloseKind::Normal)]
    }

    /// Encodes an intent for transmission; `None` unless the session is open.
    #[instrument(skip(self), fields(state = %self.state))]
    pub fn send_move_intent(&self, intent: MoveIntent) -> Option<String> {
        if !self.is_open() {
            debug!("Not open, dropping intent");
            return None;
        }
        debug!(
            placement = intent.placement(),
            play_again = intent.is_play_again(),
            "Encoding intent"
        );
        match intent.encode() {
            Ok(frame) => Some(frame),
            Err(e) => {
                warn!(error = %e, "Failed to encode intent");
                None
            }
        }
    }

    /// User asked to drop a piece at column `x`, row `y`.
    ///
    /// Returns the move to transmit, or `None` when it is not this client's
    /// turn or the move is illegal on the current grid.
    #[instrument(skip(self))]
    pub fn request_move(&self, x: usize, y: usize) -> Option<OutgoingMove> {
        let (Some(snapshot), Some(view)) = (&self.snapshot, &self.view) else {
            debug!("No snapshot yet, ignoring move");
            return None;
        };
        if !*view.is_local_players_turn() {
            debug!("Not the local player's turn, ignoring move");
            return None;
        }
        match check_move(snapshot.grid(), x, y) {
            Ok(placement) => {
                info!(placement = placement.index, "Sending move");
                let frame = self.send_move_intent(MoveIntent::place(placement.index))?;
                Some(OutgoingMove { placement, frame })
            }
            Err(e) => {
                debug!(reason = %e, "Move rejected locally");
                None
            }
        }
    }

    /// User asked for a rematch.
    #[instrument(skip(self))]
    pub fn request_play_again(&self) -> Option<String> {
        info!("Requesting rematch");
        self.send_move_intent(MoveIntent::play_again())
    }
}
