//! JSON wire protocol.
//!
//! Server → client frames look like:
//!
//! ```json
//! { "message": "Your Turn.", "playerIndex": 0, "playerTurn": true,
//!   "game": { "grid": [[-1, ...], ...], "isOver": false, "turn": 0,
//!             "players": [{ "name": "alice" }, { "name": "bob" }] } }
//! ```
//!
//! Frames without a `message` key carry no game content and are ignored.
//! Client → server frames are `{ "placement": n }` for a move and
//! `{ "placement": -1, "playAgain": true }` to ask for a rematch.

use crate::snapshot::{GameSnapshot, PlayerSlot, SessionIdentity, TurnState};
use derive_getters::Getters;
use gravity_four_grid::Grid;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// `playerIndex` value the server uses for viewers.
pub const SPECTATOR_PLAYER_INDEX: i64 = -1;

/// Decoding or encoding failure.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ProtocolError {
    /// The frame is not JSON at all.
    #[display("frame is not valid JSON: {_0}")]
    InvalidJson(String),

    /// A game frame is missing fields or carries impossible values.
    #[display("malformed message: {_0}")]
    MalformedMessage(String),

    /// An intent could not be serialized.
    #[display("failed to encode intent: {_0}")]
    Encode(String),
}

impl std::error::Error for ProtocolError {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerMessage {
    message: String,
    #[serde(default = "spectator_index")]
    player_index: i64,
    #[serde(default)]
    player_turn: bool,
    #[serde(default)]
    is_spectator: bool,
    game: WireGame,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireGame {
    grid: Grid,
    #[serde(default)]
    is_over: bool,
    turn: u64,
    #[serde(default)]
    players: Vec<WirePlayer>,
}

#[derive(Debug, Deserialize)]
struct WirePlayer {
    name: String,
}

fn spectator_index() -> i64 {
    SPECTATOR_PLAYER_INDEX
}

/// A fully decoded game frame.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct ServerUpdate {
    /// Replacement game state.
    snapshot: GameSnapshot,
    /// Identity the server assigned to this connection.
    identity: SessionIdentity,
    /// The server's own opinion of whether it is this client's turn.
    server_turn_hint: bool,
}

impl ServerUpdate {
    /// Splits the update into its parts.
    pub fn into_parts(self) -> (GameSnapshot, SessionIdentity, bool) {
        (self.snapshot, self.identity, self.server_turn_hint)
    }
}

/// Outcome of decoding one inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A complete snapshot.
    Update(Box<ServerUpdate>),
    /// Keepalive or otherwise content-free frame.
    Ignored,
}

/// Decodes one text frame from the server.
///
/// Non-object JSON and objects without a `message` key are
/// [`Inbound::Ignored`]; a frame that has `message` but a broken payload is
/// [`ProtocolError::MalformedMessage`]. Either way nothing is partially
/// applied: a snapshot is returned only once every field has been validated.
#[instrument(skip(text), fields(len = text.len()))]
pub fn decode_server_frame(text: &str) -> Result<Inbound, ProtocolError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| ProtocolError::InvalidJson(e.to_string()))?;

    let has_message = value
        .as_object()
        .is_some_and(|object| object.contains_key("message"));
    if !has_message {
        debug!("Frame has no message key, ignoring");
        return Ok(Inbound::Ignored);
    }

    let raw: ServerMessage = serde_json::from_value(value)
        .map_err(|e| ProtocolError::MalformedMessage(e.to_string()))?;

    let identity = match raw.player_index {
        SPECTATOR_PLAYER_INDEX => SessionIdentity::spectator(),
        _ if raw.is_spectator => SessionIdentity::spectator(),
        index => {
            let index = usize::try_from(index).map_err(|_| {
                ProtocolError::MalformedMessage(format!("invalid playerIndex {index}"))
            })?;
            SessionIdentity::player(index)
        }
    };

    let players = raw
        .game
        .players
        .into_iter()
        .enumerate()
        .map(|(index, player)| PlayerSlot::new(index, player.name, index))
        .collect();

    let snapshot = GameSnapshot::new(
        raw.game.grid,
        players,
        TurnState::new(raw.game.turn, raw.game.is_over),
        raw.message,
    );

    debug!(
        turn = raw.game.turn,
        is_over = raw.game.is_over,
        player_index = raw.player_index,
        "Decoded server frame"
    );

    Ok(Inbound::Update(Box::new(ServerUpdate {
        snapshot,
        identity,
        server_turn_hint: raw.player_turn,
    })))
}

/// Client → server intent. Fire-and-forget: the next snapshot is the only
/// confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveIntent {
    placement: i64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    play_again: bool,
}

impl MoveIntent {
    /// Placement value that tags a rematch request rather than a move.
    pub const PLAY_AGAIN_PLACEMENT: i64 = -1;

    /// A move at the given row-major placement index.
    pub fn place(placement: usize) -> Self {
        Self {
            placement: placement as i64,
            play_again: false,
        }
    }

    /// A request to start a new round with the same roster.
    pub fn play_again() -> Self {
        Self {
            placement: Self::PLAY_AGAIN_PLACEMENT,
            play_again: true,
        }
    }

    /// Raw placement value.
    pub fn placement(&self) -> i64 {
        self.placement
    }

    /// True for rematch requests.
    pub fn is_play_again(&self) -> bool {
        self.play_again
    }

    /// Serializes the intent into a text frame.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Encode(e.to_string()))
    }
}
