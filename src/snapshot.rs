//! Synchronized game state as pushed by the server.

use derive_getters::Getters;
use derive_new::new;
use gravity_four_grid::{ColorIndex, Grid};
use serde::{Deserialize, Serialize};

/// One seat in the roster. Order defines turn rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct PlayerSlot {
    /// Position in the roster, stable for the session.
    index: usize,
    /// Name the player joined with.
    display_name: String,
    /// Colour used for this player's pieces.
    color_index: ColorIndex,
}

/// Turn bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct TurnState {
    /// Number of moves played this round.
    turn_counter: u64,
    /// Set by the server once the round is decided.
    is_game_over: bool,
}

impl TurnState {
    /// Roster index whose turn it is, `None` for an empty roster.
    pub fn active_index(&self, player_count: usize) -> Option<usize> {
        if player_count == 0 {
            return None;
        }
        usize::try_from(self.turn_counter % player_count as u64).ok()
    }
}

/// Who this client is, as assigned by the server on join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct SessionIdentity {
    /// Seat in the roster; `None` for viewers without a seat.
    local_player_index: Option<usize>,
    /// Connected as a viewer.
    is_spectator: bool,
}

impl SessionIdentity {
    /// A participant holding the given roster seat.
    pub fn player(index: usize) -> Self {
        Self {
            local_player_index: Some(index),
            is_spectator: false,
        }
    }

    /// A viewer with no turn slot.
    pub fn spectator() -> Self {
        Self {
            local_player_index: None,
            is_spectator: true,
        }
    }

    /// True if this client takes turns.
    pub fn is_participant(&self) -> bool {
        !self.is_spectator && self.local_player_index.is_some()
    }
}

/// The atomic unit of synchronization. Replaces the previous snapshot
/// wholesale on arrival.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct GameSnapshot {
    /// Board contents.
    grid: Grid,
    /// Roster in turn order.
    players: Vec<PlayerSlot>,
    /// Turn counter and game-over flag.
    turn: TurnState,
    /// Human-readable status from the server.
    status_message: String,
}

impl GameSnapshot {
    /// Roster index whose turn it is.
    pub fn active_index(&self) -> Option<usize> {
        self.turn.active_index(self.players.len())
    }

    /// Shortcut for the game-over flag.
    pub fn is_game_over(&self) -> bool {
        self.turn.is_game_over
    }
}
