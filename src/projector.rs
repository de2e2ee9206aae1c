//! Derives render-facing view state from the latest snapshot.

use crate::snapshot::{GameSnapshot, PlayerSlot, SessionIdentity};
use derive_getters::Getters;
use gravity_four_grid::ColorIndex;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Everything a render sink needs besides the grid itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ViewState {
    /// Roster index whose turn it is.
    active_player_index: Option<usize>,
    /// Seat held by this client, if any.
    local_player_index: Option<usize>,
    /// True only when this client is a seated player and it is their move.
    is_local_players_turn: bool,
    /// Round finished.
    is_game_over: bool,
    /// Server status line.
    status_message: String,
    /// Players in turn order.
    roster: Vec<PlayerSlot>,
    /// Roster entry to mark as active.
    highlighted_player_index: Option<usize>,
}

impl ViewState {
    /// Palette slot for this client's pieces.
    ///
    /// Servers that omit the roster still assign seats, so the seat number
    /// stands in for the colour.
    pub fn local_color_index(&self) -> Option<ColorIndex> {
        let seat = self.local_player_index?;
        Some(
            self.roster
                .get(seat)
                .map_or(seat, |slot| *slot.color_index()),
        )
    }
}

/// Projects a snapshot for the given identity.
///
/// Pure: identical inputs always yield an identical [`ViewState`]. Without a
/// roster there is no active player and the local turn is never set; use
/// [`project_with_turn_hint`] when the server's own turn flag is known.
pub fn project(snapshot: &GameSnapshot, identity: &SessionIdentity) -> ViewState {
    project_with_turn_hint(snapshot, identity, false)
}

/// Projects a snapshot, consulting the server's `playerTurn` flag when the
/// snapshot carries no roster.
///
/// With a roster the turn counter decides and the hint is ignored.
#[instrument(skip(snapshot), fields(turn = *snapshot.turn().turn_counter()))]
pub fn project_with_turn_hint(
    snapshot: &GameSnapshot,
    identity: &SessionIdentity,
    server_turn_hint: bool,
) -> ViewState {
    let active = snapshot.active_index();
    let is_game_over = snapshot.is_game_over();

    let seat_has_turn = if snapshot.players().is_empty() {
        server_turn_hint
    } else {
        active.is_some() && *identity.local_player_index() == active
    };
    let is_local_players_turn = !is_game_over && identity.is_participant() && seat_has_turn;

    debug!(?active, is_local_players_turn, is_game_over, "Projected view");

    ViewState {
        active_player_index: active,
        local_player_index: *identity.local_player_index(),
        is_local_players_turn,
        is_game_over,
        status_message: snapshot.status_message().clone(),
        roster: snapshot.players().clone(),
        highlighted_player_index: active,
    }
}

/// One-shot trigger for the "offer rematch" prompt.
///
/// Fires when a projected view flips from in-progress to game-over for a
/// seated player, and stays quiet while the game remains over. A later
/// in-progress view (a new round) re-arms it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RematchLatch {
    fired: bool,
}

impl RematchLatch {
    /// Creates an armed latch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the latest view; returns true exactly when the offer should be
    /// shown.
    #[instrument(skip(self, view), fields(fired = self.fired))]
    pub fn observe(&mut self, view: &ViewState, identity: &SessionIdentity) -> bool {
        if !view.is_game_over {
            self.fired = false;
            return false;
        }
        if self.fired || !identity.is_participant() {
            return false;
        }
        self.fired = true;
        debug!("Offering rematch");
        true
    }
}
