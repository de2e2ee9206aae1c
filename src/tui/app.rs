//! Application state for the terminal sink.

use gravity_four::{CellTarget, CloseKind, ColorIndex, Grid, Placement, RenderSink, ViewState};
use ratatui::layout::{Position, Rect};
use tracing::{debug, info};

/// Everything the terminal needs to draw a frame.
#[derive(Debug)]
pub struct App {
    game_id: String,
    player_name: String,
    view: Option<ViewState>,
    grid: Option<Grid>,
    cursor: (usize, usize),
    pending: Option<((usize, usize), ColorIndex)>,
    error: Option<String>,
    rematch_offered: bool,
    closed: Option<CloseKind>,
    hit_targets: Vec<(Rect, CellTarget)>,
}

impl App {
    /// Creates an app waiting for its first snapshot.
    pub fn new(game_id: impl Into<String>, player_name: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            player_name: player_name.into(),
            view: None,
            grid: None,
            cursor: (0, 0),
            pending: None,
            error: None,
            rematch_offered: false,
            closed: None,
            hit_targets: Vec::new(),
        }
    }

    /// Game being played.
    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    /// Name this client joined with.
    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    /// Latest projected view.
    pub fn view(&self) -> Option<&ViewState> {
        self.view.as_ref()
    }

    /// Latest board.
    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    /// Keyboard cursor as `(x, y)`.
    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    /// Moves the keyboard cursor.
    pub fn set_cursor(&mut self, cursor: (usize, usize)) {
        self.cursor = cursor;
    }

    /// Cell of a sent move the server has not confirmed yet, with the colour
    /// to paint it in.
    pub fn pending_move(&self) -> Option<((usize, usize), ColorIndex)> {
        self.pending
    }

    /// Colour to tint the cursor with; only while the local player may move.
    pub fn preview_color(&self) -> Option<ColorIndex> {
        let view = self.view.as_ref()?;
        if !*view.is_local_players_turn() {
            return None;
        }
        view.local_color_index()
    }

    /// True while a rematch offer is waiting for an answer.
    pub fn rematch_offered(&self) -> bool {
        self.rematch_offered
    }

    /// Consumes a pending rematch offer; returns whether there was one.
    pub fn take_rematch_offer(&mut self) -> bool {
        std::mem::take(&mut self.rematch_offered)
    }

    /// True if the last error should be drawn in the status line.
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Records where each cell was drawn for mouse hit testing.
    pub fn set_hit_targets(&mut self, targets: Vec<(Rect, CellTarget)>) {
        self.hit_targets = targets;
    }

    /// Cell drawn under the terminal position `(column, row)`.
    pub fn target_at(&self, column: u16, row: u16) -> Option<CellTarget> {
        let position = Position::new(column, row);
        self.hit_targets
            .iter()
            .find(|(area, _)| area.contains(position))
            .map(|(_, target)| *target)
    }

    /// Text for the status line.
    pub fn status_line(&self) -> String {
        if let Some(error) = &self.error {
            return format!("{error} Press q to quit.");
        }
        let Some(view) = &self.view else {
            return format!("Connecting to game {}...", self.game_id);
        };

        let mut line = view.status_message().clone();
        if self.rematch_offered() {
            line.push_str("  Press r for a rematch.");
        } else if *view.is_local_players_turn() {
            line.push_str("  Your move.");
        }
        if self.closed.is_some() {
            line.push_str("  Connection closed. Press q to quit.");
        }
        line
    }
}

impl RenderSink for App {
    fn render(&mut self, view: &ViewState, grid: &Grid) {
        let (x, y) = self.cursor;
        let clamped = (
            x.min(grid.column_count() - 1),
            y.min(grid.row_count() - 1),
        );
        if self.grid.is_none() {
            // Start on the bottom row where the first moves land.
            self.cursor = (clamped.0, grid.row_count() - 1);
        } else {
            self.cursor = clamped;
        }
        if !*view.is_game_over() {
            self.rematch_offered = false;
        }
        self.pending = None;
        debug!(cursor = ?self.cursor, "Rendering update");
        self.view = Some(view.clone());
        self.grid = Some(grid.clone());
    }

    fn connection_error(&mut self, message: &str) {
        info!(message, "Showing connection error");
        self.error = Some(message.to_string());
        self.rematch_offered = false;
    }

    fn move_sent(&mut self, placement: Placement) {
        let Some(color) = self.view.as_ref().and_then(ViewState::local_color_index) else {
            return;
        };
        debug!(placement = placement.index, "Painting pending move");
        self.pending = Some(((placement.x, placement.y), color));
    }

    fn offer_rematch(&mut self) {
        self.rematch_offered = true;
    }

    fn closed(&mut self, kind: CloseKind) {
        self.closed = Some(kind);
        self.rematch_offered = false;
    }
}
