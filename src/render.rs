//! Presentation boundary.
//!
//! A [`RenderSink`] receives what the session produces; user input comes
//! back as [`UserIntent`]s applied to a [`SessionClient`].

use crate::client::SessionClient;
use crate::projector::ViewState;
use crate::session::{CloseKind, SessionEvent};
use crate::transport::Connector;
use gravity_four_grid::{Grid, Placement};
use tracing::{debug, instrument};

/// Receives render commands from the session.
pub trait RenderSink {
    /// Draw a new view and board.
    fn render(&mut self, view: &ViewState, grid: &Grid);

    /// Show a connection failure.
    fn connection_error(&mut self, message: &str);

    /// Offer the local player a rematch.
    fn offer_rematch(&mut self);

    /// A move was sent and awaits the server's snapshot.
    fn move_sent(&mut self, _placement: Placement) {}

    /// The connection opened.
    fn opened(&mut self) {}

    /// The session ended.
    fn closed(&mut self, _kind: CloseKind) {}
}

/// Routes one session event to the matching sink call.
#[instrument(skip_all)]
pub fn dispatch<S: RenderSink + ?Sized>(sink: &mut S, event: &SessionEvent) {
    match event {
        SessionEvent::Opened => sink.opened(),
        SessionEvent::Updated { view, grid } => sink.render(view, grid),
        SessionEvent::OfferRematch => sink.offer_rematch(),
        SessionEvent::MoveSent(placement) => sink.move_sent(*placement),
        SessionEvent::ConnectionError { message } => sink.connection_error(message),
        SessionEvent::Closed(kind) => sink.closed(*kind),
    }
}

/// Something the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserIntent {
    /// Drop a piece at column `x`, row `y`.
    Move {
        /// Column.
        x: usize,
        /// Row, 0 at the top.
        y: usize,
    },
    /// Accept a rematch.
    PlayAgain,
}

impl UserIntent {
    /// Hands the intent to the session.
    #[instrument(skip(client))]
    pub fn apply<C: Connector>(self, client: &SessionClient<C>) {
        debug!("Applying user intent");
        match self {
            Self::Move { x, y } => client.request_move(x, y),
            Self::PlayAgain => client.request_play_again(),
        }
    }
}

/// A clickable board cell.
///
/// Coordinates are fixed when the target is built; clicking it always
/// requests that exact cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellTarget {
    x: usize,
    y: usize,
}

impl CellTarget {
    /// Target for column `x`, row `y`.
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Column.
    pub fn x(&self) -> usize {
        self.x
    }

    /// Row.
    pub fn y(&self) -> usize {
        self.y
    }

    /// Intent raised when this cell is activated.
    pub fn intent(&self) -> UserIntent {
        UserIntent::Move {
            x: self.x,
            y: self.y,
        }
    }
}

/// One target per cell, row-major from the top-left.
pub fn cell_targets(grid: &Grid) -> Vec<CellTarget> {
    let cols = grid.column_count();
    (0..grid.row_count())
        .flat_map(|y| (0..cols).map(move |x| CellTarget::new(x, y)))
        .collect()
}
