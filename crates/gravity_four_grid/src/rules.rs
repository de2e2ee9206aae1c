//! Gravity placement rules.
//!
//! A piece may only rest on the floor (the bottom row) or on top of another
//! piece. The server re-validates every move; these checks exist so the
//! client never transmits a move it already knows is illegal.

use crate::grid::Grid;
use crate::types::Cell;
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// A move that passed [`check_move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, new)]
pub struct Placement {
    /// Column.
    pub x: usize,
    /// Row.
    pub y: usize,
    /// Row-major index sent to the server.
    pub index: usize,
}

/// Reason a move was rejected locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// Coordinates fall outside the grid.
    #[display("({x}, {y}) is off the board")]
    OutOfBounds {
        /// Column.
        x: usize,
        /// Row.
        y: usize,
    },

    /// The target cell already holds a piece.
    #[display("({x}, {y}) is already occupied")]
    Occupied {
        /// Column.
        x: usize,
        /// Row.
        y: usize,
    },

    /// Nothing lies directly beneath the target cell.
    #[display("({x}, {y}) has nothing beneath it")]
    Unsupported {
        /// Column.
        x: usize,
        /// Row.
        y: usize,
    },
}

impl std::error::Error for MoveError {}

/// Checks a move at column `x`, row `y` against the bounds, empty-target
/// and gravity-support rules, in that order.
#[instrument(skip(grid))]
pub fn check_move(grid: &Grid, x: usize, y: usize) -> Result<Placement, MoveError> {
    let target = grid
        .cell_at(x, y)
        .map_err(|_| MoveError::OutOfBounds { x, y })?;

    if target != Cell::Empty {
        debug!("Target cell occupied");
        return Err(MoveError::Occupied { x, y });
    }

    let bottom = grid.row_count() - 1;
    if y < bottom {
        let below = grid
            .cell_at(x, y + 1)
            .map_err(|_| MoveError::OutOfBounds { x, y })?;
        if below.is_empty() {
            debug!("Target cell unsupported");
            return Err(MoveError::Unsupported { x, y });
        }
    }

    let index = grid
        .linear_placement_index(x, y)
        .map_err(|_| MoveError::OutOfBounds { x, y })?;
    Ok(Placement::new(x, y, index))
}

/// True if a piece may be placed at column `x`, row `y`.
pub fn is_legal(grid: &Grid, x: usize, y: usize) -> bool {
    check_move(grid, x, y).is_ok()
}

/// Every legal placement, at most one per column, ordered by column.
#[instrument(skip(grid))]
pub fn legal_moves(grid: &Grid) -> Vec<Placement> {
    (0..grid.column_count())
        .filter_map(|x| {
            let y = grid.landing_row(x)?;
            check_move(grid, x, y).ok()
        })
        .collect()
}
