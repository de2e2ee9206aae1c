//! Core domain types for the gravity-drop grid.

use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Index into the colour palette; cells use the owning player's index.
pub type ColorIndex = usize;

/// Wire value for an empty cell.
pub const EMPTY_WIRE_VALUE: i64 = -1;

/// A single cell of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Nothing has been dropped here.
    Empty,
    /// Occupied by the player with this colour index.
    Occupied(ColorIndex),
}

impl Cell {
    /// Decodes a wire cell value (`-1` empty, `0..` occupied).
    ///
    /// Returns `None` for values below `-1`.
    #[instrument]
    pub fn from_wire(value: i64) -> Option<Self> {
        match value {
            EMPTY_WIRE_VALUE => Some(Cell::Empty),
            v if v >= 0 => usize::try_from(v).ok().map(Cell::Occupied),
            _ => None,
        }
    }

    /// Encodes the cell as its wire value.
    pub fn to_wire(self) -> i64 {
        match self {
            Cell::Empty => EMPTY_WIRE_VALUE,
            Cell::Occupied(color) => color as i64,
        }
    }

    /// True if nothing occupies the cell.
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// Errors from grid queries and grid construction.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum GridError {
    /// Coordinates fall outside the grid.
    #[display("({x}, {y}) is outside the {cols}x{rows} grid")]
    OutOfBounds {
        /// Column queried.
        x: usize,
        /// Row queried.
        y: usize,
        /// Column count of the grid.
        cols: usize,
        /// Row count of the grid.
        rows: usize,
    },

    /// A linear placement index past the last cell.
    #[display("placement {placement} is outside a grid of {cells} cells")]
    PlacementOutOfRange {
        /// Placement queried.
        placement: usize,
        /// Total number of cells.
        cells: usize,
    },

    /// The wire encoding does not describe a rectangular, non-empty grid.
    #[display("malformed grid: {_0}")]
    Malformed(String),
}

impl std::error::Error for GridError {}
