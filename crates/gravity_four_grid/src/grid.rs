//! Immutable grid model.
//!
//! A [`Grid`] is built once per server snapshot and never edited in place.
//! Row 0 is the top of the board; pieces fall toward the highest row index.

use crate::types::{Cell, GridError};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// A `rows x cols` board stored in row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<i64>>", into = "Vec<Vec<i64>>")]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates an all-empty grid.
    #[instrument]
    pub fn empty(rows: usize, cols: usize) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::Malformed(format!(
                "grid must have at least one row and column, got {rows}x{cols}"
            )));
        }
        Ok(Self {
            rows,
            cols,
            cells: vec![Cell::Empty; rows * cols],
        })
    }

    /// Builds a grid from its wire encoding, one inner vector per row.
    ///
    /// Rejects ragged rows, zero-sized grids and cell values below `-1`.
    #[instrument(skip(wire), fields(rows = wire.len()))]
    pub fn from_wire(wire: &[Vec<i64>]) -> Result<Self, GridError> {
        let rows = wire.len();
        let cols = wire.first().map(Vec::len).unwrap_or(0);
        let mut grid = Self::empty(rows, cols)?;

        for (y, row) in wire.iter().enumerate() {
            if row.len() != cols {
                return Err(GridError::Malformed(format!(
                    "row {y} has {} cells, expected {cols}",
                    row.len()
                )));
            }
            for (x, &value) in row.iter().enumerate() {
                let cell = Cell::from_wire(value).ok_or_else(|| {
                    GridError::Malformed(format!("invalid cell value {value} at ({x}, {y})"))
                })?;
                grid.cells[y * cols + x] = cell;
            }
        }

        debug!(rows, cols, "Decoded grid");
        Ok(grid)
    }

    /// Encodes the grid back into its wire representation.
    pub fn to_wire(&self) -> Vec<Vec<i64>> {
        self.rows()
            .map(|row| row.iter().map(|cell| cell.to_wire()).collect())
            .collect()
    }

    /// Number of columns (grid width).
    pub fn column_count(&self) -> usize {
        self.cols
    }

    /// Number of rows (grid height).
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Returns the cell at column `x`, row `y`.
    pub fn cell_at(&self, x: usize, y: usize) -> Result<Cell, GridError> {
        self.check_bounds(x, y)?;
        Ok(self.cells[y * self.cols + x])
    }

    /// Row-major placement index used on the wire: `x + y * columns`.
    pub fn linear_placement_index(&self, x: usize, y: usize) -> Result<usize, GridError> {
        self.check_bounds(x, y)?;
        Ok(x + y * self.cols)
    }

    /// Inverse of [`Grid::linear_placement_index`].
    pub fn placement_coordinates(&self, placement: usize) -> Result<(usize, usize), GridError> {
        if placement >= self.cells.len() {
            return Err(GridError::PlacementOutOfRange {
                placement,
                cells: self.cells.len(),
            });
        }
        Ok((placement % self.cols, placement / self.cols))
    }

    /// Row a piece dropped into column `x` would come to rest in.
    ///
    /// `None` when the column is full or does not exist.
    #[instrument(skip(self))]
    pub fn landing_row(&self, x: usize) -> Option<usize> {
        if x >= self.cols {
            return None;
        }
        (0..self.rows)
            .rev()
            .find(|&y| self.cells[y * self.cols + x].is_empty())
    }

    /// True once every cell is occupied.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| !cell.is_empty())
    }

    /// Iterates rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.cols)
    }

    fn check_bounds(&self, x: usize, y: usize) -> Result<(), GridError> {
        if x >= self.cols || y >= self.rows {
            return Err(GridError::OutOfBounds {
                x,
                y,
                cols: self.cols,
                rows: self.rows,
            });
        }
        Ok(())
    }
}

impl TryFrom<Vec<Vec<i64>>> for Grid {
    type Error = GridError;

    fn try_from(wire: Vec<Vec<i64>>) -> Result<Self, Self::Error> {
        Self::from_wire(&wire)
    }
}

impl From<Grid> for Vec<Vec<i64>> {
    fn from(grid: Grid) -> Self {
        grid.to_wire()
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (y, row) in self.rows().enumerate() {
            if y > 0 {
                writeln!(f)?;
            }
            for cell in row {
                match cell {
                    Cell::Empty => write!(f, ".")?,
                    Cell::Occupied(color) => write!(f, "{color}")?,
                }
            }
        }
        Ok(())
    }
}
