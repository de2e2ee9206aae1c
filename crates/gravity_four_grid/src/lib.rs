//! Pure grid model and move rules for gravity_four.
//!
//! Nothing here touches the network: a [`Grid`] is decoded from a server
//! snapshot, queried, and thrown away when the next snapshot arrives.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod grid;
mod rules;
mod types;

pub use grid::Grid;
pub use rules::{MoveError, Placement, check_move, is_legal, legal_moves};
pub use types::{Cell, ColorIndex, EMPTY_WIRE_VALUE, GridError};
