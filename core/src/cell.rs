use serde::{Deserialize, Serialize};

use crate::Coord2;

/// One square of the board, as seen by the engine.
///
/// `adjacent_mines` only carries meaning for safe cells; mined cells keep `0`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub position: Coord2,
    pub has_mine: bool,
    pub is_revealed: bool,
    pub is_flagged: bool,
    pub adjacent_mines: u8,
}

impl Cell {
    pub const fn new(position: Coord2) -> Self {
        Self {
            position,
            has_mine: false,
            is_revealed: false,
            is_flagged: false,
            adjacent_mines: 0,
        }
    }

    /// Neither revealed nor flagged.
    pub const fn is_hidden(&self) -> bool {
        !self.is_revealed && !self.is_flagged
    }

    /// A closed safe cell, flagged or not.
    pub(crate) const fn is_fillable(&self) -> bool {
        !self.is_revealed && !self.has_mine
    }
}
