#![no_std]

extern crate alloc;

use serde::{Deserialize, Serialize};

pub use board::*;
pub use cell::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use types::*;

mod board;
mod cell;
mod engine;
mod error;
mod generator;
mod types;

/// Board side length and mine count for a new game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub side: Coord,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(side: Coord, mines: CellCount) -> Self {
        Self { side, mines }
    }

    pub fn new(side: Coord, mines: CellCount) -> Result<Self> {
        if side == 0 {
            return Err(GameError::EmptyBoard);
        }
        if mines > square(side) {
            return Err(GameError::TooManyMines);
        }
        Ok(Self::new_unchecked(side, mines))
    }

    pub const fn total_cells(&self) -> CellCount {
        square(self.side)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    /// The game is already over.
    Finished,
    AlreadyRevealed,
    /// The cell was flagged; the flag was removed instead of revealing it.
    Unflagged,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            Finished => false,
            AlreadyRevealed => false,
            Unflagged => true,
            Revealed => true,
            HitMine => true,
            Won => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlagOutcome {
    Finished,
    NoChange,
    Flagged,
    Unflagged,
    Won,
}

impl FlagOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::Finished | Self::NoChange)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Timer stopped or game finished, nothing counted.
    Idle,
    Ticked,
    TimedOut,
}
