use core::ops::{Index, IndexMut};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Square grid of cells owned by a single game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Array2<Cell>,
    side: Coord,
}

impl Board {
    /// A board with no mines, nothing revealed and nothing flagged.
    pub fn empty(side: Coord) -> Self {
        let cells = Array2::from_shape_fn((side.into(), side.into()), |(x, y)| {
            Cell::new((x as Coord, y as Coord))
        });
        Self { cells, side }
    }

    /// Builds a board with mines at exactly the given positions.
    pub fn from_mine_coords(side: Coord, mine_coords: &[Coord2]) -> Result<Self> {
        if side == 0 {
            return Err(GameError::EmptyBoard);
        }

        let mut board = Self::empty(side);
        for &coords in mine_coords {
            board.validate_coords(coords)?;
            board[coords].has_mine = true;
        }
        board.compute_adjacency();
        Ok(board)
    }

    /// Fills in `adjacent_mines` for every safe cell.
    pub(crate) fn compute_adjacency(&mut self) {
        for x in 0..self.side {
            for y in 0..self.side {
                let coords = (x, y);
                let count = if self[coords].has_mine {
                    0
                } else {
                    self.neighbors(coords).filter(|&pos| self[pos].has_mine).count() as u8
                };
                self[coords].adjacent_mines = count;
            }
        }
    }

    pub fn side(&self) -> Coord {
        self.side
    }

    pub fn total_cells(&self) -> CellCount {
        square(self.side)
    }

    pub fn contains(&self, (x, y): Coord2) -> bool {
        x < self.side && y < self.side
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if self.contains(coords) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn neighbors(&self, coords: Coord2) -> Neighbors {
        Neighbors::new(coords, self.side)
    }

    /// All cells in row-major order (`y` outer, `x` inner).
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.t().into_iter()
    }

    /// One row of the board, left to right.
    pub fn row(&self, y: Coord) -> impl Iterator<Item = &Cell> {
        self.cells.column(y.into()).into_iter()
    }

    fn count_where(&self, pred: impl Fn(&Cell) -> bool) -> CellCount {
        self.cells.iter().filter(|cell| pred(*cell)).count() as CellCount
    }

    pub fn count_mines(&self) -> CellCount {
        self.count_where(|cell| cell.has_mine)
    }

    /// Mines the player has correctly flagged.
    pub fn count_flagged_mines(&self) -> CellCount {
        self.count_where(|cell| cell.has_mine && cell.is_flagged)
    }

    /// Mines that are neither revealed nor flagged.
    pub fn count_unrevealed_mines(&self) -> CellCount {
        self.count_where(|cell| cell.has_mine && cell.is_hidden())
    }

    pub fn count_unrevealed_cells(&self) -> CellCount {
        self.count_where(|cell| !cell.is_revealed)
    }

    pub fn count_flags(&self) -> CellCount {
        self.count_where(|cell| cell.is_flagged)
    }

    pub fn all_safe_revealed(&self) -> bool {
        self.cells.iter().all(|cell| cell.has_mine || cell.is_revealed)
    }

    pub fn all_mines_flagged(&self) -> bool {
        self.cells.iter().all(|cell| !cell.has_mine || cell.is_flagged)
    }
}

impl Index<Coord2> for Board {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}

impl IndexMut<Coord2> for Board {
    fn index_mut(&mut self, coords: Coord2) -> &mut Self::Output {
        &mut self.cells[coords.to_nd_index()]
    }
}
