use alloc::vec::Vec;
use rand::prelude::*;
use rand::rngs::SmallRng;

use super::*;

/// Places mines uniformly at random: shuffles every linear position and mines the first `config.mines`.
#[derive(Clone, Debug)]
pub struct RandomBoardGenerator {
    rng: SmallRng,
}

impl RandomBoardGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl BoardGenerator for RandomBoardGenerator {
    fn generate(&mut self, config: GameConfig) -> Board {
        let total_cells = config.total_cells();

        debug_assert!(config.side > 0, "board side must be positive");
        debug_assert!(
            config.mines <= total_cells,
            "requested {} mines but only {} cells",
            config.mines,
            total_cells
        );
        if config.mines > total_cells {
            log::error!(
                "Requested {} mines but the board only fits {}, filling it",
                config.mines,
                total_cells
            );
        }

        let mut board = Board::empty(config.side);
        let mut positions: Vec<CellCount> = (0..total_cells).collect();
        positions.shuffle(&mut self.rng);

        for &index in positions.iter().take(config.mines.into()) {
            board[from_linear(index, config.side)].has_mine = true;
        }
        board.compute_adjacency();

        log::debug!(
            "Generated {}x{} board with {} mines",
            config.side,
            config.side,
            board.count_mines()
        );
        board
    }
}
