use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};

use crate::*;

/// Why a game was lost.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossReason {
    SteppedOnMine(Coord2),
    TimeLimit(u32),
}

impl fmt::Display for LossReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            // shown 1-indexed
            Self::SteppedOnMine((x, y)) => {
                write!(f, "stepped on a mine at ({}, {})", u16::from(x) + 1, u16::from(y) + 1)
            }
            Self::TimeLimit(secs) => write!(f, "time limit of {} seconds reached", secs),
        }
    }
}

/// Valid transitions:
/// - InProgress -> Won
/// - InProgress -> Lost
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    InProgress,
    Won,
    Lost(LossReason),
}

impl GameState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost(_))
    }

    pub const fn loss_reason(self) -> Option<LossReason> {
        match self {
            Self::Lost(reason) => Some(reason),
            _ => None,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::InProgress
    }
}

/// A cell the player acted on, with the second it was first touched.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub coords: Coord2,
    pub elapsed_secs: u32,
}

/// End-of-game figures used for the result record.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub elapsed_secs: u32,
    pub won: bool,
    pub loss_reason: Option<LossReason>,
    /// Mines counted as found; every mine when the game was won.
    pub flagged_mines: CellCount,
    /// Mines left neither revealed nor flagged; zero when the game was won.
    pub unrevealed_mines: CellCount,
}

/// Represents a game from start to finish.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEngine {
    config: GameConfig,
    board: Board,
    max_time_secs: u32,
    elapsed_secs: u32,
    state: GameState,
    timer_running: bool,
    moves: Vec<Move>,
}

impl GameEngine {
    pub fn new_game<G: BoardGenerator>(generator: &mut G, config: GameConfig, max_time_secs: u32) -> Self {
        Self::from_board(generator.generate(config), max_time_secs)
    }

    /// Starts a game on a prepared board.
    pub fn from_board(board: Board, max_time_secs: u32) -> Self {
        let config = GameConfig::new_unchecked(board.side(), board.count_mines());
        log::debug!(
            "New game {}x{}, {} mines, {}s limit",
            config.side,
            config.side,
            config.mines,
            max_time_secs
        );
        Self {
            config,
            board,
            max_time_secs,
            elapsed_secs: 0,
            state: GameState::InProgress,
            timer_running: true,
            moves: Vec::new(),
        }
    }

    /// Replaces this game with a fresh board using the same parameters.
    pub fn reset<G: BoardGenerator>(&mut self, generator: &mut G) {
        *self = Self::new_game(generator, self.config, self.max_time_secs);
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn cell_at(&self, coords: Coord2) -> Cell {
        self.board[self.expect_coords(coords)]
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub fn max_time_secs(&self) -> u32 {
        self.max_time_secs
    }

    pub fn timer_running(&self) -> bool {
        self.timer_running
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn count_mines(&self) -> CellCount {
        self.board.count_mines()
    }

    pub fn count_flagged_mines(&self) -> CellCount {
        self.board.count_flagged_mines()
    }

    pub fn count_unrevealed_mines(&self) -> CellCount {
        self.board.count_unrevealed_mines()
    }

    pub fn count_unrevealed_cells(&self) -> CellCount {
        self.board.count_unrevealed_cells()
    }

    /// How many mines have not been flagged yet, negative when over-flagged.
    pub fn mines_left(&self) -> i32 {
        i32::from(self.board.count_mines()) - i32::from(self.board.count_flags())
    }

    pub fn summary(&self) -> GameSummary {
        let won = matches!(self.state, GameState::Won);
        GameSummary {
            elapsed_secs: self.elapsed_secs,
            won,
            loss_reason: self.state.loss_reason(),
            flagged_mines: if won {
                self.count_mines()
            } else {
                self.count_flagged_mines()
            },
            unrevealed_mines: if won { 0 } else { self.count_unrevealed_mines() },
        }
    }

    pub fn reveal_cell(&mut self, coords: Coord2) -> RevealOutcome {
        use RevealOutcome::*;

        let coords = self.expect_coords(coords);
        if self.state.is_finished() {
            return Finished;
        }
        self.record_move(coords);

        let cell = self.board[coords];
        if cell.is_revealed {
            log::debug!("Cell {:?} already revealed", coords);
            return AlreadyRevealed;
        }
        if cell.is_flagged {
            self.board[coords].is_flagged = false;
            log::debug!("Unflagged {:?} instead of revealing", coords);
            return Unflagged;
        }

        self.board[coords].is_revealed = true;
        log::debug!("Reveal {:?}, adjacent mines: {}", coords, cell.adjacent_mines);

        if cell.has_mine {
            self.end_game(GameState::Lost(LossReason::SteppedOnMine(coords)));
            return HitMine;
        }
        if cell.adjacent_mines == 0 {
            self.flood_fill(coords);
        }

        if self.check_won() { Won } else { Revealed }
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> FlagOutcome {
        use FlagOutcome::*;

        let coords = self.expect_coords(coords);
        if self.state.is_finished() {
            return Finished;
        }
        self.record_move(coords);

        let cell = &mut self.board[coords];
        if cell.is_revealed {
            return NoChange;
        }
        cell.is_flagged = !cell.is_flagged;
        let flagged = cell.is_flagged;

        if self.check_won() {
            Won
        } else if flagged {
            Flagged
        } else {
            Unflagged
        }
    }

    /// Counts one second of play; the host calls this once per second while the game runs.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.timer_running || self.state.is_finished() {
            return TickOutcome::Idle;
        }

        self.elapsed_secs = self.elapsed_secs.saturating_add(1);
        if self.elapsed_secs >= self.max_time_secs {
            self.end_game(GameState::Lost(LossReason::TimeLimit(self.max_time_secs)));
            TickOutcome::TimedOut
        } else {
            TickOutcome::Ticked
        }
    }

    /// Stops counting time. Calling it again has no effect.
    pub fn stop_timer(&mut self) {
        if self.timer_running {
            log::debug!("Timer stopped at {}s", self.elapsed_secs);
            self.timer_running = false;
        }
    }

    /// Opens the zero region around `start`, plus the numbered cells bordering it.
    ///
    /// A flagged safe cell met by the fill loses its flag but stays closed, the same
    /// as a direct reveal of a flagged cell, and the fill does not continue through it.
    fn flood_fill(&mut self, start: Coord2) {
        let mut to_visit: Vec<Coord2> = self.fillable_neighbors(start).collect();
        let mut unflagged: Vec<Coord2> = Vec::new();
        log::trace!("Starting flood-fill from {:?}, initial neighbors: {:?}", start, to_visit);

        while let Some(coords) = to_visit.pop() {
            let cell = &mut self.board[coords];
            // queued more than once
            if !cell.is_fillable() || unflagged.contains(&coords) {
                continue;
            }
            if cell.is_flagged {
                cell.is_flagged = false;
                unflagged.push(coords);
                log::trace!("Flood unflagged {:?}", coords);
                continue;
            }

            cell.is_revealed = true;
            let count = cell.adjacent_mines;
            log::trace!("Flood opened {:?}, adjacent mines: {}", coords, count);

            if count == 0 {
                to_visit.extend(self.fillable_neighbors(coords));
            }
        }
    }

    fn fillable_neighbors(&self, coords: Coord2) -> impl Iterator<Item = Coord2> + '_ {
        self.board
            .neighbors(coords)
            .filter(|&pos| self.board[pos].is_fillable())
    }

    /// Either every safe cell is open or every mine is flagged.
    fn check_won(&mut self) -> bool {
        if self.board.all_safe_revealed() || self.board.all_mines_flagged() {
            self.end_game(GameState::Won);
            true
        } else {
            false
        }
    }

    fn end_game(&mut self, state: GameState) {
        if self.state.is_finished() {
            return;
        }
        log::debug!("Game ended at {}s: {:?}", self.elapsed_secs, state);
        self.state = state;
        self.stop_timer();
    }

    fn record_move(&mut self, coords: Coord2) {
        if self.moves.iter().all(|m| m.coords != coords) {
            self.moves.push(Move {
                coords,
                elapsed_secs: self.elapsed_secs,
            });
        }
    }

    fn expect_coords(&self, coords: Coord2) -> Coord2 {
        assert!(
            self.board.contains(coords),
            "coordinates {:?} outside {}x{} board",
            coords,
            self.board.side(),
            self.board.side()
        );
        coords
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    fn engine(side: Coord, mines: &[Coord2], max_time_secs: u32) -> GameEngine {
        GameEngine::from_board(Board::from_mine_coords(side, mines).unwrap(), max_time_secs)
    }

    #[test]
    fn reveal_hits_mine_and_stops_timer() {
        let mut engine = engine(2, &[(0, 0)], 60);

        assert_eq!(engine.reveal_cell((0, 0)), RevealOutcome::HitMine);
        assert_eq!(
            engine.state(),
            GameState::Lost(LossReason::SteppedOnMine((0, 0)))
        );
        assert!(!engine.timer_running());
        assert_eq!(engine.tick(), TickOutcome::Idle);
        assert_eq!(engine.elapsed_secs(), 0);
    }

    #[test]
    fn loss_reasons_are_one_indexed() {
        assert_eq!(
            LossReason::SteppedOnMine((2, 4)).to_string(),
            "stepped on a mine at (3, 5)"
        );
        assert_eq!(
            LossReason::TimeLimit(120).to_string(),
            "time limit of 120 seconds reached"
        );
    }

    #[test]
    fn corner_flood_fill_stops_at_mine() {
        // (0,0) has no mined neighbors only if (1,1) is safe, so the mine
        // bordering (1,0) and (0,1) sits one step further out at (2,1).
        let mines = [(2, 1), (4, 4), (5, 0), (0, 5), (3, 5)];
        let mut engine = engine(6, &mines, 120);
        assert_eq!(engine.cell_at((0, 0)).adjacent_mines, 0);
        assert_eq!(engine.cell_at((1, 0)).adjacent_mines, 1);

        assert_eq!(engine.reveal_cell((0, 0)), RevealOutcome::Revealed);

        for pos in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert!(engine.cell_at(pos).is_revealed, "{:?} should be open", pos);
        }
        for &mine in &mines {
            assert!(!engine.cell_at(mine).is_revealed);
        }
        // (1,0) borders the mine, so the fill does not pass through it
        assert!(!engine.cell_at((2, 0)).is_revealed);
        assert_eq!(engine.count_unrevealed_cells(), 20);
    }

    #[test]
    fn corner_with_mine_diagonal_reveals_single_cell() {
        let mines = [(1, 1), (4, 4), (5, 0), (0, 5), (3, 5)];
        let mut engine = engine(6, &mines, 120);
        assert_eq!(engine.cell_at((0, 0)).adjacent_mines, 1);

        assert_eq!(engine.reveal_cell((0, 0)), RevealOutcome::Revealed);

        assert!(engine.cell_at((0, 0)).is_revealed);
        assert!(!engine.cell_at((1, 0)).is_revealed);
        assert!(!engine.cell_at((0, 1)).is_revealed);
        assert!(!engine.cell_at((1, 1)).is_revealed);
    }

    #[test]
    fn flood_fill_opens_zero_region_and_border_only() {
        let mut engine = engine(3, &[(2, 2)], 60);

        assert_eq!(engine.reveal_cell((0, 0)), RevealOutcome::Won);
        assert!(engine.cell_at((0, 0)).is_revealed);
        assert_eq!(engine.cell_at((1, 1)).adjacent_mines, 1);
        assert!(engine.cell_at((1, 1)).is_revealed);
        assert!(!engine.cell_at((2, 2)).is_revealed);
        assert_eq!(engine.state(), GameState::Won);
    }

    #[test]
    fn flood_fill_never_reveals_mines() {
        let mines = [(3, 0), (3, 1), (3, 2), (3, 3), (0, 3), (1, 3), (2, 3)];
        let mut engine = engine(6, &mines, 60);

        assert_eq!(engine.reveal_cell((5, 5)), RevealOutcome::Revealed);

        for &mine in &mines {
            assert!(!engine.cell_at(mine).is_revealed);
        }
        // the enclosed corner stays shut
        for pos in [(0, 0), (1, 1), (2, 2)] {
            assert!(!engine.cell_at(pos).is_revealed);
        }
        assert!(engine.cell_at((4, 0)).is_revealed);
        assert!(engine.cell_at((0, 4)).is_revealed);
    }

    #[test]
    fn flood_fill_clears_flags_without_opening_them() {
        let mut engine = engine(4, &[(3, 3)], 60);
        engine.toggle_flag((1, 1));
        engine.toggle_flag((0, 3));

        assert_eq!(engine.reveal_cell((0, 0)), RevealOutcome::Revealed);

        for coords in [(1, 1), (0, 3)] {
            let cell = engine.cell_at(coords);
            assert!(!cell.is_flagged && !cell.is_revealed, "{:?}", coords);
        }
        assert_eq!(engine.board().count_flags(), 0);
        // the mine and the two formerly flagged cells
        assert_eq!(engine.count_unrevealed_cells(), 3);
        assert_eq!(engine.state(), GameState::InProgress);

        assert_eq!(engine.reveal_cell((1, 1)), RevealOutcome::Revealed);
        assert_eq!(engine.reveal_cell((0, 3)), RevealOutcome::Won);
    }

    #[test]
    fn revealing_a_flag_removes_it() {
        let mut engine = engine(3, &[(2, 2)], 60);
        assert_eq!(engine.toggle_flag((0, 0)), FlagOutcome::Flagged);

        assert_eq!(engine.reveal_cell((0, 0)), RevealOutcome::Unflagged);

        let cell = engine.cell_at((0, 0));
        assert!(!cell.is_flagged && !cell.is_revealed);
        assert_eq!(engine.state(), GameState::InProgress);
    }

    #[test]
    fn revealing_twice_reports_already_revealed() {
        let mut engine = engine(3, &[(0, 0), (2, 2)], 60);
        assert_eq!(engine.reveal_cell((1, 1)), RevealOutcome::Revealed);

        let before = engine.clone();
        assert_eq!(engine.reveal_cell((1, 1)), RevealOutcome::AlreadyRevealed);
        assert_eq!(engine, before);
    }

    #[test]
    fn flagging_a_revealed_cell_is_a_no_op() {
        let mut engine = engine(3, &[(0, 0), (2, 2)], 60);
        engine.reveal_cell((1, 1));

        assert_eq!(engine.toggle_flag((1, 1)), FlagOutcome::NoChange);
        assert!(!engine.cell_at((1, 1)).is_flagged);
    }

    #[test]
    fn flagging_every_mine_wins_without_reveals() {
        let mut engine = engine(4, &[(0, 0), (3, 3)], 60);

        assert_eq!(engine.toggle_flag((0, 0)), FlagOutcome::Flagged);
        assert_eq!(engine.toggle_flag((3, 3)), FlagOutcome::Won);

        assert_eq!(engine.state(), GameState::Won);
        assert_eq!(engine.count_unrevealed_cells(), 16);
        assert!(!engine.timer_running());
    }

    #[test]
    fn revealing_every_safe_cell_wins_without_flags() {
        let mut engine = engine(2, &[(0, 0)], 60);

        assert_eq!(engine.reveal_cell((1, 0)), RevealOutcome::Revealed);
        assert_eq!(engine.reveal_cell((0, 1)), RevealOutcome::Revealed);
        assert_eq!(engine.reveal_cell((1, 1)), RevealOutcome::Won);
        assert_eq!(engine.summary().flagged_mines, 1);
        assert_eq!(engine.summary().unrevealed_mines, 0);
    }

    #[test]
    fn moves_after_the_end_are_ignored() {
        let mut engine = engine(3, &[(0, 0)], 60);
        engine.reveal_cell((0, 0));

        assert_eq!(engine.reveal_cell((2, 2)), RevealOutcome::Finished);
        assert_eq!(engine.toggle_flag((2, 2)), FlagOutcome::Finished);
        assert!(engine.cell_at((2, 2)).is_hidden());
    }

    #[test]
    fn time_limit_loses_on_first_reaching_tick() {
        let mut engine = engine(3, &[(0, 0)], 1);

        assert_eq!(engine.tick(), TickOutcome::TimedOut);
        assert_eq!(engine.tick(), TickOutcome::Idle);

        assert_eq!(engine.state(), GameState::Lost(LossReason::TimeLimit(1)));
        assert_eq!(engine.elapsed_secs(), 1);
        assert!(!engine.timer_running());
    }

    #[test]
    fn ticks_count_until_the_limit() {
        let mut engine = engine(3, &[(0, 0)], 3);

        assert_eq!(engine.tick(), TickOutcome::Ticked);
        assert_eq!(engine.tick(), TickOutcome::Ticked);
        assert_eq!(engine.state(), GameState::InProgress);
        assert_eq!(engine.tick(), TickOutcome::TimedOut);
        assert_eq!(
            engine.state().loss_reason().map(|r| r.to_string()).as_deref(),
            Some("time limit of 3 seconds reached")
        );
    }

    #[test]
    fn stop_timer_is_idempotent() {
        let mut engine = engine(3, &[(0, 0)], 10);
        engine.stop_timer();
        engine.stop_timer();

        assert_eq!(engine.tick(), TickOutcome::Idle);
        assert_eq!(engine.state(), GameState::InProgress);
    }

    #[test]
    fn summary_of_a_loss_counts_flags_and_hidden_mines() {
        let mut engine = engine(4, &[(0, 0), (3, 0), (3, 3)], 60);
        engine.toggle_flag((0, 0));
        engine.toggle_flag((1, 2));
        engine.tick();
        engine.reveal_cell((3, 3));

        let summary = engine.summary();
        assert!(!summary.won);
        assert_eq!(summary.elapsed_secs, 1);
        assert_eq!(summary.flagged_mines, 1);
        // (3,3) is revealed now, only (3,0) is still hidden
        assert_eq!(summary.unrevealed_mines, 1);
        assert_eq!(
            summary.loss_reason,
            Some(LossReason::SteppedOnMine((3, 3)))
        );
        assert_eq!(engine.mines_left(), 1);
    }

    #[test]
    fn move_log_records_first_touch_only() {
        let mut engine = engine(3, &[(0, 0)], 60);
        engine.toggle_flag((2, 2));
        engine.tick();
        engine.toggle_flag((2, 2));
        engine.reveal_cell((1, 1));

        assert_eq!(
            engine.moves(),
            [
                Move { coords: (2, 2), elapsed_secs: 0 },
                Move { coords: (1, 1), elapsed_secs: 1 },
            ]
        );
    }

    #[test]
    fn reset_starts_over_with_same_parameters() {
        let mut generator = RandomBoardGenerator::new(3);
        let config = GameConfig::new(6, 5).unwrap();
        let mut engine = GameEngine::new_game(&mut generator, config, 30);
        engine.tick();
        engine.toggle_flag((0, 0));

        engine.reset(&mut generator);

        assert_eq!(engine.config(), config);
        assert_eq!(engine.elapsed_secs(), 0);
        assert_eq!(engine.count_mines(), 5);
        assert_eq!(engine.board().count_flags(), 0);
        assert!(engine.moves().is_empty());
        assert!(engine.timer_running());
    }

    #[test]
    #[should_panic(expected = "outside 3x3 board")]
    fn out_of_range_coordinates_panic() {
        engine(3, &[], 60).reveal_cell((3, 0));
    }
}
