use std::fmt::Write;
use sweeper_core::{Board, Cell};

/// Single-character form of a cell. Mines only show once `show_mines` is set.
pub fn cell_symbol(cell: &Cell, show_mines: bool) -> char {
    match *cell {
        Cell { is_flagged: true, .. } => 'F',
        Cell { has_mine: true, is_revealed: true, .. } => 'X',
        Cell { has_mine: true, .. } if show_mines => '*',
        Cell { is_revealed: false, .. } => '#',
        Cell { adjacent_mines: 0, .. } => '.',
        Cell { adjacent_mines, .. } => char::from(b'0' + adjacent_mines),
    }
}

/// Text grid with 1-indexed column and row labels.
pub fn render_board(board: &Board, show_mines: bool) -> String {
    let mut out = String::from("   ");
    for x in 1..=board.side() {
        let _ = write!(out, "{:>2}", x);
    }
    out.push('\n');

    for y in 0..board.side() {
        let _ = write!(out, "{:>2} ", u16::from(y) + 1);
        for cell in board.row(y) {
            out.push(' ');
            out.push(cell_symbol(cell, show_mines));
        }
        out.push('\n');
    }
    out
}
