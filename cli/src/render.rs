use doomsweeper_core::*;
use std::fmt::Write;

fn glyph(cell: &Cell, show_mines: bool) -> char {
    match (cell.discovery, cell.mark) {
        (Discovery::Revealed, _) if cell.mine => '*',
        (Discovery::Revealed, _) if cell.neighbors == 0 => '.',
        (Discovery::Revealed, _) => char::from(b'0' + cell.neighbors),
        (Discovery::Hidden, Mark::Flagged) => 'F',
        (Discovery::Hidden, Mark::Questioned) => '?',
        (Discovery::Hidden, Mark::None) if show_mines && cell.mine => 'm',
        (Discovery::Hidden, Mark::None) if cell.highlighted => '+',
        (Discovery::Hidden, Mark::None) => '#',
    }
}

/// Board as text, one row per line, with column and row numbers.
pub fn render_board(grid: &MineGrid, show_mines: bool) -> String {
    let mut out = String::from("   ");
    for x in 0..grid.width() {
        out.push(' ');
        out.push(char::from(b'0' + x % 10));
    }
    out.push('\n');

    for y in 0..grid.height() {
        let _ = write!(out, "{y:>3}");
        for x in 0..grid.width() {
            out.push(' ');
            if let Some(cell) = grid.cell((x, y)) {
                out.push(glyph(cell, show_mines));
            }
        }
        out.push('\n');
    }
    out
}

pub fn render_status(session: &GameSession, elapsed_secs: u32) -> String {
    let state = match session.state() {
        SessionState::Ready => "ready",
        SessionState::Active => "playing",
        SessionState::Won => "won",
        SessionState::Lost => "lost",
    };
    format!(
        "mines left: {}  time: {}s  [{}]",
        session.mines_left(),
        elapsed_secs,
        state
    )
}
