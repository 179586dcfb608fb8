//! Text rendering of the board.
//!
//! This module is pure (no I/O). The output is the exact ASCII grid sent to
//! the remote player, so any change here is a protocol change.

use crate::board::Board;
use crate::types::{Position, BOARD_SIZE};

const HEADER: &str = "    1   2   3   4   5   6   7   8";
const HLINE: &str = "  +---+---+---+---+---+---+---+---+";
const VLINE: &str = "  |   |   |   |   |   |   |   |   |";

/// Marker drawn on a hinted legal move.
pub const HINT_MARKER: char = '.';

/// Render `board` as the ASCII grid.
///
/// Columns are `x`, rows are `y`, both labelled 1-8. Cells listed in `hints`
/// are drawn as [`HINT_MARKER`] when empty.
pub fn render_board(board: &Board, hints: Option<&[Position]>) -> String {
    let mut out = String::with_capacity(1024);

    out.push('\n');
    out.push_str(HEADER);
    out.push('\n');
    out.push_str(HLINE);
    out.push('\n');

    for y in 0..BOARD_SIZE {
        out.push_str(VLINE);
        out.push('\n');
        out.push(' ');
        out.push(char::from(b'1' + y));
        for x in 0..BOARD_SIZE {
            let pos = Position::new(x, y);
            out.push_str("|  ");
            out.push(cell_char(board, pos, hints));
        }
        out.push_str("|\n");
        out.push_str(VLINE);
        out.push('\n');
        out.push_str(HLINE);
        out.push('\n');
    }

    out
}

fn cell_char(board: &Board, pos: Position, hints: Option<&[Position]>) -> char {
    match board.at(pos).flatten() {
        Some(tile) => tile.as_char(),
        None if hints.is_some_and(|h| h.contains(&pos)) => HINT_MARKER,
        None => ' ',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_board_has_fixed_line_count() {
        let text = render_board(&Board::new(), None);
        // Leading blank line, header, top rule, then 4 lines per row.
        assert_eq!(text.lines().count(), 1 + 2 + 8 * 4);
        assert!(text.starts_with('\n'));
        assert!(text.ends_with(&format!("{}\n", HLINE)));
    }

    #[test]
    fn hints_do_not_cover_tiles() {
        let board = Board::starting();
        let hints = [Position::new(3, 3), Position::new(0, 0)];
        let text = render_board(&board, Some(&hints[..]));
        let first_row = text.lines().nth(4).unwrap();
        assert_eq!(first_row, " 1|  .|   |   |   |   |   |   |   |");
        let fourth_row = text.lines().nth(4 + 3 * 4).unwrap();
        assert_eq!(fourth_row, " 4|   |   |   |  X|  O|   |   |   |");
    }
}
