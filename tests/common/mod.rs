//! Helpers shared by the session and server tests.

#![allow(dead_code)]

pub fn is_board(message: &str) -> bool {
    message.contains("+---+")
}

/// First hinted cell of a rendered board, as the two-digit move to type.
pub fn hinted_cell(board: &str) -> Option<String> {
    for line in board.lines() {
        let mut parts = line.split('|');
        let Some(label) = parts.next() else { continue };
        let Ok(row) = label.trim().parse::<u8>() else {
            continue;
        };
        for (col, cell) in parts.take(8).enumerate() {
            if cell.trim() == "." {
                return Some(format!("{}{}", col + 1, row));
            }
        }
    }
    None
}

/// Count of `c` inside the grid cells of a rendered board.
pub fn count_cells(board: &str, c: char) -> usize {
    board
        .lines()
        .filter(|line| line.trim_start().starts_with(|ch: char| ch.is_ascii_digit()) && line.contains('|'))
        .flat_map(|line| line.split('|').skip(1))
        .filter(|cell| cell.trim() == c.to_string())
        .count()
}
