//! Board module - owns the 8x8 grid and the Reversi rules
//!
//! The board is a flat array of cells indexed by `(x, y)`, column-major
//! (`x * 8 + y`), so a linear scan visits cells in the same `x`-outer,
//! `y`-inner order as [`Board::legal_moves`].
//!
//! Everything here is a pure query or an in-place mutation of a single board;
//! there is no I/O and no randomness.

use std::ops::Index;

use arrayvec::ArrayVec;

use crate::types::{Cell, Position, Tile, BOARD_SIZE, CELL_COUNT, CORNERS, DIRECTIONS};

/// Cells a move would convert. Directions never overlap, so 63 is a hard bound.
pub type FlipSet = ArrayVec<Position, CELL_COUNT>;

/// Legal moves for one side, in scan order.
pub type MoveList = ArrayVec<Position, CELL_COUNT>;

/// The game board - 8 x 8 cells using flat array storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    cells: [Cell; CELL_COUNT],
}

/// Occupied-cell counts per tile, derived from a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Score {
    pub x: u32,
    pub o: u32,
}

impl Score {
    pub fn get(&self, tile: Tile) -> u32 {
        match tile {
            Tile::X => self.x,
            Tile::O => self.o,
        }
    }

    pub fn total(&self) -> u32 {
        self.x + self.o
    }
}

impl Index<Tile> for Score {
    type Output = u32;

    fn index(&self, tile: Tile) -> &u32 {
        match tile {
            Tile::X => &self.x,
            Tile::O => &self.o,
        }
    }
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [None; CELL_COUNT],
        }
    }

    /// Create a board already holding the four starting tiles
    pub fn starting() -> Self {
        let mut board = Self::new();
        board.reset_starting_position();
        board
    }

    /// Place the four center tiles. Other cells are left as they are, so
    /// callers should start from a blank board.
    pub fn reset_starting_position(&mut self) {
        self.set(3, 3, Some(Tile::X));
        self.set(3, 4, Some(Tile::O));
        self.set(4, 3, Some(Tile::O));
        self.set(4, 4, Some(Tile::X));
    }

    /// Bounds check only
    #[inline(always)]
    pub fn is_on_board(x: i8, y: i8) -> bool {
        (0..BOARD_SIZE as i8).contains(&x) && (0..BOARD_SIZE as i8).contains(&y)
    }

    pub fn is_corner(x: i8, y: i8) -> bool {
        CORNERS
            .iter()
            .any(|c| c.x as i8 == x && c.y as i8 == y)
    }

    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if !Self::is_on_board(x, y) {
            return None;
        }
        Some((x as usize) * (BOARD_SIZE as usize) + (y as usize))
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Cell at `pos`, or `None` if `pos` is off the board.
    pub fn at(&self, pos: Position) -> Option<Cell> {
        if pos.x < BOARD_SIZE && pos.y < BOARD_SIZE {
            Some(self.cells[pos.index()])
        } else {
            None
        }
    }

    /// Cells that `tile` placed at `(x, y)` would capture.
    ///
    /// Returns `None` when the move is illegal: off the board, on an occupied
    /// cell, or capturing nothing. Only runs of opponent tiles closed off by a
    /// tile of the mover count; a run that reaches an empty cell or the edge
    /// contributes nothing, and neither does an adjacent friendly tile.
    pub fn candidate_flips(&self, tile: Tile, x: i8, y: i8) -> Option<FlipSet> {
        if self.get(x, y)?.is_some() {
            return None;
        }

        let other = Some(tile.opponent());
        let mut flips = FlipSet::new();

        for (dx, dy) in DIRECTIONS {
            let (mut cx, mut cy) = (x + dx, y + dy);
            let run_start = flips.len();

            while self.get(cx, cy) == Some(other) {
                flips.push(Position::new(cx as u8, cy as u8));
                cx += dx;
                cy += dy;
            }

            if self.get(cx, cy) != Some(Some(tile)) {
                flips.truncate(run_start);
            }
        }

        if flips.is_empty() {
            None
        } else {
            Some(flips)
        }
    }

    /// Whether `tile` may play at `(x, y)`.
    pub fn is_legal(&self, tile: Tile, x: i8, y: i8) -> bool {
        self.candidate_flips(tile, x, y).is_some()
    }

    /// Every legal move for `tile`, `x` outer and `y` inner.
    pub fn legal_moves(&self, tile: Tile) -> MoveList {
        let mut moves = MoveList::new();
        for x in 0..BOARD_SIZE as i8 {
            for y in 0..BOARD_SIZE as i8 {
                if self.is_legal(tile, x, y) {
                    moves.push(Position::new(x as u8, y as u8));
                }
            }
        }
        moves
    }

    pub fn has_legal_move(&self, tile: Tile) -> bool {
        (0..BOARD_SIZE as i8)
            .flat_map(|x| (0..BOARD_SIZE as i8).map(move |y| (x, y)))
            .any(|(x, y)| self.is_legal(tile, x, y))
    }

    /// Place `tile` at `(x, y)` and flip every captured cell.
    ///
    /// Returns the flipped cells, or `None` (board untouched) if the move is
    /// illegal.
    pub fn apply_move(&mut self, tile: Tile, x: i8, y: i8) -> Option<FlipSet> {
        let flips = self.candidate_flips(tile, x, y)?;

        self.set(x, y, Some(tile));
        for pos in &flips {
            self.cells[pos.index()] = Some(tile);
        }

        Some(flips)
    }

    /// Count occupied cells by tile
    pub fn score(&self) -> Score {
        self.cells
            .iter()
            .fold(Score::default(), |mut score, cell| {
                match cell {
                    Some(Tile::X) => score.x += 1,
                    Some(Tile::O) => score.o += 1,
                    None => {}
                }
                score
            })
    }

    pub fn count_empty(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Build a board from rows of characters (`'X'`, `'O'`, anything else empty).
    ///
    /// `rows[y]` holds the cells for columns `0..8`, which reads the same way
    /// the rendered board does.
    pub fn from_rows(rows: [&str; BOARD_SIZE as usize]) -> Self {
        let mut board = Self::new();
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().take(BOARD_SIZE as usize).enumerate() {
                let cell = match ch {
                    'X' => Some(Tile::X),
                    'O' => Some(Tile::O),
                    _ => None,
                };
                board.set(x as i8, y as i8, cell);
            }
        }
        board
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
