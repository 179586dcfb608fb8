//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are plain data with no game logic, so they can be shared by the
//! rules engine, the renderer and the network session alike.
//!
//! # Board Geometry
//!
//! Standard Reversi board:
//!
//! - **Size**: 8 x 8 cells
//! - **Coordinates**: `(x, y)` where `x` is the column and `y` is the row, both `0..=7`
//! - **Wire coordinates**: 1-based digits, column first (`"34"` is `x = 2, y = 3`)
//!
//! # Examples
//!
//! ```
//! use reversi_net_types::{Position, Tile, BOARD_SIZE};
//!
//! let tile = Tile::parse("X").unwrap();
//! assert_eq!(tile.opponent(), Tile::O);
//! assert_eq!(Tile::parse("x"), None);
//!
//! let pos = Position::new(2, 3);
//! assert_eq!(pos.index(), 2 * BOARD_SIZE as usize + 3);
//! ```

use serde::Serialize;

/// Board edge length in cells (8)
pub const BOARD_SIZE: u8 = 8;

/// Total number of cells on the board
pub const CELL_COUNT: usize = (BOARD_SIZE as usize) * (BOARD_SIZE as usize);

/// Compass directions scanned when looking for flips, as `(dx, dy)`.
pub const DIRECTIONS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// The four corner cells.
pub const CORNERS: [Position; 4] = [
    Position { x: 0, y: 0 },
    Position { x: 7, y: 0 },
    Position { x: 0, y: 7 },
    Position { x: 7, y: 7 },
];

/// One of the two player colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Tile {
    X,
    O,
}

impl Tile {
    /// Parse a tile identifier as sent on the wire.
    ///
    /// Matching is exact and case-sensitive.
    ///
    /// ```
    /// use reversi_net_types::Tile;
    ///
    /// assert_eq!(Tile::parse("O"), Some(Tile::O));
    /// assert_eq!(Tile::parse("o"), None);
    /// assert_eq!(Tile::parse(" X"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "X" => Some(Tile::X),
            "O" => Some(Tile::O),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tile::X => "X",
            Tile::O => "O",
        }
    }

    /// Character drawn in an occupied board cell.
    pub fn as_char(&self) -> char {
        match self {
            Tile::X => 'X',
            Tile::O => 'O',
        }
    }

    /// The other tile.
    pub fn opponent(&self) -> Self {
        match self {
            Tile::X => Tile::O,
            Tile::O => Tile::X,
        }
    }
}

/// Whose move it is within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Turn {
    Player,
    Computer,
}

impl Turn {
    /// Lowercase name used in the "goes first" announcement.
    pub fn as_str(&self) -> &'static str {
        match self {
            Turn::Player => "player",
            Turn::Computer => "computer",
        }
    }

    pub fn other(&self) -> Self {
        match self {
            Turn::Player => Turn::Computer,
            Turn::Computer => Turn::Player,
        }
    }
}

/// A board coordinate, 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub x: u8,
    pub y: u8,
}

impl Position {
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// Flat index in the board's cell array (column-major: `x * 8 + y`).
    #[inline(always)]
    pub fn index(&self) -> usize {
        (self.x as usize) * (BOARD_SIZE as usize) + (self.y as usize)
    }

    pub fn is_corner(&self) -> bool {
        CORNERS.contains(self)
    }
}

/// A cell on the game board
///
/// - `None`: Empty cell
/// - `Some(Tile)`: Cell holding the given tile
pub type Cell = Option<Tile>;
