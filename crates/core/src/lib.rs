//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the Reversi rules and the computer opponent.
//! It has **zero dependencies** on networking or I/O, making it:
//!
//! - **Deterministic**: Same seed produces identical computer play
//! - **Testable**: Every rule is a plain function over a [`Board`]
//! - **Cheap to copy**: A board is a 64-byte `Copy` value, so the selector
//!   simulates moves on private copies
//!
//! # Module Structure
//!
//! - [`board`]: 8x8 board, legal-move detection, move application, scoring
//! - [`selector`]: Greedy corner-first move selection for the computer
//! - [`rng`]: Seedable LCG used for shuffling and coin flips
//! - [`render`]: ASCII rendering of the board for the text protocol
//!
//! # Game Rules
//!
//! - A move must capture: for at least one of the 8 directions, a run of
//!   opponent tiles must be closed off by one of the mover's tiles
//! - Every captured run flips to the mover's tile
//! - A side with no legal move cannot play; the session decides what that means
//!
//! # Example
//!
//! ```
//! use reversi_net_core::{Board, MoveSelector};
//! use reversi_net_types::Tile;
//!
//! let mut board = Board::starting();
//! assert_eq!(board.legal_moves(Tile::O).len(), 4);
//!
//! let flips = board.apply_move(Tile::O, 2, 3).unwrap();
//! assert_eq!(flips.len(), 1);
//! assert_eq!(board.score()[Tile::O], 4);
//!
//! let mut selector = MoveSelector::with_seed(7);
//! let reply = selector.select(&board, Tile::X).unwrap();
//! assert!(board.is_legal(Tile::X, reply.x as i8, reply.y as i8));
//! ```

pub mod board;
pub mod render;
pub mod rng;
pub mod selector;

pub use reversi_net_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, FlipSet, MoveList, Score};
pub use render::{render_board, HINT_MARKER};
pub use rng::SimpleRng;
pub use selector::MoveSelector;
