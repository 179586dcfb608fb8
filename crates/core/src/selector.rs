//! Computer move selection.
//!
//! A greedy one-ply heuristic: corners first, otherwise whichever move leaves
//! the computer holding the most cells. Candidates are shuffled before either
//! rule is applied, so equal choices are broken at random.

use crate::board::Board;
use crate::rng::SimpleRng;
use crate::types::{Position, Tile};

/// Picks moves for the computer side.
#[derive(Debug, Clone)]
pub struct MoveSelector {
    rng: SimpleRng,
}

impl MoveSelector {
    pub fn new(rng: SimpleRng) -> Self {
        Self { rng }
    }

    pub fn with_seed(seed: u32) -> Self {
        Self::new(SimpleRng::new(seed))
    }

    /// Choose a move for `tile`, or `None` if it has no legal move.
    pub fn select(&mut self, board: &Board, tile: Tile) -> Option<Position> {
        let mut candidates = board.legal_moves(tile);
        self.rng.shuffle(&mut candidates);
        Self::rank(board, tile, &candidates)
    }

    /// Apply the selection policy to candidates in the given order.
    ///
    /// The first corner wins outright. Otherwise each move is tried on a copy
    /// of the board and only a strictly better resulting score replaces the
    /// current best, so earlier candidates win ties.
    pub fn rank(board: &Board, tile: Tile, candidates: &[Position]) -> Option<Position> {
        if let Some(corner) = candidates.iter().find(|p| p.is_corner()) {
            return Some(*corner);
        }

        let mut best: Option<(Position, u32)> = None;
        for &pos in candidates {
            let mut trial = *board;
            if trial.apply_move(tile, pos.x as i8, pos.y as i8).is_none() {
                continue;
            }
            let score = trial.score()[tile];
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((pos, score));
            }
        }

        best.map(|(pos, _)| pos)
    }
}

impl Default for MoveSelector {
    fn default() -> Self {
        Self::new(SimpleRng::from_clock())
    }
}
