//! Perft (performance test) for move generator validation.
//!
//! Perft counts the number of leaf nodes at a given depth, which can be
//! compared against known-correct values to validate the move generator.

use super::legal_moves;
use crate::{CastlingCheck, Position};

/// Counts the number of leaf nodes at the given depth.
pub fn perft(position: &Position, depth: u32, castling: CastlingCheck) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = legal_moves(position, castling);

    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for m in moves {
        let mut next = position.clone();
        next.play(m);
        nodes += perft(&next, depth - 1, castling);
    }
    nodes
}

/// Perft with divide - shows node count for each move at depth-1.
/// Useful for debugging to identify which moves have incorrect counts.
pub fn perft_divide(
    position: &Position,
    depth: u32,
    castling: CastlingCheck,
) -> Vec<(String, u64)> {
    let moves = legal_moves(position, castling);
    let mut results = Vec::with_capacity(moves.len());

    for m in moves {
        let mut next = position.clone();
        next.play(m);
        let nodes = if depth > 1 {
            perft(&next, depth - 1, castling)
        } else {
            1
        };
        results.push((m.to_uci(), nodes));
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}
