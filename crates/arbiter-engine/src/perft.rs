//! Perft (performance test) for move generator validation.
//!
//! Perft counts the leaf nodes of the legal move tree at a given depth;
//! the totals are compared against well-known reference values to validate
//! the generator, including castling, en passant, promotion, and the check
//! and pin filters.

use crate::Game;
use arbiter_core::{Move, PieceKind, Square};

const PROMOTION_KINDS: [PieceKind; 4] = [
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Bishop,
    PieceKind::Knight,
];

/// Counts leaf nodes at the given depth.
pub fn perft(game: &Game, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut nodes = 0u64;
    for from in (0..64u8).filter_map(Square::from_index) {
        let moves = game.legal_moves_for(from);
        if moves.is_empty() {
            continue;
        }
        let is_pawn = game
            .piece_at(from)
            .is_some_and(|(kind, _)| kind == PieceKind::Pawn);

        for to in moves {
            // a pawn reaching its last rank counts once per promotion kind
            if is_pawn && (to.row() == 0 || to.row() == 7) {
                for kind in PROMOTION_KINDS {
                    nodes += subtree(game, from, to, Some(kind), depth);
                }
            } else {
                nodes += subtree(game, from, to, None, depth);
            }
        }
    }
    nodes
}

/// Perft with divide: the node count under each root move. Useful to
/// localize a generator bug.
pub fn perft_divide(game: &Game, depth: u32) -> Vec<(String, u64)> {
    let mut results = Vec::new();

    for from in (0..64u8).filter_map(Square::from_index) {
        let moves = game.legal_moves_for(from);
        let is_pawn = game
            .piece_at(from)
            .is_some_and(|(kind, _)| kind == PieceKind::Pawn);

        for to in moves {
            if is_pawn && (to.row() == 0 || to.row() == 7) {
                for kind in PROMOTION_KINDS {
                    let label = Move::promoting(from, to, kind).to_string();
                    results.push((label, subtree(game, from, to, Some(kind), depth)));
                }
            } else {
                let label = Move::new(from, to).to_string();
                results.push((label, subtree(game, from, to, None, depth)));
            }
        }
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

fn subtree(game: &Game, from: Square, to: Square, choice: Option<PieceKind>, depth: u32) -> u64 {
    if depth == 1 {
        return 1;
    }
    let mut next = game.clone();
    match next.execute_move(from, to, choice) {
        Ok(_) => perft(&next, depth - 1),
        Err(_) => 0,
    }
}
