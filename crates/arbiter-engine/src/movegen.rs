//! Per-piece pseudo-legal move and attack dispatch.
//!
//! Pseudo-legal destinations satisfy a piece's movement rules but have not
//! been filtered for self-check; the game facade composes these with the
//! special-move and legality layers.

use crate::attacks::{
    bishop_attacks, king_moves, knight_moves, pawn_captures, pawn_pushes, queen_attacks,
    rook_attacks,
};
use crate::Bitboard;
use arbiter_core::{Color, PieceKind, Square};

/// Returns the pseudo-legal destinations of a piece: movement rules applied,
/// own-occupied squares excluded, checks and pins ignored. Castling and
/// en-passant are composed in by the special-moves layer, not here.
pub fn pseudo_moves(
    kind: PieceKind,
    color: Color,
    from: Square,
    occupied: Bitboard,
    own: Bitboard,
) -> Bitboard {
    match kind {
        PieceKind::Pawn => pawn_moves(color, from, occupied, own),
        PieceKind::Knight => knight_moves(from) & !own,
        PieceKind::Bishop => bishop_attacks(from, occupied) & !own,
        PieceKind::Rook => rook_attacks(from, occupied) & !own,
        PieceKind::Queen => queen_attacks(from, occupied) & !own,
        PieceKind::King => king_moves(from) & !own,
    }
}

/// Returns the squares a piece attacks, used for threatened-square
/// computation. Unlike [`pseudo_moves`] this ignores what occupies the
/// target (a defended piece still covers its square), and for pawns it is
/// the capture squares only.
pub fn attacks(kind: PieceKind, color: Color, from: Square, occupied: Bitboard) -> Bitboard {
    match kind {
        PieceKind::Pawn => pawn_captures(from, color),
        PieceKind::Knight => knight_moves(from),
        PieceKind::Bishop => bishop_attacks(from, occupied),
        PieceKind::Rook => rook_attacks(from, occupied),
        PieceKind::Queen => queen_attacks(from, occupied),
        PieceKind::King => king_moves(from),
    }
}

fn pawn_moves(color: Color, from: Square, occupied: Bitboard, own: Bitboard) -> Bitboard {
    let enemy = occupied & !own;
    let mut moves = Bitboard::EMPTY;

    let pushes = pawn_pushes(from, color);
    if pushes.is_not_empty() {
        let step = (from.index() as i8 + color.push_delta()) as u8;
        // SAFETY: a nonzero push table implies the stepped square is on the board
        let ahead = unsafe { Square::from_index_unchecked(step) };
        // a blocked single push also rules out the double push behind it
        if !occupied.contains(ahead) {
            moves |= pushes & !occupied;
        }
    }

    moves | (pawn_captures(from, color) & enemy)
}
