//! Threat-line analysis.
//!
//! A threat line is the ray from an attacking piece toward the enemy king,
//! inclusive of the attacker's square. The x-ray walk tolerates one piece
//! standing strictly between attacker and king: zero pieces between means
//! the king is directly checked, exactly one means that piece is pinned
//! along the ray. Lines drive both check evasion and pin constraints.

use crate::attacks::{knight_moves, pawn_captures};
use crate::Bitboard;
use arbiter_core::{Color, PieceKind, Square};

const ORTHOGONAL: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Computes the threat line from a piece toward the enemy king, or an empty
/// bitboard when the piece does not bear on the king.
///
/// For knights and pawns the "line" is the piece's own square when it
/// directly attacks the king. Kings never produce a line. A queen unions a
/// rook-style and a bishop-style analysis; at most one of them can be
/// nonzero for any king placement.
pub fn threat_line_to(
    kind: PieceKind,
    color: Color,
    from: Square,
    king: Square,
    occupied: Bitboard,
) -> Bitboard {
    match kind {
        PieceKind::King => Bitboard::EMPTY,
        PieceKind::Knight => {
            if knight_moves(from).contains(king) {
                Bitboard::from_square(from)
            } else {
                Bitboard::EMPTY
            }
        }
        PieceKind::Pawn => {
            if pawn_captures(from, color).contains(king) {
                Bitboard::from_square(from)
            } else {
                Bitboard::EMPTY
            }
        }
        PieceKind::Rook => xray_line(from, king, occupied, &ORTHOGONAL),
        PieceKind::Bishop => xray_line(from, king, occupied, &DIAGONAL),
        PieceKind::Queen => {
            xray_line(from, king, occupied, &ORTHOGONAL) | xray_line(from, king, occupied, &DIAGONAL)
        }
    }
}

/// Walks the ray from `from` toward `king` if the two are aligned along one
/// of `dirs`, returning the attacker's square plus the squares strictly
/// between, provided at most one of them is occupied.
fn xray_line(from: Square, king: Square, occupied: Bitboard, dirs: &[(i8, i8); 4]) -> Bitboard {
    let dr = (king.row() as i8 - from.row() as i8).signum();
    let dc = (king.column() as i8 - from.column() as i8).signum();
    if !dirs.contains(&(dr, dc)) {
        return Bitboard::EMPTY;
    }
    // a diagonal direction must actually line up with the king
    if dr != 0
        && dc != 0
        && (king.row() as i8 - from.row() as i8).abs()
            != (king.column() as i8 - from.column() as i8).abs()
    {
        return Bitboard::EMPTY;
    }

    let mut line = Bitboard::from_square(from);
    let step = dr * 8 + dc;
    let mut index = from.index() as i8 + step;
    while index != king.index() as i8 {
        // SAFETY: we step square by square between two on-board squares
        let sq = unsafe { Square::from_index_unchecked(index as u8) };
        line.set(sq);
        index += step;
    }

    let between = line & !Bitboard::from_square(from);
    if (between & occupied).count() > 1 {
        return Bitboard::EMPTY;
    }
    line
}
