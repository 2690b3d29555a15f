//! Special-move state and geometry: castling rights, en-passant squares,
//! and promotion resolution.

use crate::Bitboard;
use arbiter_core::{Color, PieceKind, Square};

/// Castling rights flags. Bits only ever go out, never come back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    const WHITE_SHORT: u8 = 0b0001;
    const WHITE_LONG: u8 = 0b0010;
    const BLACK_SHORT: u8 = 0b0100;
    const BLACK_LONG: u8 = 0b1000;

    /// Builds rights from the validated castling field of a position string.
    pub fn from_field(field: &str) -> Self {
        let mut flags = 0u8;
        for c in field.chars() {
            match c {
                'K' => flags |= Self::WHITE_SHORT,
                'Q' => flags |= Self::WHITE_LONG,
                'k' => flags |= Self::BLACK_SHORT,
                'q' => flags |= Self::BLACK_LONG,
                _ => {}
            }
        }
        CastlingRights(flags)
    }

    /// Renders the castling field of a position string.
    pub fn to_field(self) -> String {
        if self.0 == 0 {
            return "-".to_string();
        }
        let mut out = String::new();
        if self.0 & Self::WHITE_SHORT != 0 {
            out.push('K');
        }
        if self.0 & Self::WHITE_LONG != 0 {
            out.push('Q');
        }
        if self.0 & Self::BLACK_SHORT != 0 {
            out.push('k');
        }
        if self.0 & Self::BLACK_LONG != 0 {
            out.push('q');
        }
        out
    }

    /// Returns true if the given side may still castle short.
    #[inline]
    pub const fn can_short(self, color: Color) -> bool {
        let flag = match color {
            Color::White => Self::WHITE_SHORT,
            Color::Black => Self::BLACK_SHORT,
        };
        (self.0 & flag) != 0
    }

    /// Returns true if the given side may still castle long.
    #[inline]
    pub const fn can_long(self, color: Color) -> bool {
        let flag = match color {
            Color::White => Self::WHITE_LONG,
            Color::Black => Self::BLACK_LONG,
        };
        (self.0 & flag) != 0
    }

    /// Clears both rights of a color (its king moved).
    #[inline]
    pub fn clear_color(&mut self, color: Color) {
        let mask = match color {
            Color::White => !(Self::WHITE_SHORT | Self::WHITE_LONG),
            Color::Black => !(Self::BLACK_SHORT | Self::BLACK_LONG),
        };
        self.0 &= mask;
    }

    /// Clears the right tied to a rook home square. Covers both a rook
    /// leaving home and a capture landing there; any other square is a
    /// no-op.
    #[inline]
    pub fn clear_rook_home(&mut self, sq: Square) {
        let mask = match sq {
            Square::H1 => !Self::WHITE_SHORT,
            Square::A1 => !Self::WHITE_LONG,
            Square::H8 => !Self::BLACK_SHORT,
            Square::A8 => !Self::BLACK_LONG,
            _ => return,
        };
        self.0 &= mask;
    }

    /// Returns the raw flags.
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

/// Geometry of one castling move: the king's home and destination, the
/// squares that must be empty, and the squares the king occupies or crosses
/// (which must not be threatened).
pub(crate) struct CastleGeometry {
    pub king_home: Square,
    pub king_to: Square,
    pub must_be_empty: Bitboard,
    pub king_path: Bitboard,
    pub rook_home: Square,
}

pub(crate) fn short_castle(color: Color) -> CastleGeometry {
    match color {
        Color::White => CastleGeometry {
            king_home: Square::E1,
            king_to: Square::G1,
            must_be_empty: Bitboard(Square::F1.bit() | Square::G1.bit()),
            king_path: Bitboard(Square::E1.bit() | Square::F1.bit() | Square::G1.bit()),
            rook_home: Square::H1,
        },
        Color::Black => CastleGeometry {
            king_home: Square::E8,
            king_to: Square::G8,
            must_be_empty: Bitboard(Square::F8.bit() | Square::G8.bit()),
            king_path: Bitboard(Square::E8.bit() | Square::F8.bit() | Square::G8.bit()),
            rook_home: Square::H8,
        },
    }
}

pub(crate) fn long_castle(color: Color) -> CastleGeometry {
    match color {
        Color::White => CastleGeometry {
            king_home: Square::E1,
            king_to: Square::C1,
            must_be_empty: Bitboard(Square::D1.bit() | Square::C1.bit() | Square::B1.bit()),
            king_path: Bitboard(Square::E1.bit() | Square::D1.bit() | Square::C1.bit()),
            rook_home: Square::A1,
        },
        Color::Black => CastleGeometry {
            king_home: Square::E8,
            king_to: Square::C8,
            must_be_empty: Bitboard(Square::D8.bit() | Square::C8.bit() | Square::B8.bit()),
            king_path: Bitboard(Square::E8.bit() | Square::D8.bit() | Square::C8.bit()),
            rook_home: Square::A8,
        },
    }
}

/// If a king move from `from` to `to` is a castle, returns the matching rook
/// relocation. Kings only ever reach these destinations from home by
/// castling.
pub(crate) fn castle_rook_move(color: Color, from: Square, to: Square) -> Option<(Square, Square)> {
    let short = short_castle(color);
    if from == short.king_home && to == short.king_to {
        let rook_to = match color {
            Color::White => Square::F1,
            Color::Black => Square::F8,
        };
        return Some((short.rook_home, rook_to));
    }
    let long = long_castle(color);
    if from == long.king_home && to == long.king_to {
        let rook_to = match color {
            Color::White => Square::D1,
            Color::Black => Square::D8,
        };
        return Some((long.rook_home, rook_to));
    }
    None
}

/// Square of the pawn removed by capturing onto the en-passant target: one
/// push behind the target from the mover's view.
#[inline]
pub(crate) fn en_passant_victim(target: Square, mover: Color) -> Square {
    let index = (target.index() as i8 - mover.push_delta()) as u8;
    // SAFETY: the target sits on rank 3 or 6, so the stepped square is on the board
    unsafe { Square::from_index_unchecked(index) }
}

/// Returns true if a pawn of `color` landing on `to` promotes.
#[inline]
pub(crate) fn promotes_on(to: Square, color: Color) -> bool {
    to.row() == color.promotion_row()
}

/// Resolves the promotion choice; anything that is not a promotable kind
/// falls back to a queen.
#[inline]
pub(crate) fn resolve_promotion(choice: Option<PieceKind>) -> PieceKind {
    match choice {
        Some(
            kind @ (PieceKind::Queen | PieceKind::Rook | PieceKind::Bishop | PieceKind::Knight),
        ) => kind,
        _ => PieceKind::Queen,
    }
}

/// Squares strictly between two squares on the same row.
pub(crate) fn row_between(a: Square, b: Square) -> Bitboard {
    debug_assert_eq!(a.row(), b.row());
    let (lo, hi) = if a.index() < b.index() {
        (a.index(), b.index())
    } else {
        (b.index(), a.index())
    };
    let mut bits = Bitboard::EMPTY;
    for index in lo + 1..hi {
        // SAFETY: strictly between two valid squares
        bits.set(unsafe { Square::from_index_unchecked(index) });
    }
    bits
}
