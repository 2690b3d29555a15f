//! Move representation and its minimal text encoding.
//!
//! A move is the pair of squares plus an optional promotion choice. The
//! text encoding is `file1 rank1 file2 rank2 [promotion-letter]`, e.g.
//! "e2e4" or "a7a8n"; the promotion letter is one of `q r b n` and only
//! present on promotions.

use crate::{PieceKind, Square};
use std::fmt;

/// A chess move as submitted to and recorded by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    /// Source square.
    pub from: Square,
    /// Destination square.
    pub to: Square,
    /// Promotion choice, if the move promoted a pawn.
    pub promotion: Option<PieceKind>,
}

impl Move {
    /// Creates a move without a promotion choice.
    #[inline]
    pub const fn new(from: Square, to: Square) -> Self {
        Move {
            from,
            to,
            promotion: None,
        }
    }

    /// Creates a promotion move.
    #[inline]
    pub const fn promoting(from: Square, to: Square, kind: PieceKind) -> Self {
        Move {
            from,
            to,
            promotion: Some(kind),
        }
    }

    /// Returns true if both moves relocate between the same pair of squares.
    #[inline]
    pub fn same_squares(self, other: Move) -> bool {
        self.from == other.from && self.to == other.to
    }

    /// Parses a move from its text encoding (e.g., "e2e4", "e7e8q").
    pub fn parse(s: &str) -> Option<Self> {
        if !s.is_ascii() || s.len() < 4 || s.len() > 5 {
            return None;
        }
        let from = Square::from_algebraic(&s[0..2])?;
        let to = Square::from_algebraic(&s[2..4])?;
        let promotion = if s.len() == 5 {
            match s.as_bytes()[4].to_ascii_lowercase() {
                b'q' => Some(PieceKind::Queen),
                b'r' => Some(PieceKind::Rook),
                b'b' => Some(PieceKind::Bishop),
                b'n' => Some(PieceKind::Knight),
                _ => return None,
            }
        } else {
            None
        };
        Some(Move {
            from,
            to,
            promotion,
        })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self.promotion {
            Some(PieceKind::Queen) => "q",
            Some(PieceKind::Rook) => "r",
            Some(PieceKind::Bishop) => "b",
            Some(PieceKind::Knight) => "n",
            _ => "",
        };
        write!(f, "{}{}{}", self.from, self.to, letter)
    }
}
