//! Position-string parsing.
//!
//! The engine accepts the six-field classical notation but consumes only the
//! first four fields: piece placement, side to move, castling rights, and
//! en-passant square. The move counters may be present (and are ignored) or
//! absent.

use crate::{Color, Square};
use thiserror::Error;

/// Errors produced when a position string fails the grammar.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedPosition {
    #[error("position string must be ASCII")]
    NotAscii,

    #[error("expected 4 to 6 fields, got {0}")]
    BadFieldCount(usize),

    #[error("invalid piece placement: {0}")]
    BadPlacement(String),

    #[error("invalid side to move: '{0}'")]
    BadSideToMove(String),

    #[error("invalid castling rights: '{0}'")]
    BadCastling(String),

    #[error("invalid en passant square: '{0}'")]
    BadEnPassant(String),
}

/// The consumed fields of a position string.
///
/// This holds the validated raw placement plus the decoded scalar fields;
/// the engine turns the placement into its board representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionText {
    /// Piece placement (e.g., "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR").
    pub placement: String,
    /// The side to move.
    pub side_to_move: Color,
    /// Castling availability, "-" or a subset of "KQkq".
    pub castling: String,
    /// En-passant target square, if any.
    pub en_passant: Option<Square>,
}

impl PositionText {
    /// The standard starting position.
    pub const STARTPOS: &'static str =
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Parses a position string.
    pub fn parse(text: &str) -> Result<Self, MalformedPosition> {
        if !text.is_ascii() {
            return Err(MalformedPosition::NotAscii);
        }

        let parts: Vec<&str> = text.split_whitespace().collect();
        if parts.len() < 4 || parts.len() > 6 {
            return Err(MalformedPosition::BadFieldCount(parts.len()));
        }

        let placement = parts[0];
        Self::validate_placement(placement)?;

        let side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(MalformedPosition::BadSideToMove(other.to_string())),
        };

        let castling = parts[2];
        Self::validate_castling(castling)?;

        let en_passant = Self::parse_en_passant(parts[3])?;

        Ok(PositionText {
            placement: placement.to_string(),
            side_to_move,
            castling: castling.to_string(),
            en_passant,
        })
    }

    fn validate_placement(placement: &str) -> Result<(), MalformedPosition> {
        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != 8 {
            return Err(MalformedPosition::BadPlacement(format!(
                "expected 8 rows, got {}",
                rows.len()
            )));
        }

        for (i, row) in rows.iter().enumerate() {
            let mut squares = 0;
            for c in row.chars() {
                if let Some(digit) = c.to_digit(10) {
                    squares += digit;
                } else if "pnbrqkPNBRQK".contains(c) {
                    squares += 1;
                } else {
                    return Err(MalformedPosition::BadPlacement(format!(
                        "invalid character '{}' in rank {}",
                        c,
                        8 - i
                    )));
                }
            }
            if squares != 8 {
                return Err(MalformedPosition::BadPlacement(format!(
                    "rank {} has {} squares, expected 8",
                    8 - i,
                    squares
                )));
            }
        }

        Ok(())
    }

    fn validate_castling(castling: &str) -> Result<(), MalformedPosition> {
        if castling == "-" {
            return Ok(());
        }
        if castling.is_empty() {
            return Err(MalformedPosition::BadCastling(castling.to_string()));
        }
        for c in castling.chars() {
            if !"KQkq".contains(c) {
                return Err(MalformedPosition::BadCastling(castling.to_string()));
            }
        }
        Ok(())
    }

    fn parse_en_passant(field: &str) -> Result<Option<Square>, MalformedPosition> {
        if field == "-" {
            return Ok(None);
        }
        let square = Square::from_algebraic(field)
            .ok_or_else(|| MalformedPosition::BadEnPassant(field.to_string()))?;
        // only the square behind a double push is a valid target
        if square.row() != 2 && square.row() != 5 {
            return Err(MalformedPosition::BadEnPassant(field.to_string()));
        }
        Ok(Some(square))
    }
}
