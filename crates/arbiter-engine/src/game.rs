//! The game facade.
//!
//! [`Game`] owns the complete state of one chess game and exposes the
//! engine's public operations: legal move queries, move execution, and
//! status. Each executed move funnels through the special-move handling,
//! refreshes the cached bitboards and threat lines, and reclassifies the
//! position.

use crate::attacks::pawn_captures;
use crate::board::{Board, Piece};
use crate::movegen::{attacks, pseudo_moves};
use crate::special::{self, CastlingRights};
use crate::threat::threat_line_to;
use crate::Bitboard;
use arbiter_core::{Color, MalformedPosition, Move, PieceKind, PositionText, Square};
use thiserror::Error;

/// Classification of a position after an executed move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    /// The game simply continues.
    Normal,
    /// The new side to play is in check.
    Check,
    /// The new side to play has no legal move and is in check.
    Checkmate,
    /// Stalemate or repetition.
    Draw,
}

/// Overall state of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// The game is still being played.
    InProgress,
    /// The game ended in checkmate.
    Checkmate { winner: Color },
    /// The game ended in a draw.
    Draw,
}

/// Errors returned by [`Game::execute_move`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    /// The destination is not among the legal moves of the source square.
    /// The game state is unchanged.
    #[error("move is not legal in the current position")]
    InvalidMove,

    /// The game has already ended in checkmate or a draw.
    #[error("the game has already ended")]
    GameOver,
}

/// A chess game: board, move rights, history, and status.
///
/// A game is created from a position string, mutated only by
/// [`execute_move`](Game::execute_move), and rejects further moves once
/// checkmate or a draw is reached.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    side_to_play: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
    history: Vec<Move>,
    repetition: bool,
    status: GameStatus,
    /// Caches, recomputed after every executed move.
    occupied: Bitboard,
    own: Bitboard,
    theirs: Bitboard,
    threatened: Bitboard,
    kings: [Square; 2],
    /// Threat lines bearing on the side-to-play king.
    threats: Vec<Bitboard>,
}

impl Game {
    /// Creates a game from the classic starting layout.
    pub fn new() -> Self {
        Self::from_position(PositionText::STARTPOS).expect("starting position is valid")
    }

    /// Creates a game from a position string. Empty or blank input means
    /// the starting layout.
    pub fn from_position(text: &str) -> Result<Self, MalformedPosition> {
        let trimmed = text.trim();
        let fields = if trimmed.is_empty() {
            PositionText::parse(PositionText::STARTPOS)?
        } else {
            PositionText::parse(trimmed)?
        };

        let mut board = Board::empty();
        // the placement scans rank 8 file a to rank 1 file h, which is
        // square 63 down to square 0
        let mut cursor: i32 = 63;
        for c in fields.placement.chars() {
            if c == '/' {
                continue;
            }
            if let Some(digit) = c.to_digit(10) {
                cursor -= digit as i32;
                continue;
            }
            let Some((kind, color)) = PieceKind::from_placement_char(c) else {
                continue;
            };
            let square = Square::from_index(cursor as u8)
                .ok_or_else(|| MalformedPosition::BadPlacement(fields.placement.clone()))?;
            board.place(Piece {
                kind,
                color,
                square,
            });
            cursor -= 1;
        }

        for color in [Color::White, Color::Black] {
            let kings = board
                .pieces()
                .iter()
                .filter(|p| p.kind == PieceKind::King && p.color == color)
                .count();
            if kings != 1 {
                return Err(MalformedPosition::BadPlacement(format!(
                    "expected exactly one {} king, found {}",
                    color, kings
                )));
            }
        }

        let mut game = Game {
            board,
            side_to_play: fields.side_to_move,
            castling: CastlingRights::from_field(&fields.castling),
            en_passant: fields.en_passant,
            history: Vec::new(),
            repetition: false,
            status: GameStatus::InProgress,
            occupied: Bitboard::EMPTY,
            own: Bitboard::EMPTY,
            theirs: Bitboard::EMPTY,
            threatened: Bitboard::EMPTY,
            kings: [Square::E1, Square::E8],
            threats: Vec::new(),
        };
        game.refresh_caches();
        // a loaded position may already be mate or stalemate
        game.classify();
        Ok(game)
    }

    /// Returns the side to play.
    #[inline]
    pub fn side_to_play(&self) -> Color {
        self.side_to_play
    }

    /// Returns the game status.
    #[inline]
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Returns the king square of the given color.
    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.kings[color.index()]
    }

    /// Returns true if the side to play is in check.
    #[inline]
    pub fn is_check(&self) -> bool {
        self.threatened.contains(self.kings[self.side_to_play.index()])
    }

    /// Returns the piece kind and color on a square, if any.
    pub fn piece_at(&self, square: Square) -> Option<(PieceKind, Color)> {
        self.board.piece_at(square).map(|p| (p.kind, p.color))
    }

    /// Returns the en-passant target square, present for exactly one ply
    /// after a double pawn push.
    #[inline]
    pub fn en_passant_target(&self) -> Option<Square> {
        self.en_passant
    }

    /// Returns the executed moves in order.
    #[inline]
    pub fn move_history(&self) -> &[Move] {
        &self.history
    }

    /// Returns the number of half-moves played.
    #[inline]
    pub fn ply_count(&self) -> usize {
        self.history.len()
    }

    /// Returns the destinations the piece on `square` may legally reach.
    ///
    /// The result is empty if the square is empty, holds a piece of the
    /// wrong color, or the game is over. Castling destinations appear only
    /// when every castling precondition holds; en-passant destinations only
    /// when the capture does not expose the king.
    pub fn legal_moves_for(&self, square: Square) -> Bitboard {
        if self.status != GameStatus::InProgress {
            return Bitboard::EMPTY;
        }
        match self.board.piece_at(square) {
            Some(&piece) if piece.color == self.side_to_play => self.legal_moves(piece),
            _ => Bitboard::EMPTY,
        }
    }

    /// Executes a move and classifies the resulting position.
    ///
    /// The promotion choice is consulted only when a pawn reaches its last
    /// rank; `None` or a non-promotable kind promotes to a queen.
    pub fn execute_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<MoveResult, MoveError> {
        if self.status != GameStatus::InProgress {
            return Err(MoveError::GameOver);
        }
        if !self.legal_moves_for(from).contains(to) {
            return Err(MoveError::InvalidMove);
        }
        let Some(&piece) = self.board.piece_at(from) else {
            return Err(MoveError::InvalidMove);
        };
        let us = self.side_to_play;

        // a castling king brings its rook across
        if piece.kind == PieceKind::King {
            if let Some((rook_from, rook_to)) = special::castle_rook_move(us, from, to) {
                self.board.move_piece(rook_from, rook_to);
            }
        }

        // en passant captures the pawn behind the target square
        if piece.kind == PieceKind::Pawn && self.en_passant == Some(to) {
            self.board.remove(special::en_passant_victim(to, us));
        }

        self.board.move_piece(from, to);

        let record = if piece.kind == PieceKind::Pawn && special::promotes_on(to, us) {
            let kind = special::resolve_promotion(promotion);
            self.board.set_kind(to, kind);
            Move::promoting(from, to, kind)
        } else {
            Move::new(from, to)
        };

        // castling rights never come back
        if piece.kind == PieceKind::King {
            self.castling.clear_color(us);
        }
        if piece.kind == PieceKind::Rook {
            self.castling.clear_rook_home(from);
        }
        self.castling.clear_rook_home(to);

        // the en-passant target lives for exactly one ply
        self.en_passant = if piece.kind == PieceKind::Pawn
            && (from.index() as i8 - to.index() as i8).abs() == 16
        {
            let passed = (from.index() + to.index()) / 2;
            // SAFETY: midpoint of a double push is on the board
            Some(unsafe { Square::from_index_unchecked(passed) })
        } else {
            None
        };

        self.side_to_play = us.opposite();
        self.refresh_caches();
        self.history.push(record);
        self.update_repetition();
        Ok(self.classify())
    }

    /// Serializes the live state back to the position-string format. The
    /// move counters are not tracked and render as placeholders.
    pub fn position_text(&self) -> String {
        let mut out = String::new();

        for row in (0..8u8).rev() {
            let mut empty = 0;
            for index in (row * 8..row * 8 + 8).rev() {
                // SAFETY: index stays in 0..64
                let sq = unsafe { Square::from_index_unchecked(index) };
                match self.board.piece_at(sq) {
                    Some(piece) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(piece.kind.to_placement_char(piece.color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if row > 0 {
                out.push('/');
            }
        }

        out.push(' ');
        out.push(match self.side_to_play {
            Color::White => 'w',
            Color::Black => 'b',
        });
        out.push(' ');
        out.push_str(&self.castling.to_field());
        out.push(' ');
        match self.en_passant {
            Some(sq) => out.push_str(&sq.to_algebraic()),
            None => out.push('-'),
        }
        out.push_str(" 0 1");
        out
    }

    /// Recomputes the cached bitboards, king squares, threatened squares,
    /// and threat lines for the side to play.
    fn refresh_caches(&mut self) {
        self.occupied = self.board.occupied();
        self.own = self.board.occupancy(self.side_to_play);
        self.theirs = self.occupied & !self.own;
        for color in [Color::White, Color::Black] {
            if let Some(square) = self.board.king_square(color) {
                self.kings[color.index()] = square;
            }
        }
        self.threatened = self.threatened_squares_against_self();
        self.refresh_threat_lines();
    }

    /// Squares attacked by the opponent, computed with the friendly king
    /// removed from the occupancy so that squares behind the king along a
    /// sliding ray are still marked.
    fn threatened_squares_against_self(&self) -> Bitboard {
        let king = self.kings[self.side_to_play.index()];
        let occupied = self.occupied & !Bitboard::from_square(king);
        let mut attacked = Bitboard::EMPTY;
        for piece in self.board.pieces() {
            if piece.color != self.side_to_play {
                attacked |= attacks(piece.kind, piece.color, piece.square, occupied);
            }
        }
        attacked
    }

    /// Collects the opponent threat lines bearing on the side-to-play king.
    fn refresh_threat_lines(&mut self) {
        let king = self.kings[self.side_to_play.index()];
        let mut lines = Vec::new();
        for piece in self.board.pieces() {
            if piece.color == self.side_to_play {
                continue;
            }
            let line = threat_line_to(piece.kind, piece.color, piece.square, king, self.occupied);
            if line.is_empty() {
                continue;
            }
            // a ray interrupted by another opponent piece can never become
            // a check, so it is neither a check nor a pin path
            let between = line & !Bitboard::from_square(piece.square);
            if (between & self.theirs).is_not_empty() {
                continue;
            }
            lines.push(line);
        }
        self.threats = lines;
    }

    /// Legal destinations of one side-to-play piece.
    fn legal_moves(&self, piece: Piece) -> Bitboard {
        let mut moves = pseudo_moves(piece.kind, piece.color, piece.square, self.occupied, self.own);
        match piece.kind {
            PieceKind::King => (moves | self.castle_moves()) & !self.threatened,
            PieceKind::Pawn => {
                moves |= self.en_passant_move(piece);
                self.constrain_to_threat_lines(piece, moves)
            }
            _ => self.constrain_to_threat_lines(piece, moves),
        }
    }

    /// Castling destinations of the side-to-play king, if any.
    fn castle_moves(&self) -> Bitboard {
        let us = self.side_to_play;
        let mut moves = Bitboard::EMPTY;
        for (allowed, geometry) in [
            (self.castling.can_short(us), special::short_castle(us)),
            (self.castling.can_long(us), special::long_castle(us)),
        ] {
            if !allowed {
                continue;
            }
            let rook_home = self
                .board
                .piece_at(geometry.rook_home)
                .is_some_and(|p| p.kind == PieceKind::Rook && p.color == us);
            // the king may not castle out of, through, or into check
            if rook_home
                && self.kings[us.index()] == geometry.king_home
                && (self.occupied & geometry.must_be_empty).is_empty()
                && (self.threatened & geometry.king_path).is_empty()
            {
                moves.set(geometry.king_to);
            }
        }
        moves
    }

    /// The en-passant destination of a pawn, if available and safe.
    fn en_passant_move(&self, pawn: Piece) -> Bitboard {
        let Some(target) = self.en_passant else {
            return Bitboard::EMPTY;
        };
        if !pawn_captures(pawn.square, pawn.color).contains(target) {
            return Bitboard::EMPTY;
        }
        if self.en_passant_exposes_rank(pawn, target) {
            return Bitboard::EMPTY;
        }
        Bitboard::from_square(target)
    }

    /// En passant removes two pawns from one rank in a single move. When
    /// the friendly king shares that rank, a rook or queen whose ray toward
    /// the king is occupied by exactly that pawn pair would be unmasked.
    fn en_passant_exposes_rank(&self, pawn: Piece, target: Square) -> bool {
        let king = self.kings[self.side_to_play.index()];
        if king.row() != pawn.square.row() {
            return false;
        }
        let victim = special::en_passant_victim(target, pawn.color);
        let pair = Bitboard::from_square(pawn.square) | Bitboard::from_square(victim);
        for piece in self.board.pieces() {
            if piece.color == self.side_to_play
                || !matches!(piece.kind, PieceKind::Rook | PieceKind::Queen)
                || piece.square.row() != king.row()
            {
                continue;
            }
            let between = special::row_between(piece.square, king);
            if (between & self.occupied) == pair {
                return true;
            }
        }
        false
    }

    /// Applies check and pin constraints from the collected threat lines.
    fn constrain_to_threat_lines(&self, piece: Piece, mut moves: Bitboard) -> Bitboard {
        let king = self.kings[self.side_to_play.index()];
        let in_check = self.threatened.contains(king);
        let blockers = self.own & !Bitboard::from_square(king);

        for &line in &self.threats {
            if in_check && (line & blockers).is_empty() {
                // a check line: block it or capture the attacker; taking
                // the checking pawn en passant also resolves the check
                let mut mask = line;
                if piece.kind == PieceKind::Pawn {
                    if let Some(target) = self.en_passant {
                        if moves.contains(target)
                            && mask.contains(special::en_passant_victim(target, piece.color))
                        {
                            mask.set(target);
                        }
                    }
                }
                moves &= mask;
            } else if line.contains(piece.square) {
                // pinned: the piece may only move along the pin ray
                moves &= line;
            }
        }
        moves
    }

    /// Classifies the position for the side to play, updating the status
    /// when the game is over.
    fn classify(&mut self) -> MoveResult {
        let in_check = self.is_check();
        let has_move = self
            .board
            .pieces()
            .iter()
            .any(|p| p.color == self.side_to_play && self.legal_moves(*p).is_not_empty());

        if in_check {
            if has_move {
                MoveResult::Check
            } else {
                self.status = GameStatus::Checkmate {
                    winner: self.side_to_play.opposite(),
                };
                MoveResult::Checkmate
            }
        } else if !has_move {
            self.status = GameStatus::Draw;
            MoveResult::Draw
        } else if self.repetition {
            self.status = GameStatus::Draw;
            MoveResult::Draw
        } else {
            MoveResult::Normal
        }
    }

    /// Repetition detector. Deliberately weaker than FIDE threefold: the
    /// flag latches when the move just played repeats the moves four and
    /// eight plies earlier (the same relocation three times at four-ply
    /// intervals); any other move clears it.
    fn update_repetition(&mut self) {
        let n = self.history.len();
        self.repetition = n >= 9 && {
            let last = self.history[n - 1];
            last.same_squares(self.history[n - 5]) && last.same_squares(self.history[n - 9])
        };
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn play(game: &mut Game, from: &str, to: &str) -> MoveResult {
        game.execute_move(sq(from), sq(to), None).unwrap()
    }

    fn all_legal_move_count(game: &Game) -> u32 {
        (0..64u8)
            .filter_map(Square::from_index)
            .map(|s| game.legal_moves_for(s).count())
            .sum()
    }

    #[test]
    fn twenty_legal_first_moves() {
        let game = Game::new();
        assert_eq!(game.side_to_play(), Color::White);
        assert_eq!(game.status(), GameStatus::InProgress);
        assert_eq!(all_legal_move_count(&game), 20);
    }

    #[test]
    fn empty_and_enemy_squares_have_no_moves() {
        let game = Game::new();
        assert!(game.legal_moves_for(sq("e4")).is_empty());
        assert!(game.legal_moves_for(sq("e7")).is_empty());
    }

    #[test]
    fn blank_position_string_is_startpos() {
        let game = Game::from_position("  ").unwrap();
        assert_eq!(game.position_text(), PositionText::STARTPOS);
    }

    #[test]
    fn position_text_roundtrip() {
        let game = Game::new();
        assert_eq!(game.position_text(), PositionText::STARTPOS);

        let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 0 1";
        let game = Game::from_position(fen).unwrap();
        assert_eq!(game.position_text(), fen);

        // parse -> serialize -> parse is a fixpoint
        let again = Game::from_position(&game.position_text()).unwrap();
        assert_eq!(again.position_text(), game.position_text());
    }

    #[test]
    fn missing_king_is_rejected() {
        assert!(matches!(
            Game::from_position("8/8/8/8/8/8/8/4K3 w - - 0 1"),
            Err(MalformedPosition::BadPlacement(_))
        ));
        assert!(matches!(
            Game::from_position("kk6/8/8/8/8/8/8/4K3 w - - 0 1"),
            Err(MalformedPosition::BadPlacement(_))
        ));
    }

    #[test]
    fn double_push_sets_en_passant_for_one_ply() {
        let mut game = Game::new();
        assert_eq!(play(&mut game, "e2", "e4"), MoveResult::Normal);
        assert_eq!(game.en_passant_target(), Some(sq("e3")));

        assert_eq!(play(&mut game, "a7", "a6"), MoveResult::Normal);
        assert_eq!(game.en_passant_target(), None);
    }

    #[test]
    fn invalid_move_leaves_state_unchanged() {
        let mut game = Game::new();
        let before = game.position_text();
        assert_eq!(
            game.execute_move(sq("e2"), sq("e5"), None),
            Err(MoveError::InvalidMove)
        );
        assert_eq!(game.position_text(), before);
        assert_eq!(game.side_to_play(), Color::White);
        assert_eq!(game.ply_count(), 0);
    }

    #[test]
    fn fools_mate() {
        let mut game = Game::new();
        assert_eq!(play(&mut game, "f2", "f3"), MoveResult::Normal);
        assert_eq!(play(&mut game, "e7", "e5"), MoveResult::Normal);
        assert_eq!(play(&mut game, "g2", "g4"), MoveResult::Normal);
        assert_eq!(play(&mut game, "d8", "h4"), MoveResult::Checkmate);

        assert_eq!(
            game.status(),
            GameStatus::Checkmate {
                winner: Color::Black
            }
        );
        // a finished game reports no legal moves and rejects further play
        assert_eq!(all_legal_move_count(&game), 0);
        assert_eq!(
            game.execute_move(sq("a2"), sq("a3"), None),
            Err(MoveError::GameOver)
        );
    }

    #[test]
    fn loaded_position_is_classified() {
        let mate = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 0 1";
        let game = Game::from_position(mate).unwrap();
        assert_eq!(
            game.status(),
            GameStatus::Checkmate {
                winner: Color::Black
            }
        );

        let stale = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1";
        let game = Game::from_position(stale).unwrap();
        assert_eq!(game.status(), GameStatus::Draw);
    }

    #[test]
    fn check_is_reported() {
        // 1. e4 f6 2. Qh5+
        let mut game = Game::new();
        play(&mut game, "e2", "e4");
        play(&mut game, "f7", "f6");
        assert_eq!(play(&mut game, "d1", "h5"), MoveResult::Check);
        assert!(game.is_check());
        assert_eq!(game.status(), GameStatus::InProgress);
    }

    #[test]
    fn castling_short_moves_the_rook() {
        let mut game =
            Game::from_position("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        assert!(game.legal_moves_for(sq("e1")).contains(sq("g1")));
        assert!(game.legal_moves_for(sq("e1")).contains(sq("c1")));

        play(&mut game, "e1", "g1");
        assert_eq!(game.piece_at(sq("g1")), Some((PieceKind::King, Color::White)));
        assert_eq!(game.piece_at(sq("f1")), Some((PieceKind::Rook, Color::White)));
        assert_eq!(game.piece_at(sq("h1")), None);
        assert_eq!(game.piece_at(sq("e1")), None);
        assert!(game.board.is_consistent());

        // white rights are gone, black's remain
        assert!(game.position_text().contains(" b kq "));
    }

    #[test]
    fn castling_long_moves_the_rook() {
        let mut game =
            Game::from_position("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        play(&mut game, "e1", "c1");
        assert_eq!(game.piece_at(sq("c1")), Some((PieceKind::King, Color::White)));
        assert_eq!(game.piece_at(sq("d1")), Some((PieceKind::Rook, Color::White)));
        assert_eq!(game.piece_at(sq("a1")), None);
    }

    #[test]
    fn castling_blocked_by_check_through() {
        // the e8 rook checks the king, so neither wing is available
        let game = Game::from_position("k3r3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let moves = game.legal_moves_for(sq("e1"));
        assert!(!moves.contains(sq("g1")));
        assert!(moves.contains(sq("f1")));
        assert!(moves.contains(sq("d1")));
    }

    #[test]
    fn castling_blocked_by_attacked_crossing_square() {
        // a rook on f8 covers f1; the king would pass through it
        let game = Game::from_position("k4r2/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        assert!(!game.legal_moves_for(sq("e1")).contains(sq("g1")));
    }

    #[test]
    fn castling_blocked_by_piece_between() {
        let game =
            Game::from_position("r3k2r/8/8/8/8/8/8/RN2K2R w KQkq - 0 1").unwrap();
        let moves = game.legal_moves_for(sq("e1"));
        assert!(!moves.contains(sq("c1")));
        assert!(moves.contains(sq("g1")));
    }

    #[test]
    fn rook_moves_and_captures_erode_castling_rights() {
        let mut game =
            Game::from_position("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        // white rook takes the h8 rook: white short and black short both go
        assert_eq!(play(&mut game, "h1", "h8"), MoveResult::Check);
        assert!(game.position_text().contains(" b Qq "));
        assert!(!game.legal_moves_for(sq("e8")).contains(sq("g8")));
    }

    #[test]
    fn en_passant_capture_removes_the_passed_pawn() {
        let mut game = Game::new();
        play(&mut game, "e2", "e4");
        play(&mut game, "a7", "a6");
        play(&mut game, "e4", "e5");
        play(&mut game, "f7", "f5");

        assert_eq!(game.en_passant_target(), Some(sq("f6")));
        assert!(game.legal_moves_for(sq("e5")).contains(sq("f6")));

        play(&mut game, "e5", "f6");
        assert_eq!(game.piece_at(sq("f6")), Some((PieceKind::Pawn, Color::White)));
        assert_eq!(game.piece_at(sq("f5")), None);
        assert_eq!(game.piece_at(sq("e5")), None);
        assert!(game.board.is_consistent());
    }

    #[test]
    fn en_passant_blocked_by_horizontal_pin() {
        // king and capturing pawn share rank 5 with a rook behind the pawn
        // pair; taking en passant would remove both pawns from the rank
        let mut game = Game::from_position("7k/5p2/8/r3P2K/8/8/8/8 b - - 0 1").unwrap();
        play(&mut game, "f7", "f5");

        assert_eq!(game.en_passant_target(), Some(sq("f6")));
        let moves = game.legal_moves_for(sq("e5"));
        assert!(!moves.contains(sq("f6")));
        assert!(moves.contains(sq("e6")));
    }

    #[test]
    fn en_passant_can_resolve_a_pawn_check() {
        let mut game = Game::from_position("k7/3p4/8/4P3/4K3/8/8/8 b - - 0 1").unwrap();
        // the double push checks the white king on e4
        assert_eq!(play(&mut game, "d7", "d5"), MoveResult::Check);

        // the only pawn answer is to take the checker en passant
        assert_eq!(
            game.legal_moves_for(sq("e5")),
            Bitboard::from_square(sq("d6"))
        );
        play(&mut game, "e5", "d6");
        assert_eq!(game.piece_at(sq("d5")), None);
    }

    #[test]
    fn promotion_to_knight() {
        let mut game = Game::from_position("8/P7/8/8/8/8/8/K6k w - - 0 1").unwrap();
        game.execute_move(sq("a7"), sq("a8"), Some(PieceKind::Knight))
            .unwrap();
        assert_eq!(
            game.piece_at(sq("a8")),
            Some((PieceKind::Knight, Color::White))
        );
        assert_eq!(game.move_history().last().unwrap().to_string(), "a7a8n");
        assert!(game.board.is_consistent());
    }

    #[test]
    fn promotion_defaults_to_queen() {
        let mut game = Game::from_position("8/P7/8/8/8/8/8/K6k w - - 0 1").unwrap();
        let result = game.execute_move(sq("a7"), sq("a8"), None).unwrap();
        assert_eq!(
            game.piece_at(sq("a8")),
            Some((PieceKind::Queen, Color::White))
        );
        // the fresh queen checks the h1 king along the long diagonal
        assert_eq!(result, MoveResult::Check);
    }

    #[test]
    fn promotion_choice_ignored_for_non_promotions() {
        let mut game = Game::new();
        game.execute_move(sq("e2"), sq("e4"), Some(PieceKind::Knight))
            .unwrap();
        assert_eq!(game.piece_at(sq("e4")), Some((PieceKind::Pawn, Color::White)));
        assert_eq!(game.move_history()[0].promotion, None);
    }

    #[test]
    fn stalemate_is_a_draw() {
        let mut game = Game::from_position("k7/2K5/8/1Q6/8/8/8/8 w - - 0 1").unwrap();
        assert_eq!(play(&mut game, "b5", "b6"), MoveResult::Draw);
        assert_eq!(game.status(), GameStatus::Draw);
        assert!(game.legal_moves_for(sq("a8")).is_empty());
    }

    #[test]
    fn repetition_draws_on_the_third_occurrence() {
        let mut game = Game::from_position("k7/8/8/8/8/8/8/K7 w - - 0 1").unwrap();
        play(&mut game, "a1", "b1");
        play(&mut game, "a8", "b8");
        play(&mut game, "b1", "a1");
        play(&mut game, "b8", "c8");
        assert_eq!(play(&mut game, "a1", "b1"), MoveResult::Normal);
        play(&mut game, "c8", "d8");
        play(&mut game, "b1", "a1");
        play(&mut game, "d8", "c8");
        // the same relocation at plies 1, 5, and 9
        assert_eq!(play(&mut game, "a1", "b1"), MoveResult::Draw);
        assert_eq!(game.status(), GameStatus::Draw);
    }

    #[test]
    fn repetition_requires_both_ancestors() {
        // breaking the pattern four plies before the candidate draw
        let mut game = Game::from_position("k7/8/8/8/8/8/8/K7 w - - 0 1").unwrap();
        play(&mut game, "a1", "b1");
        play(&mut game, "a8", "b8");
        play(&mut game, "b1", "a1");
        play(&mut game, "b8", "c8");
        play(&mut game, "a1", "a2");
        play(&mut game, "c8", "d8");
        play(&mut game, "a2", "a1");
        play(&mut game, "d8", "c8");
        assert_eq!(play(&mut game, "a1", "b1"), MoveResult::Normal);
        assert_eq!(game.status(), GameStatus::InProgress);
    }

    #[test]
    fn repetition_cleared_by_a_different_move() {
        let mut game = Game::from_position("k7/8/8/8/8/8/8/K7 w - - 0 1").unwrap();
        play(&mut game, "a1", "b1");
        play(&mut game, "a8", "b8");
        play(&mut game, "b1", "a1");
        play(&mut game, "b8", "c8");
        play(&mut game, "a1", "b1");
        play(&mut game, "c8", "d8");
        play(&mut game, "b1", "a1");
        play(&mut game, "d8", "c8");
        // deviating on the ninth ply keeps the game alive
        assert_eq!(play(&mut game, "a1", "a2"), MoveResult::Normal);
        assert_eq!(game.status(), GameStatus::InProgress);
    }

    #[test]
    fn pinned_bishop_cannot_leave_the_ray() {
        let game = Game::from_position("k3r3/8/8/8/8/4B3/8/4K3 w - - 0 1").unwrap();
        assert!(game.legal_moves_for(sq("e3")).is_empty());
    }

    #[test]
    fn pinned_rook_slides_along_the_ray() {
        let game = Game::from_position("k3r3/8/8/8/8/4R3/8/4K3 w - - 0 1").unwrap();
        let moves = game.legal_moves_for(sq("e3"));
        assert_eq!(moves.count(), 6);
        assert!(moves.contains(sq("e2")));
        assert!(moves.contains(sq("e8"))); // capturing the pinner
        assert!(!moves.contains(sq("a3")));
    }

    #[test]
    fn king_cannot_retreat_along_the_checking_ray() {
        let game = Game::from_position("k7/8/8/r2K4/8/8/8/8 w - - 0 1").unwrap();
        let moves = game.legal_moves_for(sq("d5"));
        // e5 lies behind the king on the rook's ray and stays attacked
        assert!(!moves.contains(sq("e5")));
        assert!(!moves.contains(sq("c5")));
        assert!(moves.contains(sq("d4")));
        assert!(moves.contains(sq("d6")));
        assert!(moves.contains(sq("e4")));
    }

    #[test]
    fn check_must_be_answered_on_the_threat_line() {
        let mut game = Game::new();
        play(&mut game, "e2", "e4");
        play(&mut game, "e7", "e5");
        play(&mut game, "d2", "d4");
        // Bb4+ pins nothing but checks along the a5-e1 diagonal
        assert_eq!(play(&mut game, "f8", "b4"), MoveResult::Check);

        // a knight far from the line has no legal move
        assert!(game.legal_moves_for(sq("g1")).is_empty());
        // blocking on c3 or d2 is allowed
        assert!(game.legal_moves_for(sq("b1")).contains(sq("c3")));
        assert!(game.legal_moves_for(sq("c1")).contains(sq("d2")));
        assert!(game.legal_moves_for(sq("d1")).contains(sq("d2")));
        // pawn c2 may block on c3
        assert!(game.legal_moves_for(sq("c2")).contains(sq("c3")));
    }

    #[test]
    fn board_stays_consistent_through_a_game() {
        let mut game = Game::new();
        for (from, to) in [
            ("e2", "e4"),
            ("d7", "d5"),
            ("e4", "d5"),
            ("d8", "d5"),
            ("b1", "c3"),
            ("d5", "a5"),
        ] {
            play(&mut game, from, to);
            assert!(game.board.is_consistent(), "after {from}{to}");
        }
        assert_eq!(game.ply_count(), 6);
    }

    #[test]
    fn king_square_tracks_the_kings() {
        let mut game = Game::new();
        assert_eq!(game.king_square(Color::White), sq("e1"));
        assert_eq!(game.king_square(Color::Black), sq("e8"));
        play(&mut game, "e2", "e4");
        play(&mut game, "e7", "e5");
        play(&mut game, "e1", "e2");
        assert_eq!(game.king_square(Color::White), sq("e2"));
    }
}
