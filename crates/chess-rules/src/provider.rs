//! The rules provider contract
//!
//! This is the only interface the lesson engine requires from a chess library.
//! Implementations are stateless per call: every method receives the
//! [`Position`] token and rebuilds whatever board representation it needs.
//!
//! # Material Values
//!
//! [`piece_value`] uses the standard table (pawn 1, minor pieces 3, rook 5,
//! queen 9, king 0). The goal evaluator compares material before and after a
//! move to comment on move quality, so every provider must count the same way.

use crate::error::RulesResult;
use crate::square::Square;
use crate::types::{MoveAttempt, MoveResult, PieceKind, Position, Side};
use std::collections::BTreeSet;

/// Move-legality and position oracle
pub trait RulesProvider {
    /// Check that a position can be constructed at all
    fn validate(&self, position: &Position) -> RulesResult<()>;

    /// Squares the piece on `from` may legally move to
    ///
    /// Empty when the square is empty, holds a piece of the side not to move,
    /// or the position is malformed.
    fn legal_destinations(&self, position: &Position, from: Square) -> BTreeSet<Square>;

    /// Apply a move given by coordinates, `None` if illegal
    fn apply_move(&self, position: &Position, attempt: &MoveAttempt) -> Option<MoveResult>;

    /// Apply a move given in standard notation, `None` if illegal or unparseable
    fn apply_san(&self, position: &Position, san: &str) -> Option<MoveResult>;

    fn is_check(&self, position: &Position) -> bool;

    fn is_checkmate(&self, position: &Position) -> bool;

    fn is_stalemate(&self, position: &Position) -> bool;

    /// Sum of [`piece_value`] over the pieces `side` has on the board
    fn material_balance(&self, position: &Position, side: Side) -> i32;

    /// Side to move, `None` for a malformed position
    fn turn(&self, position: &Position) -> Option<Side>;

    fn piece_at(&self, position: &Position, square: Square) -> Option<(Side, PieceKind)>;

    fn king_square(&self, position: &Position, side: Side) -> Option<Square>;
}

/// Material value of a piece in pawns
pub fn piece_value(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Pawn => 1,
        PieceKind::Knight => 3,
        PieceKind::Bishop => 3,
        PieceKind::Rook => 5,
        PieceKind::Queen => 9,
        PieceKind::King => 0,
    }
}
