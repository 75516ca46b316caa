//! Value types shared across the rules boundary

use crate::square::Square;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Standard chess starting position
pub const DEFAULT_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Opaque board-state token (a FEN string)
///
/// The lesson engine stores, compares and persists positions but never looks
/// inside them; only a [`crate::RulesProvider`] interprets the text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Position(String);

impl Position {
    pub fn new(fen: impl Into<String>) -> Self {
        Self(fen.into())
    }

    /// The standard starting position
    pub fn standard() -> Self {
        Self(DEFAULT_START_FEN.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Position {
    fn from(fen: &str) -> Self {
        Self::new(fen)
    }
}

/// Side to move / piece colour
///
/// Serializes the way lesson content stores it (`"w"` / `"b"`); the long
/// names are accepted when reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "w", alias = "white", alias = "White")]
    White,
    #[serde(rename = "b", alias = "black", alias = "Black")]
    Black,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Zero-based rank a pawn of this side promotes on
    pub fn promotion_rank(self) -> u8 {
        match self {
            Side::White => 7,
            Side::Black => 0,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => f.write_str("White"),
            Side::Black => f.write_str("Black"),
        }
    }
}

/// Kind of chess piece, independent of colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

/// A user's request to move a piece
///
/// `promotion` is filled in by the lesson engine (a pawn reaching its last
/// rank becomes a queen), never by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveAttempt {
    pub from: Square,
    pub to: Square,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PieceKind>,
}

impl MoveAttempt {
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    pub fn with_promotion(mut self, kind: PieceKind) -> Self {
        self.promotion = Some(kind);
        self
    }
}

/// Outcome of applying a legal move
///
/// `san` carries the check (`+`) or mate (`#`) suffix, matching the labels
/// lesson authors write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveResult {
    pub san: String,
    pub from: Square,
    pub to: Square,
    pub captured: Option<PieceKind>,
    pub position: Position,
    pub is_check: bool,
    pub is_checkmate: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_serializes_as_short_letter() {
        assert_eq!(serde_json::to_string(&Side::White).unwrap(), "\"w\"");
        assert_eq!(serde_json::to_string(&Side::Black).unwrap(), "\"b\"");
    }

    #[test]
    fn test_side_accepts_long_names() {
        let side: Side = serde_json::from_str("\"black\"").unwrap();
        assert_eq!(side, Side::Black);
        let side: Side = serde_json::from_str("\"w\"").unwrap();
        assert_eq!(side, Side::White);
    }

    #[test]
    fn test_position_is_transparent_string() {
        let position = Position::standard();
        let json = serde_json::to_string(&position).unwrap();
        assert_eq!(json, format!("\"{DEFAULT_START_FEN}\""));
    }

    #[test]
    fn test_opponent_flips() {
        assert_eq!(Side::White.opponent(), Side::Black);
        assert_eq!(Side::Black.opponent(), Side::White);
        assert_eq!(Side::White.promotion_rank(), 7);
        assert_eq!(Side::Black.promotion_rank(), 0);
    }
}
