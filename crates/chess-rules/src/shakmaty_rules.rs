//! [`RulesProvider`] backed by the `shakmaty` crate
//!
//! Every call parses the FEN token into a fresh [`shakmaty::Chess`] value, so
//! the provider holds no state and can be shared freely.
//!
//! # Coordinate Moves
//!
//! Presentation layers report drags as from/to squares. Castling is accepted
//! both as the king's destination (`e1` → `g1`) and as king-onto-rook
//! (`e1` → `h1`). When several legal moves share the same squares (promotions)
//! the requested promotion wins, then a queen.

use crate::error::{RulesError, RulesResult};
use crate::provider::{piece_value, RulesProvider};
use crate::square::Square;
use crate::types::{MoveAttempt, MoveResult, PieceKind, Position, Side};
use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Move, Position as _, Role};
use std::collections::BTreeSet;

/// Standard-chess rules provider
#[derive(Debug, Clone, Copy, Default)]
pub struct ShakmatyRules;

impl ShakmatyRules {
    pub fn new() -> Self {
        Self
    }

    fn build(&self, position: &Position) -> RulesResult<Chess> {
        let invalid = |reason: String| RulesError::InvalidPosition {
            position: position.as_str().to_string(),
            reason,
        };

        let fen: Fen = position
            .as_str()
            .trim()
            .parse()
            .map_err(|e: shakmaty::fen::ParseFenError| invalid(e.to_string()))?;

        fen.into_position(CastlingMode::Standard)
            .map_err(|e| invalid(e.to_string()))
    }

    fn parse(&self, position: &Position) -> Option<Chess> {
        self.build(position).ok()
    }

    fn play(&self, before: Chess, m: &Move) -> Option<MoveResult> {
        let from = m.from().and_then(from_shakmaty)?;
        let to = destination(m)?;
        let captured = m.capture().map(kind_from_role);
        let san = San::from_move(&before, m).to_string();

        let mut after = before;
        after.play_unchecked(m);

        let is_checkmate = after.is_checkmate();
        let is_check = after.is_check();
        let suffix = if is_checkmate {
            "#"
        } else if is_check {
            "+"
        } else {
            ""
        };

        Some(MoveResult {
            san: format!("{san}{suffix}"),
            from,
            to,
            captured,
            position: encode(after),
            is_check,
            is_checkmate,
        })
    }
}

impl RulesProvider for ShakmatyRules {
    fn validate(&self, position: &Position) -> RulesResult<()> {
        self.build(position).map(|_| ())
    }

    fn legal_destinations(&self, position: &Position, from: Square) -> BTreeSet<Square> {
        let Some(pos) = self.parse(position) else {
            return BTreeSet::new();
        };

        pos.legal_moves()
            .into_iter()
            .filter(|m| m.from().and_then(from_shakmaty) == Some(from))
            .filter_map(|m| destination(&m))
            .collect()
    }

    fn apply_move(&self, position: &Position, attempt: &MoveAttempt) -> Option<MoveResult> {
        let pos = self.parse(position)?;

        let candidates: Vec<Move> = pos
            .legal_moves()
            .into_iter()
            .filter(|m| matches_attempt(m, attempt))
            .collect();

        let wanted = attempt.promotion.map(role_from_kind);
        let chosen = candidates
            .iter()
            .find(|m| m.promotion() == wanted)
            .or_else(|| candidates.iter().find(|m| m.promotion() == Some(Role::Queen)))
            .or_else(|| candidates.first())?
            .clone();

        self.play(pos, &chosen)
    }

    fn apply_san(&self, position: &Position, san: &str) -> Option<MoveResult> {
        let pos = self.parse(position)?;
        let parsed: San = normalize_san(san).parse().ok()?;
        let m = parsed.to_move(&pos).ok()?;
        self.play(pos, &m)
    }

    fn is_check(&self, position: &Position) -> bool {
        self.parse(position).is_some_and(|pos| pos.is_check())
    }

    fn is_checkmate(&self, position: &Position) -> bool {
        self.parse(position).is_some_and(|pos| pos.is_checkmate())
    }

    fn is_stalemate(&self, position: &Position) -> bool {
        self.parse(position).is_some_and(|pos| pos.is_stalemate())
    }

    fn material_balance(&self, position: &Position, side: Side) -> i32 {
        let Some(pos) = self.parse(position) else {
            return 0;
        };
        let color = color_from_side(side);

        Square::all()
            .filter_map(to_shakmaty)
            .filter_map(|sq| pos.board().piece_at(sq))
            .filter(|piece| piece.color == color)
            .map(|piece| piece_value(kind_from_role(piece.role)))
            .sum()
    }

    fn turn(&self, position: &Position) -> Option<Side> {
        self.parse(position).map(|pos| side_from_color(pos.turn()))
    }

    fn piece_at(&self, position: &Position, square: Square) -> Option<(Side, PieceKind)> {
        let pos = self.parse(position)?;
        let piece = pos.board().piece_at(to_shakmaty(square)?)?;
        Some((side_from_color(piece.color), kind_from_role(piece.role)))
    }

    fn king_square(&self, position: &Position, side: Side) -> Option<Square> {
        let pos = self.parse(position)?;
        pos.board()
            .king_of(color_from_side(side))
            .and_then(from_shakmaty)
    }
}

/// Strip check, mate and annotation marks so `Qh5+`, `Qh5` and `Qh5!?` compare equal
pub fn normalize_san(san: &str) -> &str {
    san.trim().trim_end_matches(['+', '#', '!', '?'])
}

fn encode(pos: Chess) -> Position {
    Position::new(Fen(pos.into_setup(EnPassantMode::Legal)).to_string())
}

fn matches_attempt(m: &Move, attempt: &MoveAttempt) -> bool {
    if m.from().and_then(from_shakmaty) != Some(attempt.from) {
        return false;
    }
    match m {
        Move::Castle { rook, .. } => {
            from_shakmaty(*rook) == Some(attempt.to) || destination(m) == Some(attempt.to)
        }
        _ => from_shakmaty(m.to()) == Some(attempt.to),
    }
}

/// Where the moving piece lands; for castling this is the king's square
fn destination(m: &Move) -> Option<Square> {
    match m {
        Move::Castle { king, rook } => {
            let king = from_shakmaty(*king)?;
            let rook = from_shakmaty(*rook)?;
            let file = if rook.file() > king.file() { 6 } else { 2 };
            Square::new(file, king.rank())
        }
        _ => from_shakmaty(m.to()),
    }
}

fn from_shakmaty(square: shakmaty::Square) -> Option<Square> {
    square.to_string().parse().ok()
}

fn to_shakmaty(square: Square) -> Option<shakmaty::Square> {
    square.to_string().parse().ok()
}

fn side_from_color(color: Color) -> Side {
    match color {
        Color::White => Side::White,
        Color::Black => Side::Black,
    }
}

fn color_from_side(side: Side) -> Color {
    match side {
        Side::White => Color::White,
        Side::Black => Color::Black,
    }
}

fn kind_from_role(role: Role) -> PieceKind {
    match role {
        Role::Pawn => PieceKind::Pawn,
        Role::Knight => PieceKind::Knight,
        Role::Bishop => PieceKind::Bishop,
        Role::Rook => PieceKind::Rook,
        Role::Queen => PieceKind::Queen,
        Role::King => PieceKind::King,
    }
}

fn role_from_kind(kind: PieceKind) -> Role {
    match kind {
        PieceKind::Pawn => Role::Pawn,
        PieceKind::Knight => Role::Knight,
        PieceKind::Bishop => Role::Bishop,
        PieceKind::Rook => Role::Rook,
        PieceKind::Queen => Role::Queen,
        PieceKind::King => Role::King,
    }
}
