//! Semantic square highlights
//!
//! Computes what the board should mark, never how: colours and gradients are
//! the renderer's business.
//!
//! - **Selected** - the picked-up piece
//! - **LegalDestination / CaptureDestination** - where it may go (only when
//!   legal-move dots are enabled)
//! - **LastMove** - from/to of the most recent committed move
//! - **Check / Checkmate** - the king of the side to move

use crate::game::events::{Highlight, HighlightRole};
use chess_rules::{Position, RulesProvider, Square};

/// Inputs to a highlight computation
#[derive(Debug, Clone, Copy)]
pub struct HighlightInputs<'a> {
    pub position: &'a Position,
    pub selected: Option<Square>,
    pub last_move: Option<(Square, Square)>,
    pub show_legal_moves: bool,
}

/// All highlights for a board state, sorted by role then square
pub fn compute_highlights<R: RulesProvider>(rules: &R, inputs: &HighlightInputs<'_>) -> Vec<Highlight> {
    let mut highlights = Vec::new();
    let position = inputs.position;

    if let Some((from, to)) = inputs.last_move {
        highlights.push(Highlight::new(from, HighlightRole::LastMove));
        highlights.push(Highlight::new(to, HighlightRole::LastMove));
    }

    if let Some(selected) = inputs.selected {
        highlights.push(Highlight::new(selected, HighlightRole::Selected));

        if inputs.show_legal_moves {
            for destination in rules.legal_destinations(position, selected) {
                let role = if rules.piece_at(position, destination).is_some() {
                    HighlightRole::CaptureDestination
                } else {
                    HighlightRole::LegalDestination
                };
                highlights.push(Highlight::new(destination, role));
            }
        }
    }

    let king_role = if rules.is_checkmate(position) {
        Some(HighlightRole::Checkmate)
    } else if rules.is_check(position) {
        Some(HighlightRole::Check)
    } else {
        None
    };
    if let Some(role) = king_role {
        let king = rules
            .turn(position)
            .and_then(|side| rules.king_square(position, side));
        if let Some(king) = king {
            highlights.push(Highlight::new(king, role));
        }
    }

    highlights.sort_by_key(|h| (h.role, h.square));
    highlights
}
