//! Output events for the presentation layer
//!
//! The exercise machine queues these in its outbox; a renderer drains them
//! after every input or clock tick. Sound and celebration are cues only, the
//! engine never plays audio or draws confetti itself.

use crate::game::types::{GoalResult, MoveQuality, MoveStatus};
use chess_rules::{MoveAttempt, MoveResult, Position, Square};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    /// The displayed position changed (commit, revert, undo, redo, reset)
    PositionChanged(Position),
    StatusChanged(MoveStatus),
    GoalResultChanged(Option<GoalResult>),
    MoveQualityChanged(Option<MoveQuality>),
    HighlightsChanged(Vec<Highlight>),
    Sound(SoundCue),
    /// Confetti cue, sent a short delay after completion
    Celebrate,
    Completed,
    /// Hint text while the hint panel is open
    HintChanged(Option<String>),
    /// Arrow for the expected move
    MoveRevealed(Option<(Square, Square)>),
    PremoveChanged(Option<MoveAttempt>),
}

/// Which sound to play for a committed move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Move,
    Capture,
    Check,
    Checkmate,
}

impl SoundCue {
    /// Mate beats check beats capture
    pub fn for_move(result: &MoveResult) -> Self {
        if result.is_checkmate {
            SoundCue::Checkmate
        } else if result.is_check {
            SoundCue::Check
        } else if result.captured.is_some() {
            SoundCue::Capture
        } else {
            SoundCue::Move
        }
    }
}

/// Semantic square highlight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HighlightRole {
    Selected,
    LegalDestination,
    CaptureDestination,
    LastMove,
    Check,
    Checkmate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Highlight {
    pub square: Square,
    pub role: HighlightRole,
}

impl Highlight {
    pub fn new(square: Square, role: HighlightRole) -> Self {
        Self { square, role }
    }
}
