//! Input module - Board interaction for lessons
//!
//! Converts raw pointer input (drags, drops, clicks) into exercise operations
//! and computes semantic highlights for the renderer.
//!
//! # Architecture
//!
//! - `board` - [`LessonBoard`], owner of the machine and the selection state
//! - `highlights` - Pure highlight computation over a position

pub mod board;
pub mod highlights;

pub use board::LessonBoard;
pub use highlights::{compute_highlights, HighlightInputs};

use chess_rules::Square;

/// Raw board input from the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    PieceDragStarted(Square),
    PieceDropped { source: Square, target: Square },
    SquareClicked(Square),
    /// Right click: clears the selection and any premove
    SquareAltClicked(Square),
}
