//! XFChess lessons - exercise progression and move validation for chess lessons
//!
//! - [`game`] - The exercise engine (scripted and goal exercises, history,
//!   scheduler, reducer, machine)
//! - [`input`] - Board interaction (selection, drag/click, highlights)
//! - [`storage`] - Progress snapshot stores
//! - [`core`] - Settings, their persistence, tracing setup
//!
//! Chess legality lives in the `chess-rules` workspace crate.

pub mod core;
pub mod game;
pub mod input;
pub mod storage;

pub use chess_rules;
pub use game::{ExerciseDefinition, ExerciseMachine};
pub use input::{InputEvent, LessonBoard};
