//! Exercise engine - move validation, progression and scoring
//!
//! Drives one chess exercise from its starting position to completion. All
//! chess knowledge comes from a [`chess_rules::RulesProvider`]; this module only
//! decides what a legal move *means* for the exercise.
//!
//! # Module Organization
//!
//! - `types` - Exercise content (steps, goals) and feedback values
//! - `history` - Committed/redoable position log
//! - `scripted` - Matching moves against a fixed script
//! - `goal` - Scoring open-ended play toward a goal
//! - `scheduler` - Logical-time task queue
//! - `session` - Session state and its invariants
//! - `reducer` - `(session, command) -> (session, effects)`
//! - `machine` - Owns a session, runs effects, exposes the public operations
//! - `events` - Output events for the presentation layer
//!
//! # Modes
//!
//! | Definition                 | Mode       |
//! |----------------------------|------------|
//! | has `goal`                 | `Goal`     |
//! | non-empty `moves`          | `Scripted` |
//! | neither                    | `FreePlay` |
//!
//! # Timing
//!
//! Nothing here reads a clock. Status clears, computer replies, premoves and
//! wrong-move reverts are tasks on the [`scheduler::Scheduler`]; the owner
//! advances logical time with [`ExerciseMachine::advance_time`].

pub mod error;
pub mod events;
pub mod goal;
pub mod history;
pub mod machine;
pub mod reducer;
pub mod scheduler;
pub mod scripted;
pub mod session;
pub mod types;

pub use error::{ExerciseError, ExerciseResult};
pub use events::{BoardEvent, Highlight, HighlightRole, SoundCue};
pub use machine::ExerciseMachine;
pub use reducer::{reduce, Command, Effect, ReduceContext, Task, Transition};
pub use session::ExerciseSession;
pub use types::{
    ExerciseDefinition, ExerciseMode, ExerciseStep, GoalConfig, GoalKind, GoalResult, MoveQuality,
    MoveStatus, Rating, SessionPhase, Snapshot,
};
