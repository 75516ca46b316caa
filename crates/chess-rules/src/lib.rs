//! Chess rules boundary for the lesson player
//!
//! The lesson engine never inspects a board directly. Every legality question,
//! move application and check/mate query goes through the [`RulesProvider`]
//! trait defined here, so any conforming chess library can be plugged in.
//!
//! # Module Organization
//!
//! - [`square`] - Algebraic board coordinates (`a1`..`h8`)
//! - [`types`] - Position token, sides, piece kinds, move attempts and results
//! - [`provider`] - The [`RulesProvider`] contract and the material table
//! - [`shakmaty_rules`] - [`ShakmatyRules`], the default implementation
//! - [`error`] - [`RulesError`] and [`RulesResult`]
//!
//! # Failing Closed
//!
//! Providers must never panic on bad input. A malformed position string or an
//! attempt that references an empty square is reported as "illegal" (`None`,
//! `false` or an empty set), never as a crash.

pub mod error;
pub mod provider;
pub mod shakmaty_rules;
pub mod square;
pub mod types;

pub use error::{RulesError, RulesResult};
pub use provider::{piece_value, RulesProvider};
pub use shakmaty_rules::{normalize_san, ShakmatyRules};
pub use square::Square;
pub use types::{MoveAttempt, MoveResult, PieceKind, Position, Side, DEFAULT_START_FEN};
