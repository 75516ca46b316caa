//! Error types for the rules boundary
//!
//! Most provider queries fail closed and return `None`/`false` instead of an
//! error. These variants cover the cases where a caller needs to know *why*
//! something was rejected, such as validating an exercise's starting position.

use thiserror::Error;

/// Errors that can occur at the rules boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    /// Position string could not be parsed or describes an impossible board
    #[error("Invalid position '{position}': {reason}")]
    InvalidPosition { position: String, reason: String },

    /// Square text is not a board coordinate
    #[error("Invalid square '{text}' (expected a1..h8)")]
    InvalidSquare { text: String },

    /// Move is not legal in the given position
    #[error("Illegal move '{label}' in position '{position}'")]
    IllegalMove { label: String, position: String },
}

/// Result type alias for rules operations
pub type RulesResult<T> = Result<T, RulesError>;
