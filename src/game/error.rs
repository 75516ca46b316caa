//! Error types for game module
//!
//! Provides custom error types for exercise loading, snapshot restoration and
//! session integrity checks. None of these ever reach the player: the machine
//! logs them and recovers (default position, fresh session, full reset).

/// Errors that can occur in exercise logic
#[derive(Debug, thiserror::Error)]
pub enum ExerciseError {
    /// Exercise content could not be parsed
    #[error("Invalid exercise definition: {0}")]
    Definition(#[from] serde_json::Error),

    /// The exercise's starting position cannot be built by the rules provider
    #[error("Malformed starting position '{position}': {reason}")]
    MalformedStartingPosition { position: String, reason: String },

    /// A stored snapshot failed validation
    #[error("Snapshot for '{key}' is corrupt: {reason}")]
    SnapshotCorrupt { key: String, reason: String },

    /// The session broke one of its own invariants
    #[error("Session state is inconsistent: {message}")]
    Inconsistent { message: String },
}

/// Result type alias for exercise operations
pub type ExerciseResult<T> = Result<T, ExerciseError>;
