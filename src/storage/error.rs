//! Error type for snapshot storage
//!
//! Store failures are never fatal to a lesson: the machine logs them and
//! carries on with in-memory state.

/// Errors that can occur while reading or writing progress snapshots
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data exists but is not a snapshot
    #[error("Snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for storage operations
pub type StoreResult<T> = Result<T, StoreError>;
