//! Storage module - Progress snapshot persistence
//!
//! One snapshot per exercise, stored under [`snapshot_key`]. The schema is the
//! [`Snapshot`] JSON object `{history, cursor, completed}`.
//!
//! # Implementations
//!
//! - [`MemoryStore`] - Shared in-process map, for tests and `--no-persist`
//! - [`JsonFileStore`] - One JSON file per key in a directory

pub mod error;
pub mod file;
pub mod memory;

pub use error::{StoreError, StoreResult};
pub use file::JsonFileStore;
pub use memory::MemoryStore;

use crate::game::types::Snapshot;

/// Storage key for an exercise's progress
pub fn snapshot_key(exercise_id: &str) -> String {
    format!("exercise-progress-{exercise_id}")
}

/// Key → snapshot store
pub trait SnapshotStore {
    /// `Ok(None)` when nothing is stored under `key`
    fn load(&self, key: &str) -> StoreResult<Option<Snapshot>>;

    fn save(&mut self, key: &str, snapshot: &Snapshot) -> StoreResult<()>;

    /// Deleting a missing key is not an error
    fn delete(&mut self, key: &str) -> StoreResult<()>;
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for Box<S> {
    fn load(&self, key: &str) -> StoreResult<Option<Snapshot>> {
        (**self).load(key)
    }

    fn save(&mut self, key: &str, snapshot: &Snapshot) -> StoreResult<()> {
        (**self).save(key, snapshot)
    }

    fn delete(&mut self, key: &str) -> StoreResult<()> {
        (**self).delete(key)
    }
}
