//! JSON file snapshot store
//!
//! Each key becomes `<dir>/<key>.json`. The default directory is the
//! platform data directory for the app, falling back to `./progress`.

use crate::game::types::Snapshot;
use crate::storage::error::StoreResult;
use crate::storage::SnapshotStore;
use directories::ProjectDirs;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted in the user's data directory
    pub fn in_data_dir() -> Self {
        let dir = ProjectDirs::from("com", "trilltino", "XFChess")
            .map(|dirs| dirs.data_dir().join("progress"))
            .unwrap_or_else(|| PathBuf::from("progress"));
        Self::new(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for_key(&self, key: &str) -> PathBuf {
        // Keys are exercise ids; keep them to one path component
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self, key: &str) -> StoreResult<Option<Snapshot>> {
        let path = self.path_for_key(key);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        debug!("[STORE] Read {:?}", path);
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn save(&mut self, key: &str, snapshot: &Snapshot) -> StoreResult<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for_key(key);
        fs::write(&path, serde_json::to_string(snapshot)?)?;
        debug!("[STORE] Wrote {:?}", path);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> StoreResult<()> {
        let path = self.path_for_key(key);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("[STORE] Removed {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{snapshot_key, StoreError};
    use chess_rules::Position;

    fn snapshot() -> Snapshot {
        Snapshot {
            history: vec![
                Position::standard(),
                Position::new("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"),
            ],
            cursor: 1,
            completed: false,
        }
    }

    #[test]
    fn test_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("progress"));
        let key = snapshot_key("italian-1");

        assert!(store.load(&key).unwrap().is_none());
        store.save(&key, &snapshot()).unwrap();
        assert_eq!(store.load(&key).unwrap(), Some(snapshot()));

        store.delete(&key).unwrap();
        assert!(store.load(&key).unwrap().is_none());
        store.delete(&key).unwrap();
    }

    #[test]
    fn test_garbage_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        fs::write(dir.path().join("exercise-progress-x.json"), "][").unwrap();

        let err = store.load("exercise-progress-x").unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[test]
    fn test_keys_cannot_escape_the_directory() {
        let store = JsonFileStore::new("/tmp/progress");
        let path = store.path_for_key("../../etc/passwd");
        assert_eq!(path.parent(), Some(Path::new("/tmp/progress")));
    }
}
