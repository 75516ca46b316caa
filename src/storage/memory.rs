//! In-memory snapshot store
//!
//! Values are kept as JSON text so a corrupt entry can be planted with
//! [`MemoryStore::insert_raw`] and is parsed exactly like one read from disk.
//! Clones share the same map.

use crate::game::types::Snapshot;
use crate::storage::error::StoreResult;
use crate::storage::SnapshotStore;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store arbitrary text under `key`
    pub fn insert_raw(&self, key: &str, raw: impl Into<String>) {
        self.entries.borrow_mut().insert(key.to_string(), raw.into());
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self, key: &str) -> StoreResult<Option<Snapshot>> {
        match self.entries.borrow().get(key) {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, key: &str, snapshot: &Snapshot) -> StoreResult<()> {
        let raw = serde_json::to_string(snapshot)?;
        self.entries.borrow_mut().insert(key.to_string(), raw);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> StoreResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}
