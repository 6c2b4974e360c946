//! Key-value persistence for the task store
//!
//! The contract is whole-value replacement under a well-known key; loading
//! an absent key yields nothing, not an error. [`FileKvStore`] maps each key
//! to a JSON file in a data directory; [`MemoryKvStore`] backs tests and
//! ephemeral runs.

use crate::Result;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::RwLock;

/// Whole-value key-value storage contract
#[cfg_attr(test, mockall::automock)]
pub trait KvStore: Send + Sync {
    /// Read the value under `key`, `None` when absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the entire value under `key`
    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; absent keys are a no-op
    fn remove(&self, key: &str) -> Result<()>;
}

/// File-backed store, one `<key>.json` file per key
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    /// Create a store rooted at `dir`, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KvStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests and ephemeral runs
#[derive(Default)]
pub struct MemoryKvStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryKvStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().unwrap().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.write().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKvStore::new(dir.path()).unwrap();

        assert_eq!(store.get("tasks").unwrap(), None);

        store.put("tasks", "[1,2]").unwrap();
        assert_eq!(store.get("tasks").unwrap().as_deref(), Some("[1,2]"));

        // Whole-value replacement
        store.put("tasks", "[]").unwrap();
        assert_eq!(store.get("tasks").unwrap().as_deref(), Some("[]"));

        store.remove("tasks").unwrap();
        assert_eq!(store.get("tasks").unwrap(), None);

        // Removing an absent key is a no-op
        store.remove("tasks").unwrap();
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryKvStore::new();

        assert_eq!(store.get("k").unwrap(), None);
        store.put("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }
}
