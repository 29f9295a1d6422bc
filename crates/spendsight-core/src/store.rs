//! Pluggable persistence for engine collections
//!
//! # Architecture
//!
//! - `Store` trait defines the load/save interface the engines depend on
//! - `JsonFileStore` keeps a collection in a JSON document on disk
//! - `MemoryStore` keeps it in memory (tests, dry runs)
//!
//! # File Format
//!
//! Each collection is a single JSON object with one array under a fixed key:
//!
//! ```json
//! { "rules": [ { "id": "...", ... } ] }
//! ```
//!
//! Writes replace the whole document atomically (temp file + rename).

use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Storage backend for a collection of engine items
pub trait Store<T> {
    /// Human-readable name for log messages
    fn name(&self) -> &str;

    /// Load the full collection
    fn load(&self) -> Result<Vec<T>>;

    /// Replace the stored collection with `items`
    fn save(&self, items: &[T]) -> Result<()>;
}

/// Load a collection, falling back to an empty one on any failure.
///
/// A missing or corrupt file is recoverable: it is logged and the engine
/// starts from scratch.
pub fn load_or_empty<T, S: Store<T>>(store: &S) -> Vec<T> {
    match store.load() {
        Ok(items) => {
            debug!("Loaded {} items from {}", items.len(), store.name());
            items
        }
        Err(e) => {
            warn!(store = store.name(), error = %e, "Failed to load collection, starting empty");
            Vec::new()
        }
    }
}

/// Save a collection, logging instead of failing.
///
/// The in-memory state stays authoritative for the rest of the process even
/// when the write fails.
pub fn save_or_warn<T, S: Store<T>>(store: &S, items: &[T]) {
    if let Err(e) = store.save(items) {
        warn!(store = store.name(), error = %e, "Failed to save collection");
    }
}

/// JSON document store: `{ "<key>": [ ... ] }`
pub struct JsonFileStore<T> {
    path: PathBuf,
    key: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    pub fn new(path: impl Into<PathBuf>, key: &'static str) -> Self {
        Self {
            path: path.into(),
            key,
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T> Store<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned,
{
    fn name(&self) -> &str {
        self.key
    }

    fn load(&self) -> Result<Vec<T>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)?;
        let mut doc: serde_json::Value = serde_json::from_str(&content)?;

        match doc.get_mut(self.key).map(serde_json::Value::take) {
            Some(items) => Ok(serde_json::from_value(items)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, items: &[T]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut doc = serde_json::Map::new();
        doc.insert(self.key.to_string(), serde_json::to_value(items)?);

        let mut tmp = NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut tmp, &doc)?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        debug!("Saved {} items to {}", items.len(), self.path.display());
        Ok(())
    }
}

/// In-memory store
///
/// Clones share the same backing collection, so a test can keep a handle
/// after moving the store into an engine.
pub struct MemoryStore<T> {
    items: Arc<Mutex<Vec<T>>>,
    saves: Arc<Mutex<usize>>,
}

impl<T> Clone for MemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            saves: Arc::clone(&self.saves),
        }
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::with_items(Vec::new())
    }
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<T>) -> Self {
        Self {
            items: Arc::new(Mutex::new(items)),
            saves: Arc::new(Mutex::new(0)),
        }
    }

    /// Number of successful `save` calls so far
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|n| *n).unwrap_or(0)
    }
}

impl<T: Clone> MemoryStore<T> {
    /// Snapshot of the stored collection
    pub fn snapshot(&self) -> Vec<T> {
        self.items.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl<T: Clone> Store<T> for MemoryStore<T> {
    fn name(&self) -> &str {
        "memory"
    }

    fn load(&self) -> Result<Vec<T>> {
        self.items
            .lock()
            .map(|v| v.clone())
            .map_err(|e| Error::Store(e.to_string()))
    }

    fn save(&self, items: &[T]) -> Result<()> {
        let mut stored = self
            .items
            .lock()
            .map_err(|e| Error::Store(e.to_string()))?;
        *stored = items.to_vec();
        let mut saves = self.saves.lock().map_err(|e| Error::Store(e.to_string()))?;
        *saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: String,
        value: i32,
    }

    fn item(id: &str, value: i32) -> Item {
        Item {
            id: id.to_string(),
            value,
        }
    }

    #[test]
    fn test_json_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store: JsonFileStore<Item> = JsonFileStore::new(dir.path().join("items.json"), "items");

        store.save(&[item("a", 1), item("b", 2)]).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, vec![item("a", 1), item("b", 2)]);

        let raw = fs::read_to_string(store.path()).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(doc["items"].is_array());
    }

    #[test]
    fn test_json_store_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store: JsonFileStore<Item> = JsonFileStore::new(dir.path().join("none.json"), "items");
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_json_store_creates_parent_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("data").join("items.json");
        let store: JsonFileStore<Item> = JsonFileStore::new(&path, "items");
        store.save(&[item("a", 1)]).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_corrupt_file_falls_back_to_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("items.json");
        fs::write(&path, "{ not json").unwrap();

        let store: JsonFileStore<Item> = JsonFileStore::new(&path, "items");
        assert!(store.load().is_err());
        assert!(load_or_empty(&store).is_empty());
    }

    #[test]
    fn test_memory_store_shares_state() {
        let store = MemoryStore::new();
        let handle = store.clone();
        store.save(&[item("x", 9)]).unwrap();
        assert_eq!(handle.snapshot(), vec![item("x", 9)]);
        assert_eq!(handle.save_count(), 1);
    }
}
