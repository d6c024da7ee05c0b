//! Key/value persistence for reader settings.
//!
//! Same contract as browser `localStorage`: string values under string keys,
//! a missing key reads as `None`, a write replaces the previous value.

use crate::log;
use std::{
    collections::BTreeMap,
    fs, io,
    path::PathBuf,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access `{0}`")]
    Io(PathBuf, #[source] io::Error),

    #[error("`{0}` is not a JSON object of strings")]
    Json(PathBuf, #[source] serde_json::Error),
}

pub trait SettingsStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// All keys in one JSON file: `{"<key>": "<value>", ...}`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_items(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(StorageError::Io(self.path.clone(), err)),
        };
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&text).map_err(|err| StorageError::Json(self.path.clone(), err))
    }
}

impl SettingsStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_items()?.remove(key))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = match self.read_items() {
            Ok(items) => items,
            Err(StorageError::Json(path, err)) => {
                log!("warn"; "{}: {err}, starting over", path.display());
                BTreeMap::new()
            }
            Err(err) => return Err(err),
        };
        items.insert(key.to_owned(), value.to_owned());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| StorageError::Io(parent.to_owned(), err))?;
        }
        let json = serde_json::to_string_pretty(&items)
            .map_err(|err| StorageError::Json(self.path.clone(), err))?;
        fs::write(&self.path, json).map_err(|err| StorageError::Io(self.path.clone(), err))
    }
}

/// In-process storage. Counts writes so callers can observe persistence.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: rustc_hash::FxHashMap<String, String>,
    writes: usize,
}

#[cfg(test)]
impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-filled with one item. Does not count as a write.
    pub fn with_item(key: &str, value: &str) -> Self {
        let mut storage = Self::default();
        storage.items.insert(key.to_owned(), value.to_owned());
        storage
    }

    /// Number of `set_item` calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

#[cfg(test)]
impl SettingsStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_owned(), value.to_owned());
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_storage_missing_file() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("settings.json"));
        assert_eq!(storage.get_item("k").unwrap(), None);
    }

    #[test]
    fn test_file_storage_roundtrip_creates_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".lectern/settings.json");
        let mut storage = FileStorage::new(&path);

        storage.set_item("a", "{\"x\":1}").unwrap();
        storage.set_item("b", "two").unwrap();
        storage.set_item("a", "three").unwrap();

        assert!(path.exists());
        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get_item("a").unwrap().as_deref(), Some("three"));
        assert_eq!(reopened.get_item("b").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn test_file_storage_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        let mut storage = FileStorage::new(&path);

        assert!(matches!(storage.get_item("k"), Err(StorageError::Json(..))));

        storage.set_item("k", "v").unwrap();
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_memory_storage_counts_writes() {
        let mut storage = MemoryStorage::with_item("k", "v");
        assert_eq!(storage.writes(), 0);
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("v"));

        storage.set_item("k", "w").unwrap();
        assert_eq!(storage.writes(), 1);
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("w"));
        assert_eq!(storage.get_item("other").unwrap(), None);
    }
}
