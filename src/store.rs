use crate::error::StoreError;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::warn;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

// One JSON object on disk, re-read on every call so that separate handles
// over the same file see each other's writes.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<Map<String, Value>, StoreError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => return Err(err.into()),
        };
        if data.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str(&data) {
            Ok(entries) => Ok(entries),
            Err(err) => {
                warn!("store file {} is corrupt, starting empty: {err}", self.path.display());
                self.set_aside_corrupt();
                Ok(Map::new())
            }
        }
    }

    fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".bak");
        PathBuf::from(name)
    }

    // Keeps the unreadable file next to the store; the next write replaces it.
    fn set_aside_corrupt(&self) {
        let backup = self.backup_path();
        if let Err(err) = fs::rename(&self.path, &backup) {
            warn!("could not move corrupt store to {}: {err}", backup.display());
        }
    }

    fn write_all(&self, entries: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.read_all()?;
        Ok(entries.get(key).and_then(|v| v.as_str()).map(String::from))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), Value::String(value.to_string()));
        self.write_all(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_set_get_remove() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn file_store_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("storage.json"));
        assert_eq!(store.get("authToken").unwrap(), None);
    }

    #[test]
    fn file_store_handles_share_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let mut a = FileStore::new(&path);
        let mut b = FileStore::new(&path);

        a.set("authToken", "abc").unwrap();
        b.set("kanban-tasks-daily", "{}").unwrap();

        assert_eq!(a.get("kanban-tasks-daily").unwrap().as_deref(), Some("{}"));
        assert_eq!(b.get("authToken").unwrap().as_deref(), Some("abc"));

        a.remove("authToken").unwrap();
        assert_eq!(b.get("authToken").unwrap(), None);
    }

    #[test]
    fn file_store_recovers_from_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{ truncated").unwrap();
        let mut store = FileStore::new(&path);

        assert_eq!(store.get("authToken").unwrap(), None);
        assert_eq!(
            fs::read_to_string(dir.path().join("storage.json.bak")).unwrap(),
            "{ truncated"
        );

        store.set("authToken", "abc").unwrap();
        assert_eq!(store.get("authToken").unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn file_store_write_over_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "[1, 2").unwrap();
        let mut store = FileStore::new(&path);

        store.set("kanban-tasks-daily", "{}").unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        let entries: Map<String, Value> = serde_json::from_str(&raw).unwrap();
        assert_eq!(entries.len(), 1);
    }
}
