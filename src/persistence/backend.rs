//! Storage backends for the snapshot store.
//!
//! Both backends hold flat string keys mapped to string values. Writes are
//! applied as batches that either land completely or not at all.

use crate::{PandoraError, PandoraResult};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A durable flat key/value store.
///
/// Every mutating call is synchronous: once it returns `Ok`, the change is
/// visible to any later read, including one from a fresh process.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> PandoraResult<Option<String>>;

    /// Writes every pair in one atomic batch.
    fn set_many(&mut self, entries: &[(&str, String)]) -> PandoraResult<()>;

    /// Removes every listed key in one atomic batch. Missing keys are ignored.
    fn remove_many(&mut self, keys: &[&str]) -> PandoraResult<()>;

    /// Removes every key.
    fn clear(&mut self) -> PandoraResult<()>;
}

/// In-memory store for tests and runs that should not touch disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> PandoraResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_many(&mut self, entries: &[(&str, String)]) -> PandoraResult<()> {
        for (key, value) in entries {
            self.entries.insert(key.to_string(), value.clone());
        }
        Ok(())
    }

    fn remove_many(&mut self, keys: &[&str]) -> PandoraResult<()> {
        for key in keys {
            self.entries.remove(*key);
        }
        Ok(())
    }

    fn clear(&mut self) -> PandoraResult<()> {
        self.entries.clear();
        Ok(())
    }
}

/// Store backed by a single JSON object on disk.
///
/// The whole map is kept in memory and the file is rewritten on every batch
/// through a temporary sibling that is synced and renamed over the existing file.
///
/// A file that cannot be read or parsed is not fatal: the store opens empty and
/// every read fails with `PersistenceUnavailable` until the next successful
/// write replaces the file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    read_error: Option<String>,
}

impl FileStore {
    /// Opens the store at `path`, reading it if the file already exists.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match read_entries(&path) {
            Ok(entries) => {
                debug!("Opened snapshot file {} ({} keys)", path.display(), entries.len());
                Self {
                    path,
                    entries,
                    read_error: None,
                }
            }
            Err(e) => {
                warn!("Snapshot file {} is unreadable: {}", path.display(), e);
                Self {
                    path,
                    entries: BTreeMap::new(),
                    read_error: Some(e.to_string()),
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Why the file could not be loaded, if it could not.
    pub fn read_error(&self) -> Option<&str> {
        self.read_error.as_deref()
    }

    fn commit(&mut self, next: BTreeMap<String, String>) -> PandoraResult<()> {
        let contents = serde_json::to_string_pretty(&next)?;
        write_atomic(&self.path, &contents).map_err(|e| {
            warn!("Snapshot write to {} failed: {}", self.path.display(), e);
            PandoraError::PersistenceUnavailable(format!("write {}: {}", self.path.display(), e))
        })?;
        self.entries = next;
        self.read_error = None;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> PandoraResult<Option<String>> {
        if let Some(reason) = &self.read_error {
            return Err(PandoraError::PersistenceUnavailable(format!(
                "read {}: {}",
                self.path.display(),
                reason
            )));
        }
        Ok(self.entries.get(key).cloned())
    }

    fn set_many(&mut self, entries: &[(&str, String)]) -> PandoraResult<()> {
        let mut next = self.entries.clone();
        for (key, value) in entries {
            next.insert(key.to_string(), value.clone());
        }
        self.commit(next)
    }

    fn remove_many(&mut self, keys: &[&str]) -> PandoraResult<()> {
        let mut next = self.entries.clone();
        for key in keys {
            next.remove(*key);
        }
        self.commit(next)
    }

    fn clear(&mut self) -> PandoraResult<()> {
        self.commit(BTreeMap::new())
    }
}

fn read_entries(path: &Path) -> PandoraResult<BTreeMap<String, String>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let contents = fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    Ok(serde_json::from_str(&contents)?)
}

fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp_path = path.with_extension("json.tmp");
    {
        let mut file = File::create(&tmp_path)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_batches() {
        let mut store = MemoryStore::new();
        store
            .set_many(&[("a", "1".to_string()), ("b", "2".to_string())])
            .unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.len(), 2);

        store.remove_many(&["a", "missing"]).unwrap();
        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));

        store.clear().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("save.json");

        let mut store = FileStore::open(&path);
        store.set_many(&[("run.floor", "3".to_string())]).unwrap();
        drop(store);

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get("run.floor").unwrap().as_deref(), Some("3"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_file_store_writes_plain_json() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("nested").join("save.json");

        let mut store = FileStore::open(&path);
        store
            .set_many(&[("run.curses", "world_flood,eagle_eye".to_string())])
            .unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let parsed: BTreeMap<String, String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["run.curses"], "world_flood,eagle_eye");
    }

    #[test]
    fn test_file_store_clear() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("save.json");

        let mut store = FileStore::open(&path);
        store.set_many(&[("k", "v".to_string())]).unwrap();
        store.clear().unwrap();

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get("k").unwrap(), None);
    }

    #[test]
    fn test_file_store_recovers_from_garbage() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("save.json");
        fs::write(&path, "{ not json").unwrap();

        let mut store = FileStore::open(&path);
        assert!(store.read_error().is_some());
        assert!(matches!(
            store.get("run.floor"),
            Err(PandoraError::PersistenceUnavailable(_))
        ));

        store.set_many(&[("run.floor", "1".to_string())]).unwrap();
        assert!(store.read_error().is_none());
        assert_eq!(store.get("run.floor").unwrap().as_deref(), Some("1"));

        let reopened = FileStore::open(&path);
        assert!(reopened.read_error().is_none());
        assert_eq!(reopened.get("run.floor").unwrap().as_deref(), Some("1"));
    }
}
