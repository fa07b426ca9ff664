//! Key-value persistence backends
//!
//! The favorites store and the theme manager each keep one string record
//! in a [`KeyValueStore`]. Two backends are provided:
//! - [`MemoryStore`]: in-process map; clones share the same map
//! - [`JsonFileStore`]: one JSON object on disk, rewritten atomically

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::StorageResult;
use crate::lock;

/// String-keyed persistent record store.
///
/// Implementations synchronize internally so one instance can be shared
/// between services behind an `Arc`.
pub trait KeyValueStore: Send + Sync {
    /// Read the record stored under `key`, if any.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous record.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete the record under `key`. Missing keys are not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// In-memory store.
///
/// Cloning yields a handle to the same map, which lets tests rebuild
/// services on top of existing data to simulate a reload.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        lock(&self.entries).remove(key);
        Ok(())
    }
}

/// File-backed store holding every record in one JSON object.
///
/// The whole map is kept in memory and written through on every change
/// using write-to-temp + rename, so a crash never leaves a torn file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Open or create the store at `path`.
    ///
    /// Parent directories are created as needed. A missing file is an
    /// empty store. A file that is not a JSON object of strings is moved
    /// aside to `<name>.corrupt` and the store starts empty.
    ///
    /// # Errors
    /// - `StorageError::Io` - directory creation or read failed
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        tracing::debug!(path = ?path, "opening JSON store");

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let entries: HashMap<String, String> = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            if contents.trim().is_empty() {
                HashMap::new()
            } else {
                match serde_json::from_str(&contents) {
                    Ok(entries) => entries,
                    Err(e) => {
                        tracing::error!(path = ?path, error = %e, "corrupt storage file, starting empty");
                        quarantine(&path);
                        HashMap::new()
                    }
                }
            }
        } else {
            HashMap::new()
        };

        tracing::debug!(records = entries.len(), "JSON store ready");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &HashMap<String, String>) -> StorageResult<()> {
        let json = serde_json::to_string_pretty(entries)?;
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

/// Move an unreadable store file out of the way so it can be inspected.
fn quarantine(path: &Path) {
    let target = path.with_extension("json.corrupt");
    if let Err(e) = std::fs::rename(path, &target) {
        tracing::warn!(path = ?path, error = %e, "failed to move corrupt storage file aside");
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = lock(&self.entries);
        let previous = entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.persist(&entries) {
            // keep memory and disk in step
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut entries = lock(&self.entries);
        let Some(previous) = entries.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.persist(&entries) {
            entries.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(())
    }
}
