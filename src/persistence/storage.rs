//! Key-value storage backends for history snapshots.

use crate::persistence::error::PersistenceError;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// External key-value surface the navigator persists snapshots to.
///
/// The navigator does not know how or where bytes are kept; a WebView host
/// would typically bridge this to `localStorage` or a native preferences
/// store.
pub trait SnapshotStorage: Send + Sync {
    /// Read the bytes stored under `key`, `Ok(None)` if nothing is stored.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError>;

    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), PersistenceError>;

    fn remove(&self, key: &str) -> Result<(), PersistenceError>;
}

/// In-process storage.
///
/// Clones share the same underlying map, so a clone handed to one navigator
/// can be used to build another that restores from it.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether anything is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }
}

impl SnapshotStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        let map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(map.get(key).cloned())
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), PersistenceError> {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.remove(key);
        Ok(())
    }
}

/// Storage keeping one JSON file per key inside a directory.
///
/// Writes go to a temporary file that is then renamed over the target, so a
/// crash mid-write never leaves a truncated snapshot behind.
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path used for `key`. Characters outside `[A-Za-z0-9_-]` are
    /// replaced so keys can never escape the directory.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file}.json"))
    }

    fn storage_error(key: &str, source: io::Error) -> PersistenceError {
        PersistenceError::Storage {
            key: key.to_string(),
            source,
        }
    }
}

impl SnapshotStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::storage_error(key, e)),
        }
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir).map_err(|e| Self::storage_error(key, e))?;

        let path = self.path_for(key);
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, bytes).map_err(|e| Self::storage_error(key, e))?;
        fs::rename(&temp_path, &path).map_err(|e| Self::storage_error(key, e))
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::storage_error(key, e)),
        }
    }
}
