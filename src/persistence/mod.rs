//! Snapshot persistence for the entry store.
//!
//! The entry store is written to an external key-value surface after every
//! history mutation and read back once at construction. Only entries and the
//! current index are persisted; overlays and the active flow are transient
//! (the latter is recomputed from the restored current entry).
//!
//! Persistence is best-effort: [`Persistence`] logs failures and falls back
//! to an empty history instead of returning errors.

use crate::core::{EntryStore, NavigationEntry};
use serde::{Deserialize, Serialize};

pub mod error;
pub mod storage;

pub use error::PersistenceError;
pub use storage::{FileStorage, MemoryStorage, SnapshotStorage};

/// Version identifier for the snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// Key used when none is configured
pub const DEFAULT_STORAGE_KEY: &str = "navigation_history";

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

/// Serialized form of the entry store.
///
/// `currentIndex` is `-1` for an empty history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedHistory {
    /// Snapshot format version
    #[serde(default = "default_version")]
    pub version: u32,

    pub entries: Vec<NavigationEntry>,

    pub current_index: i64,
}

impl PersistedHistory {
    /// Capture the current contents of a store.
    pub fn capture(store: &EntryStore) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            entries: store.entries().to_vec(),
            current_index: store
                .current_index()
                .and_then(|index| i64::try_from(index).ok())
                .unwrap_or(-1),
        }
    }

    /// Rebuild a store, rejecting snapshots whose index does not fit the
    /// entries.
    pub fn into_store(self) -> Result<EntryStore, PersistenceError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }

        let len = self.entries.len();
        let current = match self.current_index {
            -1 => None,
            index => Some(usize::try_from(index).map_err(|_| {
                PersistenceError::ValidationFailed(format!("negative current index {index}"))
            })?),
        };

        EntryStore::from_parts(self.entries, current).ok_or_else(|| {
            PersistenceError::ValidationFailed(format!(
                "current index {} does not fit {len} entries",
                self.current_index
            ))
        })
    }

    pub fn to_json(&self) -> Result<Vec<u8>, PersistenceError> {
        serde_json::to_vec(self).map_err(|e| PersistenceError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, PersistenceError> {
        serde_json::from_slice(bytes)
            .map_err(|e| PersistenceError::DeserializationFailed(e.to_string()))
    }
}

/// A storage backend bound to the key the navigator persists under.
pub struct Persistence {
    storage: Box<dyn SnapshotStorage>,
    key: String,
}

impl Persistence {
    pub fn new(storage: Box<dyn SnapshotStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load and validate the stored snapshot.
    ///
    /// `Ok(None)` when nothing is stored.
    pub fn load(&self) -> Result<Option<EntryStore>, PersistenceError> {
        let Some(bytes) = self.storage.load(&self.key)? else {
            return Ok(None);
        };
        PersistedHistory::from_json(&bytes)?.into_store().map(Some)
    }

    pub fn save(&self, store: &EntryStore) -> Result<(), PersistenceError> {
        let bytes = PersistedHistory::capture(store).to_json()?;
        self.storage.save(&self.key, &bytes)
    }

    /// Restore the stored history, falling back to an empty store on any
    /// failure.
    pub fn restore(&self) -> EntryStore {
        match self.load() {
            Ok(Some(store)) => {
                tracing::info!(
                    key = %self.key,
                    entries = store.len(),
                    "Restored navigation history"
                );
                store
            }
            Ok(None) => EntryStore::new(),
            Err(e) => {
                tracing::warn!(
                    key = %self.key,
                    error = %e,
                    "Discarding unreadable navigation history"
                );
                EntryStore::new()
            }
        }
    }

    /// Save the store, logging instead of failing.
    pub fn save_quietly(&self, store: &EntryStore) {
        if let Err(e) = self.save(store) {
            tracing::warn!(
                key = %self.key,
                error = %e,
                "Failed to persist navigation history"
            );
        }
    }
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Priority;

    fn sample_store() -> EntryStore {
        let mut store = EntryStore::new();
        store.push(NavigationEntry::new("Home", Priority::Normal));
        store.push(NavigationEntry::new("Input", Priority::Normal).with_flow("pay"));
        store.push(NavigationEntry::new("Sheet", Priority::Popup));
        store.back();
        store
    }

    fn persistence() -> (MemoryStorage, Persistence) {
        let storage = MemoryStorage::new();
        let persistence = Persistence::new(Box::new(storage.clone()), DEFAULT_STORAGE_KEY);
        (storage, persistence)
    }

    #[test]
    fn snapshot_round_trips_store() {
        let store = sample_store();
        let (_, persistence) = persistence();

        persistence.save(&store).unwrap();
        let restored = persistence.load().unwrap().unwrap();

        assert_eq!(restored, store);
        assert_eq!(restored.current_index(), Some(1));
    }

    #[test]
    fn empty_store_uses_negative_sentinel() {
        let snapshot = PersistedHistory::capture(&EntryStore::new());
        let json: serde_json::Value = serde_json::from_slice(&snapshot.to_json().unwrap()).unwrap();

        assert_eq!(json["currentIndex"], -1);
        assert_eq!(json["entries"], serde_json::json!([]));
        assert!(snapshot.into_store().unwrap().is_empty());
    }

    #[test]
    fn missing_version_defaults_to_current() {
        let parsed = PersistedHistory::from_json(br#"{"entries":[],"currentIndex":-1}"#).unwrap();

        assert_eq!(parsed.version, SNAPSHOT_VERSION);
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let snapshot = PersistedHistory {
            version: 99,
            entries: Vec::new(),
            current_index: -1,
        };

        assert!(matches!(
            snapshot.into_store(),
            Err(PersistenceError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut snapshot = PersistedHistory::capture(&sample_store());
        snapshot.current_index = 7;

        assert!(matches!(
            snapshot.into_store(),
            Err(PersistenceError::ValidationFailed(_))
        ));

        let negative = PersistedHistory {
            version: SNAPSHOT_VERSION,
            entries: Vec::new(),
            current_index: -4,
        };
        assert!(negative.into_store().is_err());
    }

    #[test]
    fn restore_falls_back_on_corrupt_data() {
        let (storage, persistence) = persistence();
        storage.save(DEFAULT_STORAGE_KEY, b"{not json").unwrap();

        assert!(matches!(
            persistence.load(),
            Err(PersistenceError::DeserializationFailed(_))
        ));
        assert!(persistence.restore().is_empty());
    }

    #[test]
    fn restore_without_data_is_empty() {
        let (_, persistence) = persistence();

        assert!(persistence.load().unwrap().is_none());
        assert!(persistence.restore().is_empty());
    }
}
