use crate::models::Movie;
use crate::store::{FilterState, SortBy};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, warn};

/// The persisted subset of store state. Notifications are ephemeral and
/// never written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub favorites: Vec<Movie>,
    #[serde(default)]
    pub history: Vec<Movie>,
    #[serde(default)]
    pub filters: FilterState,
    #[serde(default, rename = "sortBy")]
    pub sort_by: SortBy,
}

/// Injected persistence capability. The store calls `save` after every
/// committed mutation and `load` once at startup.
pub trait Persistence: Send + Sync {
    /// Previously persisted snapshot, or `None` when there is none or it
    /// cannot be read. Never fails; a corrupt value means a fresh start.
    fn load(&self) -> Option<Snapshot>;

    fn save(&self, snapshot: &Snapshot) -> Result<()>;
}

impl<P: Persistence + ?Sized> Persistence for std::sync::Arc<P> {
    fn load(&self) -> Option<Snapshot> {
        (**self).load()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        (**self).save(snapshot)
    }
}

/// Snapshot storage in a single JSON file. Writes go to a temporary file
/// first and are renamed into place so a crash never leaves a torn file.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Persistence for JsonFileStore {
    fn load(&self) -> Option<Snapshot> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!("No persisted state at {:?}: {}", self.path, e);
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!("Ignoring unreadable persisted state at {:?}: {}", self.path, e);
                None
            }
        }
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(snapshot)?;
        let tmp_path = self.path.with_extension("tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.path)?;

        debug!("Persisted snapshot to {:?}", self.path);
        Ok(())
    }
}

/// In-memory persistence for tests and embedders that manage durability
/// themselves.
#[derive(Default)]
pub struct MemoryStore {
    snapshot: Mutex<Option<Snapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Persistence for MemoryStore {
    fn load(&self) -> Option<Snapshot> {
        self.snapshot.lock().expect("memory store poisoned").clone()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        *self.snapshot.lock().expect("memory store poisoned") = Some(snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: i64, title: &str) -> Movie {
        serde_json::from_value(serde_json::json!({ "id": id, "title": title })).unwrap()
    }

    #[test]
    fn file_store_round_trips_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));

        let snapshot = Snapshot {
            favorites: vec![movie(1, "Dune")],
            history: vec![movie(2, "Arrival"), movie(1, "Dune")],
            filters: FilterState {
                year: "2021".to_string(),
                rating: 7.0,
                language: String::new(),
            },
            sort_by: SortBy::Rating,
        };
        store.save(&snapshot).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.favorites.len(), 1);
        assert_eq!(loaded.history.len(), 2);
        assert_eq!(loaded.filters.year, "2021");
        assert_eq!(loaded.sort_by, SortBy::Rating);
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("missing.json"));
        assert!(store.load().is_none());
    }

    #[test]
    fn corrupt_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json at all").unwrap();

        let store = JsonFileStore::new(path);
        assert!(store.load().is_none());
    }

    #[test]
    fn snapshot_uses_sort_by_wire_name() {
        let json = serde_json::to_string(&Snapshot::default()).unwrap();
        assert!(json.contains("\"sortBy\""));

        let parsed: Snapshot =
            serde_json::from_str(r#"{"favorites": [], "history": [], "sortBy": "alphabetical"}"#)
                .unwrap();
        assert_eq!(parsed.sort_by, SortBy::Alphabetical);
    }
}
