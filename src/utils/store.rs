//! Key-value persistence for the destination record
//!
//! A damaged or missing record is never fatal: loading it simply yields
//! "no saved destination".

use crate::core::Destination;
use crate::validation::is_valid_coordinate;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// String-valued key-value store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Volatile store, for tests and sessions without a data directory
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
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

/// Store backed by a single JSON object on disk.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, serde_json::to_string_pretty(entries)?)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }

    /// Current entries for a read-modify-write. A corrupt document is
    /// replaced; an I/O failure aborts so other keys are not lost.
    fn read_for_update(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match self.read_all() {
            Err(StoreError::Serialization(e)) => {
                tracing::warn!(path = %self.path.display(), error = %e, "store document corrupt, replacing");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.read_for_update()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.read_for_update()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

/// Read the saved destination; anything unusable counts as none saved
pub fn load_destination(store: &dyn KeyValueStore, key: &str) -> Option<Destination> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(error = %e, "destination store unreadable");
            return None;
        }
    };

    match serde_json::from_str::<Destination>(&raw) {
        Ok(destination)
            if is_valid_coordinate(destination.lat, destination.lng)
                && destination.initial_distance_meters.is_finite()
                && destination.initial_distance_meters >= 0.0 =>
        {
            Some(destination)
        }
        Ok(_) => {
            tracing::warn!(key, "saved destination out of range, ignoring");
            None
        }
        Err(e) => {
            tracing::warn!(key, error = %e, "saved destination corrupt, ignoring");
            None
        }
    }
}

pub fn save_destination(
    store: &mut dyn KeyValueStore,
    key: &str,
    destination: &Destination,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(destination)?;
    store.set(key, &raw)
}

pub fn clear_destination(store: &mut dyn KeyValueStore, key: &str) -> Result<(), StoreError> {
    store.remove(key)
}
