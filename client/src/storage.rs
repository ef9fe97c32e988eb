//! Durable key-value storage behind the auth component.
//!
//! Stands in for the host-provided persistent store the login state is
//! mirrored to. The file backend keeps a single JSON object on disk and
//! re-reads it on every access, so concurrent service instances observe
//! each other's writes.

use std::collections::BTreeMap;
use std::path::PathBuf;

use parking_lot::Mutex;

/// Opaque persisted key-value store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Ephemeral in-process store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.lock().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.lock().remove(key);
    }
}

/// File-backed store holding one JSON object per file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> BTreeMap<String, String> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                log::warn!("Failed to read store file {}: {}", self.path.display(), e);
                return BTreeMap::new();
            }
        };

        match serde_json::from_str(&data) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Failed to parse store file {}: {}", self.path.display(), e);
                BTreeMap::new()
            }
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    log::warn!(
                        "Failed to create store directory {}: {}",
                        parent.display(),
                        e
                    );
                    return;
                }
            }
        }

        match serde_json::to_string_pretty(entries) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&self.path, json) {
                    log::warn!("Failed to write store file {}: {}", self.path.display(), e);
                }
            }
            Err(e) => log::warn!("Failed to serialize store contents: {}", e),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.load().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.load();
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.load();
        if entries.remove(key).is_some() {
            self.save(&entries);
        }
    }
}
