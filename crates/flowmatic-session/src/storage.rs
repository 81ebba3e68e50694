//! Key/value local storage for persisted session data.
//!
//! Mirrors the browser `localStorage` contract: string keys, string values,
//! synchronous access. Writers sharing one backing file are last-write-wins.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Result, SessionError};

/// Default local storage file name.
pub const STORAGE_FILE: &str = "local-storage.json";

// ============================================================================
// SessionStorage Trait
// ============================================================================

/// Synchronous string key/value store.
pub trait SessionStorage: Send + Sync + std::fmt::Debug {
    /// Read a value.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value. Missing keys are not an error.
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// Shared storage handle.
pub type SharedStorage = Arc<dyn SessionStorage>;

// ============================================================================
// StorageKeys
// ============================================================================

/// Key names under which the session is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageKeys {
    pub user: String,
    pub access_token: String,
    pub refresh_token: String,
    pub token_expiry: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            user: "flowmatic.user".to_string(),
            access_token: "flowmatic.access_token".to_string(),
            refresh_token: "flowmatic.refresh_token".to_string(),
            token_expiry: "flowmatic.token_expiry".to_string(),
        }
    }
}

impl StorageKeys {
    /// All keys, for bulk removal.
    pub fn all(&self) -> [&str; 4] {
        [
            self.user.as_str(),
            self.access_token.as_str(),
            self.refresh_token.as_str(),
            self.token_expiry.as_str(),
        ]
    }
}

// ============================================================================
// FileStorage
// ============================================================================

/// JSON-file backed storage.
///
/// The whole map is held in memory and rewritten on every mutation.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open the storage file under `data_dir`.
    pub fn new(data_dir: &Path) -> Result<Self> {
        Self::with_path(data_dir.join(STORAGE_FILE))
    }

    /// Open a storage file at an explicit path. A missing file starts empty;
    /// an unreadable one is reported, a corrupt one is discarded.
    pub fn with_path(path: PathBuf) -> Result<Self> {
        let items = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| SessionError::Storage(format!("Failed to read storage file: {}", e)))?;
            match serde_json::from_str(&content) {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Discarding corrupt storage file");
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    /// Get the storage file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, items: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SessionError::Storage(format!("Failed to create storage directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(items)?;
        std::fs::write(&self.path, json)
            .map_err(|e| SessionError::Storage(format!("Failed to write storage file: {}", e)))
    }
}

impl SessionStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.lock();
        items.insert(key.to_string(), value.to_string());
        self.flush(&items)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.items.lock();
        if items.remove(key).is_some() {
            self.flush(&items)?;
        }
        Ok(())
    }
}

// ============================================================================
// MemoryStorage (for testing)
// ============================================================================

/// In-memory storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items.lock().remove(key);
        Ok(())
    }
}
