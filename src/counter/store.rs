// SPDX-License-Identifier: GPL-3.0-only

//! Key-value stores for the capture counter
//!
//! The service only needs `get`/`set` over integer values. Stores that can do
//! better override [`CountStore::increment`] with an atomic read-modify-write;
//! both stores shipped here do.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

pub type StoreResult<T> = Result<T, StoreError>;

/// Key-value store failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    Io(String),
    /// The backing file is not a valid store
    Corrupt(String),
    /// A writer panicked while holding the store lock
    Poisoned,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(msg) => write!(f, "I/O error: {}", msg),
            StoreError::Corrupt(msg) => write!(f, "Corrupt store: {}", msg),
            StoreError::Poisoned => write!(f, "Store lock poisoned"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

/// Integer key-value store
pub trait CountStore: Send + Sync {
    /// Value stored under `key`, if any
    fn get(&self, key: &str) -> StoreResult<Option<u64>>;

    /// Store `value` under `key`
    fn set(&self, key: &str, value: u64) -> StoreResult<()>;

    /// Add one to `key` (absent counts as zero) and return the new value.
    ///
    /// The default is a plain get-then-set and can lose updates under
    /// concurrent callers.
    fn increment(&self, key: &str) -> StoreResult<u64> {
        let next = self.get(key)?.unwrap_or(0).saturating_add(1);
        self.set(key, next)?;
        Ok(next)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> StoreResult<MutexGuard<'_, T>> {
    mutex.lock().map_err(|_| StoreError::Poisoned)
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, u64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CountStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<u64>> {
        Ok(lock(&self.values)?.get(key).copied())
    }

    fn set(&self, key: &str, value: u64) -> StoreResult<()> {
        lock(&self.values)?.insert(key.to_string(), value);
        Ok(())
    }

    fn increment(&self, key: &str) -> StoreResult<u64> {
        let mut values = lock(&self.values)?;
        let value = values.entry(key.to_string()).or_insert(0);
        *value = value.saturating_add(1);
        Ok(*value)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    values: HashMap<String, u64>,
}

/// Store persisted as a JSON file, rewritten on every change
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: Mutex<HashMap<String, u64>>,
}

impl FileStore {
    /// Open the store at `path`, starting empty when the file does not exist
    pub fn open(path: &Path) -> StoreResult<Self> {
        let values = if path.exists() {
            let text = std::fs::read_to_string(path)?;
            serde_json::from_str::<StoreFile>(&text)
                .map_err(|e| StoreError::Corrupt(format!("{}: {}", path.display(), e)))?
                .values
        } else {
            HashMap::new()
        };

        info!(path = %path.display(), keys = values.len(), "Opened counter store");
        Ok(Self {
            path: path.to_path_buf(),
            values: Mutex::new(values),
        })
    }

    fn persist(&self, values: &HashMap<String, u64>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(&StoreFile {
            values: values.clone(),
        })
        .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        // Replace atomically
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, text)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "Counter store persisted");
        Ok(())
    }
}

impl CountStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<u64>> {
        Ok(lock(&self.values)?.get(key).copied())
    }

    fn set(&self, key: &str, value: u64) -> StoreResult<()> {
        let mut values = lock(&self.values)?;
        let mut next = values.clone();
        next.insert(key.to_string(), value);
        self.persist(&next)?;
        *values = next;
        Ok(())
    }

    fn increment(&self, key: &str) -> StoreResult<u64> {
        let mut values = lock(&self.values)?;
        let count = values.get(key).copied().unwrap_or(0).saturating_add(1);
        let mut next = values.clone();
        next.insert(key.to_string(), count);
        // Memory only follows a successful write
        self.persist(&next)?;
        *values = next;
        Ok(count)
    }
}
