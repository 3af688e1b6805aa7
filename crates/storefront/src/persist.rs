//! Durable client-local state.
//!
//! A [`KeyValueStore`] holds one JSON document per key. Stores wrap their
//! persisted state in a [`DurableSlice`], which loads once on construction and
//! writes back after every mutation. Each store owns exactly one key.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Key holding the persisted cart entries.
pub const CART_KEY: &str = "cart-storage";

/// Key holding the persisted auth session.
pub const AUTH_KEY: &str = "auth-storage";

/// Errors from the local key-value layer.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Minimal string key-value storage.
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`; `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns `PersistError` if the backing storage cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, PersistError>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `PersistError` if the backing storage cannot be written.
    fn save(&self, key: &str, value: &str) -> Result<(), PersistError>;

    /// Delete `key`; absent keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns `PersistError` if the backing storage cannot be written.
    fn remove(&self, key: &str) -> Result<(), PersistError>;
}

// =============================================================================
// FileStore
// =============================================================================

/// One `<key>.json` file per key inside a state directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store rooted at `dir`; the directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at `dir`, creating the directory now.
    ///
    /// # Errors
    ///
    /// Returns `PersistError::Io` if `dir` cannot be created, for example
    /// because a file is in the way.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| PersistError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Directory holding the state files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, PersistError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(PersistError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn io_error(key: &str) -> impl FnOnce(io::Error) -> PersistError + '_ {
    move |source| PersistError::Io {
        key: key.to_string(),
        source,
    }
}

fn write_and_rename(tmp: &Path, path: &Path, value: &str) -> io::Result<()> {
    {
        let mut file = fs::File::create(tmp)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(tmp, path)
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, PersistError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key)(e)),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PersistError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(io_error(key))?;

        // Write to a sibling temp file, then rename over the target.
        let tmp = self
            .dir
            .join(format!(".{key}.json.tmp.{}", std::process::id()));
        if let Err(e) = write_and_rename(&tmp, &path, value) {
            let _ = fs::remove_file(&tmp);
            return Err(io_error(key)(e));
        }
        if let Ok(dir) = fs::File::open(&self.dir) {
            let _ = dir.sync_all();
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key)(e)),
        }
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-memory store for tests and throwaway sessions.
///
/// Clones share the same map, so a second store built from a clone sees what
/// the first one saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, PersistError> {
        let entries = self.entries.lock().map_err(|_| PersistError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PersistError> {
        let mut entries = self.entries.lock().map_err(|_| PersistError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        let mut entries = self.entries.lock().map_err(|_| PersistError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

// =============================================================================
// DurableSlice
// =============================================================================

/// A value mirrored to one key of a [`KeyValueStore`].
///
/// Storage failures never surface from here: a missing or unreadable value
/// loads as `T::default()`, and a failed write is logged while the in-memory
/// value stays authoritative.
#[derive(Debug)]
pub struct DurableSlice<T, S> {
    key: &'static str,
    store: S,
    value: T,
}

impl<T, S> DurableSlice<T, S>
where
    T: Serialize + DeserializeOwned + Default,
    S: KeyValueStore,
{
    /// Load the value stored under `key`.
    pub fn load(store: S, key: &'static str) -> Self {
        let value = match store.load(key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(key, error = %e, "Discarding unreadable persisted state");
                T::default()
            }),
            Ok(None) => T::default(),
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read persisted state");
                T::default()
            }
        };
        Self { key, store, value }
    }

    #[must_use]
    pub const fn get(&self) -> &T {
        &self.value
    }

    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    /// Mutate the value, then write it back.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        let result = f(&mut self.value);
        self.flush();
        result
    }

    /// Replace the value, then write it back.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.flush();
    }

    /// Reset to the default value and delete the stored key.
    pub fn clear(&mut self) {
        self.value = T::default();
        if let Err(e) = self.store.remove(self.key) {
            tracing::warn!(key = self.key, error = %e, "Failed to remove persisted state");
        }
    }

    fn flush(&self) {
        let result = serde_json::to_string(&self.value)
            .map_err(PersistError::from)
            .and_then(|raw| self.store.save(self.key, &raw));
        if let Err(e) = result {
            tracing::warn!(key = self.key, error = %e, "Failed to persist state");
        }
    }
}
