//! Key-value persistence.
//!
//! The session writes whole values (JSON text) under a handful of fixed keys.
//! Write failures are retried once and then logged; the in-memory state stays
//! the source of truth for the rest of the session.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{DaybookError, DaybookResult};

pub const EVENTS_KEY: &str = "events";
pub const CATEGORIES_KEY: &str = "categories";
pub const USE_24_HOUR_KEY: &str = "use24Hour";

/// Key that an unreadable value of `key` is copied to before it can be
/// overwritten, e.g. `events.corrupt-20250110T093000`.
pub fn corrupt_backup_key(key: &str, now: DateTime<Utc>) -> String {
    format!("{key}.corrupt-{}", now.format("%Y%m%dT%H%M%S"))
}

/// Minimal string key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> DaybookResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> DaybookResult<()>;
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> DaybookResult<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| DaybookError::Persistence(format!("read {}: {e}", path.display())))
    }

    fn set(&mut self, key: &str, value: &str) -> DaybookResult<()> {
        let write = || -> std::io::Result<()> {
            std::fs::create_dir_all(&self.dir)?;
            let path = self.path_for(key);
            let temp = self.dir.join(format!("{key}.json.tmp"));
            std::fs::write(&temp, value)?;
            std::fs::rename(&temp, &path)
        };
        write().map_err(|e| DaybookError::Persistence(format!("write '{key}': {e}")))
    }
}

/// In-memory storage, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> DaybookResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> DaybookResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read and decode `key`, falling back to `None` (with a warning) on any
/// read or decode failure.
pub fn load_json<S, T>(store: &S, key: &str) -> Option<T>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    let raw = match store.get(key) {
        Ok(raw) => raw?,
        Err(e) => {
            tracing::warn!(key, error = %e, "could not read persisted value");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring malformed persisted value");
            None
        }
    }
}

/// Encode and write `value`, retrying once. Failures are logged and
/// swallowed; returns whether the write eventually landed.
pub fn save_json<S, T>(store: &mut S, key: &str, value: &T) -> bool
where
    S: KeyValueStore + ?Sized,
    T: Serialize + ?Sized,
{
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(key, error = %e, "could not encode value for persistence");
            return false;
        }
    };
    save_raw(store, key, &raw)
}

/// Write `raw` as-is under `key`, retrying once. Same failure handling as
/// [`save_json`].
pub fn save_raw<S>(store: &mut S, key: &str, raw: &str) -> bool
where
    S: KeyValueStore + ?Sized,
{
    for attempt in 1..=2 {
        match store.set(key, raw) {
            Ok(()) => return true,
            Err(e) => tracing::warn!(key, attempt, error = %e, "persistence write failed"),
        }
    }
    false
}
