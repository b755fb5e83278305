//! Persisted duration store.
//!
//! Each selector keeps its default length under its own name as
//! `{hours, minutes, seconds}`. Missing fields are backfilled from the
//! caller's default instead of failing.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::types::TimeSpan;

use super::StoreError;

/// Directory under the user config dir holding the store.
const STORE_DIR_NAME: &str = "focus-timer";

/// File name of the JSON store.
const STORE_FILE_NAME: &str = "durations.json";

// ============================================================================
// StoredDuration
// ============================================================================

/// Persisted fields of one selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDuration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds: Option<u64>,
}

impl StoredDuration {
    /// Creates a complete record from a span. Sub-second parts are dropped.
    pub fn from_span(span: TimeSpan) -> Self {
        let c = span.components();
        Self {
            hours: Some(c.hours),
            minutes: Some(c.minutes),
            seconds: Some(c.seconds),
        }
    }

    /// Returns true if every field is present.
    pub fn is_complete(&self) -> bool {
        self.hours.is_some() && self.minutes.is_some() && self.seconds.is_some()
    }

    /// Fills missing fields from `default` and returns the resulting span.
    ///
    /// Returns `None` if the fields add up to more than a countdown can run.
    pub fn backfill(&self, default: TimeSpan) -> Option<TimeSpan> {
        let d = default.components();
        TimeSpan::try_compose(
            self.hours.unwrap_or(d.hours),
            self.minutes.unwrap_or(d.minutes),
            self.seconds.unwrap_or(d.seconds),
        )
    }
}

// ============================================================================
// DurationStore
// ============================================================================

/// Key/value contract for persisted selector durations.
pub trait DurationStore: Send + Sync {
    /// Reads the record stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn load(&self, key: &str) -> Result<Option<StoredDuration>, StoreError>;

    /// Writes the record for `key`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn save(&self, key: &str, value: &StoredDuration) -> Result<(), StoreError>;
}

fn check_key(key: &str) -> Result<(), StoreError> {
    if key.trim().is_empty() {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// In-memory store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, StoredDuration>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a record, e.g. a partially written one.
    pub fn insert(&self, key: impl Into<String>, value: StoredDuration) {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).insert(key.into(), value);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<StoredDuration> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).get(key).cloned()
    }
}

impl DurationStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<StoredDuration>, StoreError> {
        check_key(key)?;
        Ok(self.get(key))
    }

    fn save(&self, key: &str, value: &StoredDuration) -> Result<(), StoreError> {
        check_key(key)?;
        self.insert(key, value.clone());
        Ok(())
    }
}

/// Store backed by a single JSON document mapping key to fields.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Creates a store at `path`. The file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns `<config dir>/focus-timer/durations.json`, if a config dir exists.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(STORE_DIR_NAME).join(STORE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, StoredDuration>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(source) => Err(StoreError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn write_all(&self, records: &BTreeMap<String, StoredDuration>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(records)?;
        std::fs::write(&self.path, json).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl DurationStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<StoredDuration>, StoreError> {
        check_key(key)?;
        Ok(self.read_all()?.remove(key))
    }

    fn save(&self, key: &str, value: &StoredDuration) -> Result<(), StoreError> {
        check_key(key)?;
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut records = self.read_all()?;
        records.insert(key.to_string(), value.clone());
        self.write_all(&records)?;
        tracing::debug!(key, path = ?self.path, "duration saved");
        Ok(())
    }
}
