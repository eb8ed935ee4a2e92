//! Preference store for persisting user data to disk
//!
//! Provides a `PreferenceStore` that keeps one JSON file per typed key,
//! stamped with the time of the last write.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

use super::keys::PreferenceKey;

/// Errors that can occur when writing to the preference store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Directory creation, file write or rename failed
    #[error("Preference store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The value could not be serialized
    #[error("Failed to serialize preference: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Wrapper struct for a value stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct StoreEntry<T> {
    /// The stored value
    value: T,
    /// When the value was last written
    updated_at: DateTime<Utc>,
}

/// Reads and writes typed preferences to disk
///
/// Values are stored as JSON files in an XDG-compliant data directory
/// (`~/.local/share/movielib/` on Linux). Each write replaces the whole key
/// atomically, so the last write wins.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    /// Directory where preference files are stored
    data_dir: PathBuf,
}

impl PreferenceStore {
    /// Creates a new PreferenceStore using the XDG data directory
    ///
    /// Returns `None` if the directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "movielib")?;
        let data_dir = project_dirs.data_dir().to_path_buf();
        Some(Self { data_dir })
    }

    /// Creates a new PreferenceStore with a custom directory
    pub fn with_dir(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Directory holding the preference files
    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    /// Returns the path to the file backing a key
    fn key_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", name))
    }

    /// Reads a value
    ///
    /// Returns `None` if the key was never written or its file cannot be parsed
    /// as the key's value type.
    pub fn get<K: PreferenceKey>(&self) -> Option<K::Value> {
        let content = fs::read_to_string(self.key_path(K::NAME)).ok()?;
        match serde_json::from_str::<StoreEntry<K::Value>>(&content) {
            Ok(entry) => Some(entry.value),
            Err(e) => {
                tracing::warn!(key = K::NAME, error = %e, "Ignoring unreadable preference");
                None
            }
        }
    }

    /// Reads a value, falling back to the key's default
    pub fn get_or_default<K: PreferenceKey>(&self) -> K::Value {
        self.get::<K>().unwrap_or_else(K::default_value)
    }

    /// Replaces the value stored under a key
    ///
    /// The new file is written next to the old one and renamed over it.
    pub fn set<K: PreferenceKey>(&self, value: &K::Value) -> Result<(), StoreError> {
        fs::create_dir_all(&self.data_dir)?;

        let entry = StoreEntry {
            value,
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&entry)?;

        let path = self.key_path(K::NAME);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &path)?;

        tracing::debug!(key = K::NAME, "Preference written");
        Ok(())
    }

    /// Read-modify-write of a key, starting from the default when absent
    ///
    /// Returns the value as written.
    pub fn update<K, F>(&self, f: F) -> Result<K::Value, StoreError>
    where
        K: PreferenceKey,
        F: FnOnce(&mut K::Value),
    {
        let mut value = self.get_or_default::<K>();
        f(&mut value);
        self.set::<K>(&value)?;
        Ok(value)
    }
}
