//! Persisted class selection.
//!
//! The selection lives in a named key-value store so the app can reopen
//! straight on the timetable of the last chosen class.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, info};

use crate::schedule::ScheduleKey;

/// Name of the store holding the selection.
pub const PREFERENCES_NAME: &str = "user_preferences";
pub const KEY_DEPARTMENT: &str = "saved_department";
pub const KEY_YEAR: &str = "saved_year";
pub const KEY_CLASS: &str = "saved_class";

/// The (department, year, class) the user picked.
pub type UserSelection = ScheduleKey;

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("preferences I/O error at {path}: {message}")]
    Io { path: String, message: String },

    #[error("preferences file {path} is not a JSON object of strings: {message}")]
    Json { path: String, message: String },
}

/// String key-value storage.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Writes all pairs in one commit.
    fn set_all(&self, pairs: &[(&str, &str)]) -> Result<(), PrefsError>;

    fn clear(&self) -> Result<(), PrefsError>;

    fn set(&self, key: &str, value: &str) -> Result<(), PrefsError> {
        self.set_all(&[(key, value)])
    }
}

/// A store kept as one JSON object in `<dir>/<name>.json`.
#[derive(Debug)]
pub struct JsonFilePreferences {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl JsonFilePreferences {
    /// Opens the store, reading any existing file.
    ///
    /// # Arguments
    /// * `dir` - Directory holding the store files
    /// * `name` - Store name, used as the file stem
    pub fn open(dir: &Path, name: &str) -> Result<Self, PrefsError> {
        let path = dir.join(format!("{}.json", name));
        let values = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| PrefsError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            let object: Map<String, Value> =
                serde_json::from_str(&content).map_err(|e| PrefsError::Json {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
            // Non-string values are ignored.
            object
                .into_iter()
                .filter_map(|(k, v)| match v {
                    Value::String(s) => Some((k, s)),
                    _ => None,
                })
                .collect()
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), keys = values.len(), "Opened preferences");
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, values: &BTreeMap<String, String>) -> Result<(), PrefsError> {
        let io_err = |e: std::io::Error| PrefsError::Io {
            path: self.path.display().to_string(),
            message: e.to_string(),
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(values).map_err(|e| PrefsError::Json {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;
        fs::write(&self.path, json).map_err(io_err)
    }
}

impl PreferenceStore for JsonFilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_all(&self, pairs: &[(&str, &str)]) -> Result<(), PrefsError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        for (key, value) in pairs {
            values.insert(key.to_string(), value.to_string());
        }
        self.flush(&values)
    }

    fn clear(&self) -> Result<(), PrefsError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.clear();
        self.flush(&values)
    }
}

#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_all(&self, pairs: &[(&str, &str)]) -> Result<(), PrefsError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        for (key, value) in pairs {
            values.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), PrefsError> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }
}

/// The saved selection, present only when all three keys are set.
pub fn load_selection(store: &dyn PreferenceStore) -> Option<UserSelection> {
    let department = store.get(KEY_DEPARTMENT)?;
    let year = store.get(KEY_YEAR)?;
    let class_name = store.get(KEY_CLASS)?;
    Some(UserSelection::new(department, year, class_name))
}

pub fn save_selection(
    store: &dyn PreferenceStore,
    selection: &UserSelection,
) -> Result<(), PrefsError> {
    store.set_all(&[
        (KEY_DEPARTMENT, selection.department.as_str()),
        (KEY_YEAR, selection.year.as_str()),
        (KEY_CLASS, selection.class_name.as_str()),
    ])?;
    info!(selection = %selection, "Saved class selection");
    Ok(())
}

pub fn clear_selection(store: &dyn PreferenceStore) -> Result<(), PrefsError> {
    store.clear()?;
    info!("Cleared class selection");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn a8() -> UserSelection {
        UserSelection::new("School of Engineering", "Year 2", "A8")
    }

    #[test]
    fn test_selection_requires_all_keys() {
        let store = MemoryPreferences::new();
        assert!(load_selection(&store).is_none());

        store.set(KEY_DEPARTMENT, "School of Engineering").unwrap();
        store.set(KEY_YEAR, "Year 2").unwrap();
        assert!(load_selection(&store).is_none());

        store.set(KEY_CLASS, "A8").unwrap();
        assert_eq!(load_selection(&store), Some(a8()));
    }

    #[test]
    fn test_clear_selection() {
        let store = MemoryPreferences::new();
        save_selection(&store, &a8()).unwrap();
        clear_selection(&store).unwrap();
        assert!(load_selection(&store).is_none());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = JsonFilePreferences::open(dir.path(), PREFERENCES_NAME).unwrap();
            save_selection(&store, &a8()).unwrap();
        }
        let store = JsonFilePreferences::open(dir.path(), PREFERENCES_NAME).unwrap();
        assert_eq!(store.path(), dir.path().join("user_preferences.json"));
        assert_eq!(load_selection(&store), Some(a8()));
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("user_preferences.json"), "[1, 2]").unwrap();
        let result = JsonFilePreferences::open(dir.path(), PREFERENCES_NAME);
        assert!(matches!(result, Err(PrefsError::Json { .. })));
    }
}
