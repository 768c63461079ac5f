//! View-state stores.
//!
//! A store maps string keys to JSON documents, the way browser local storage
//! holds serialized grid state. Grids receive a store explicitly instead of
//! reaching for a global one.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde_json::Value;
use tracing::debug;

use crate::error::{PersistenceError, Result};

/// Key/value storage for persisted view state.
pub trait ViewStateStore {
    fn read(&self, key: &str) -> Result<Option<Value>>;
    fn write(&mut self, key: &str, value: &Value) -> Result<()>;
    /// Returns whether a value was present.
    fn remove(&mut self, key: &str) -> Result<bool>;
    /// All stored keys, sorted.
    fn keys(&self) -> Result<Vec<String>>;
}

/// A store handle shared between a grid and its host.
pub type SharedStore = Rc<RefCell<dyn ViewStateStore>>;

/// In-memory store holding serialized text, like browser local storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful writes since creation.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Raw stored text for a key.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl ViewStateStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<Value>> {
        self.entries
            .get(key)
            .map(|text| {
                serde_json::from_str(text).map_err(|source| PersistenceError::Deserialization {
                    key: key.to_string(),
                    source,
                })
            })
            .transpose()
    }

    fn write(&mut self, key: &str, value: &Value) -> Result<()> {
        let text =
            serde_json::to_string(value).map_err(|source| PersistenceError::Serialization {
                key: key.to_string(),
                source,
            })?;
        self.entries.insert(key.to_string(), text);
        self.writes += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        Ok(self.entries.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}

const EXTENSION: &str = "json";

/// Escaped in file names: everything except ASCII letters, digits, `-` and `_`.
const FILE_NAME: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_');

/// One pretty-printed JSON file per key inside a directory.
///
/// Writes go to a temp file that is then renamed over the target, so a
/// crash never leaves a half-written state file behind.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`. The key is percent-encoded into the file name.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() {
            return Err(PersistenceError::InvalidKey(key.to_string()));
        }
        let stem = utf8_percent_encode(key, FILE_NAME);
        Ok(self.dir.join(format!("{stem}.{EXTENSION}")))
    }
}

impl ViewStateStore for JsonFileStore {
    fn read(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key)?;
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(PersistenceError::Io {
                    operation: "read",
                    path,
                    source,
                });
            }
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| PersistenceError::Deserialization {
                key: key.to_string(),
                source,
            })
    }

    fn write(&mut self, key: &str, value: &Value) -> Result<()> {
        let path = self.path_for(key)?;
        let bytes =
            serde_json::to_vec_pretty(value).map_err(|source| PersistenceError::Serialization {
                key: key.to_string(),
                source,
            })?;

        fs::create_dir_all(&self.dir).map_err(|source| PersistenceError::Io {
            operation: "create directory",
            path: self.dir.clone(),
            source,
        })?;

        let temp_path = path.with_extension("json.tmp");
        let mut file = File::create(&temp_path).map_err(|source| PersistenceError::Io {
            operation: "create",
            path: temp_path.clone(),
            source,
        })?;
        file.write_all(&bytes)
            .and_then(|()| file.sync_all())
            .map_err(|source| PersistenceError::Io {
                operation: "write",
                path: temp_path.clone(),
                source,
            })?;

        fs::rename(&temp_path, &path).map_err(|source| PersistenceError::AtomicWriteFailed {
            temp_path: temp_path.clone(),
            target_path: path.clone(),
            source,
        })?;

        debug!(key, path = %path.display(), "view state written");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(PersistenceError::Io {
                operation: "remove",
                path,
                source,
            }),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(PersistenceError::Io {
                    operation: "read",
                    path: self.dir.clone(),
                    source,
                });
            }
        };
        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| PersistenceError::Io {
                operation: "read",
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            match percent_decode_str(stem).decode_utf8() {
                Ok(key) => keys.push(key.into_owned()),
                Err(_) => debug!(path = %path.display(), "skipping file with undecodable name"),
            }
        }
        keys.sort();
        Ok(keys)
    }
}
