//! Persistence boundary: named text blobs saved and loaded by path.
//!
//! Domain objects are encoded as RON before they reach the store. There is no
//! versioning; a blob that no longer parses is reported as a decode error.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use ron::ser::PrettyConfig;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while saving or loading persisted data.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to write '{path}': {details}")]
    Write { path: String, details: String },

    #[error("Failed to read '{path}': {details}")]
    Read { path: String, details: String },

    #[error("Failed to encode '{path}': {details}")]
    Encode { path: String, details: String },

    #[error("Failed to decode '{path}': {details}")]
    Decode { path: String, details: String },
}

pub trait PersistenceService: Send + Sync {
    fn save(&self, path: &str, blob: &str) -> Result<(), PersistenceError>;

    /// `Ok(None)` when nothing has been saved under `path` yet.
    fn load(&self, path: &str) -> Result<Option<String>, PersistenceError>;
}

impl<T: PersistenceService + ?Sized> PersistenceService for Arc<T> {
    fn save(&self, path: &str, blob: &str) -> Result<(), PersistenceError> {
        (**self).save(path, blob)
    }

    fn load(&self, path: &str) -> Result<Option<String>, PersistenceError> {
        (**self).load(path)
    }
}

/// Stores each blob as a file below a root directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl PersistenceService for FileStore {
    fn save(&self, path: &str, blob: &str) -> Result<(), PersistenceError> {
        let target = self.root.join(path);
        let write_error = |e: std::io::Error| PersistenceError::Write {
            path: target.display().to_string(),
            details: e.to_string(),
        };

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        fs::write(&target, blob).map_err(write_error)
    }

    fn load(&self, path: &str) -> Result<Option<String>, PersistenceError> {
        let target = self.root.join(path);
        match fs::read_to_string(&target) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PersistenceError::Read {
                path: target.display().to_string(),
                details: e.to_string(),
            }),
        }
    }
}

/// Keeps blobs in memory. Used when no save directory is wanted, and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceService for MemoryStore {
    fn save(&self, path: &str, blob: &str) -> Result<(), PersistenceError> {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_string(), blob.to_string());
        Ok(())
    }

    fn load(&self, path: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self
            .blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned())
    }
}

/// Encode `value` as pretty RON and save it under `path`.
pub fn save_ron<T: Serialize>(
    store: &dyn PersistenceService,
    path: &str,
    value: &T,
) -> Result<(), PersistenceError> {
    let blob = ron::ser::to_string_pretty(value, PrettyConfig::default()).map_err(|e| {
        PersistenceError::Encode {
            path: path.to_string(),
            details: e.to_string(),
        }
    })?;
    store.save(path, &blob)
}

/// Load and decode the RON blob saved under `path`, if any.
pub fn load_ron<T: DeserializeOwned>(
    store: &dyn PersistenceService,
    path: &str,
) -> Result<Option<T>, PersistenceError> {
    let Some(blob) = store.load(path)? else {
        return Ok(None);
    };

    ron::from_str(&blob)
        .map(Some)
        .map_err(|e| PersistenceError::Decode {
            path: path.to_string(),
            details: e.to_string(),
        })
}
