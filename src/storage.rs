//src/storage.rs
//! Durable key-value storage for the session manager.
//!
//! The store speaks string keys and JSON documents, nothing else. Two keys
//! exist: the historical workout list and the active-workout slot. The
//! session manager does full read-modify-write of those documents; there is
//! no field-level patching at this layer.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

/// Historical workout list, JSON array of workouts.
pub const WORKOUTS_KEY: &str = "@dropset_pro:workouts";
/// Active-workout slot, a single JSON workout. Absent when no workout is
/// in progress.
pub const ACTIVE_WORKOUT_KEY: &str = "@dropset_pro:active_workout";

const APP_DATA_DIR: &str = "dropset-core";
const DATA_ENV_VAR: &str = "DROPSET_DATA_DIR"; // Environment variable name

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Could not determine application data directory.")]
    CannotDetermineDataDir,
    #[error("I/O error accessing stored data: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to (de)serialize stored JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Asynchronous key-value storage. Operations may fail; callers decide how
/// to surface or retry. Implementations never retry internally.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;
    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[async_trait]
impl<S: StorageBackend + ?Sized> StorageBackend for std::sync::Arc<S> {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key).await
    }
}

/// Determines the directory the file store keeps its documents in.
/// # Errors
/// Returns `StorageError::CannotDetermineDataDir` or I/O errors creating it.
pub fn get_data_dir() -> Result<PathBuf, StorageError> {
    let data_dir_override = std::env::var(DATA_ENV_VAR).ok();

    let data_dir_path = if let Some(path_str) = data_dir_override {
        PathBuf::from(path_str)
    } else {
        let base_data_dir = dirs::data_dir().ok_or(StorageError::CannotDetermineDataDir)?;
        base_data_dir.join(APP_DATA_DIR)
    };

    if !data_dir_path.exists() {
        std::fs::create_dir_all(&data_dir_path)?;
    }

    Ok(data_dir_path)
}

/// One JSON file per key under a data directory.
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    /// Opens the default on-device store location.
    /// # Errors
    /// Returns `StorageError` if the data directory cannot be resolved.
    pub fn open_default() -> Result<Self, StorageError> {
        Ok(Self::new(get_data_dir()?))
    }

    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys carry an app namespace prefix ("@dropset_pro:..."); flatten
        // them into plain file names.
        let sanitized: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        self.data_dir.join(format!("{sanitized}.json"))
    }
}

#[async_trait]
impl StorageBackend for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let path = self.path_for(key);
        match fs::read(&path).await {
            Ok(bytes) => {
                let value = serde_json::from_slice(&bytes)?;
                Ok(Some(value))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let bytes = serde_json::to_vec(&value)?;
        // Write to a sibling temp file first so a failed write cannot
        // truncate the previous document.
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, &bytes).await?;
        fs::rename(&tmp_path, &path).await?;
        debug!(key, bytes = bytes.len(), "persisted document");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(key, "removed document");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-memory store for tests and previews.
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.documents.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.documents.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.documents.lock().await.remove(key);
        Ok(())
    }
}
