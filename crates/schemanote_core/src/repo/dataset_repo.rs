//! Dataset persistence over a key/value store.
//!
//! # Responsibility
//! - Load/save the whole dataset as one JSON document under one key.
//! - Export/import/clear that document for settings actions.
//!
//! # Invariants
//! - `load` never fails on stored content: absent, blank or malformed JSON
//!   yields an empty dataset (malformed content is logged).
//! - `import_json` is the only content-level failure; on invalid JSON the
//!   stored document is left untouched.
//! - `save` then `load` returns the saved dataset.

use crate::model::dataset::Dataset;
use crate::repo::kv_repo::{KeyValueStore, StorageError};
use log::{info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key holding the dataset document.
pub const STORAGE_KEY: &str = "structured-notes-data";

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence-service error.
#[derive(Debug)]
pub enum StoreError {
    /// Import payload is not valid JSON.
    InvalidJson(serde_json::Error),
    /// Dataset could not be serialized.
    Serialize(serde_json::Error),
    /// Backend read/write failure.
    Storage(StorageError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidJson(err) => write!(f, "invalid JSON: {err}"),
            Self::Serialize(err) => write!(f, "failed to serialize dataset: {err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidJson(err) | Self::Serialize(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Persistence service for the dataset document.
pub struct DataStore<S: KeyValueStore> {
    backend: S,
    key: String,
}

impl<S: KeyValueStore> DataStore<S> {
    /// Creates a store using the default storage key.
    pub fn new(backend: S) -> Self {
        Self::with_key(backend, STORAGE_KEY)
    }

    /// Creates a store using a custom storage key.
    pub fn with_key(backend: S, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    /// Loads the stored dataset.
    ///
    /// # Errors
    /// - Only backend failures; content problems degrade to an empty dataset.
    pub fn load(&self) -> StoreResult<Dataset> {
        let Some(raw) = self.backend.get_item(&self.key)? else {
            return Ok(Dataset::default());
        };
        if raw.trim().is_empty() {
            return Ok(Dataset::default());
        }

        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => Ok(Dataset::from_value_lossy(value)),
            Err(err) => {
                warn!(
                    "event=data_load module=store status=recovered key={} bytes={} error={}",
                    self.key,
                    raw.len(),
                    err
                );
                Ok(Dataset::default())
            }
        }
    }

    /// Serializes and overwrites the stored dataset.
    pub fn save(&mut self, dataset: &Dataset) -> StoreResult<()> {
        let raw = serde_json::to_string(dataset).map_err(StoreError::Serialize)?;
        self.backend.set_item(&self.key, &raw)?;
        Ok(())
    }

    /// Coerces an arbitrary JSON document into a dataset and saves it.
    pub fn save_value(&mut self, value: Value) -> StoreResult<Dataset> {
        let dataset = Dataset::from_value_lossy(value);
        self.save(&dataset)?;
        Ok(dataset)
    }

    /// Returns the stored dataset as pretty-printed JSON.
    pub fn export_json(&self) -> StoreResult<String> {
        let dataset = self.load()?;
        serde_json::to_string_pretty(&dataset).map_err(StoreError::Serialize)
    }

    /// Replaces the stored dataset with the document in `json`.
    ///
    /// # Errors
    /// - `InvalidJson` when `json` does not parse; storage is not touched.
    pub fn import_json(&mut self, json: &str) -> StoreResult<Dataset> {
        let value = match serde_json::from_str::<Value>(json) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    "event=data_import module=store status=error bytes={} error={}",
                    json.len(),
                    err
                );
                return Err(StoreError::InvalidJson(err));
            }
        };

        let dataset = self.save_value(value)?;
        info!(
            "event=data_import module=store status=ok schemas={} notes={}",
            dataset.schemas.len(),
            dataset.notes.len()
        );
        Ok(dataset)
    }

    /// Removes the stored dataset entirely.
    pub fn clear(&mut self) -> StoreResult<()> {
        self.backend.remove_item(&self.key)?;
        info!("event=data_clear module=store status=ok key={}", self.key);
        Ok(())
    }
}
