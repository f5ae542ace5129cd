//! Typed storage provider

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StorageError;

use super::InMemoryBackend;
use super::StorageBackend;

/// Typed key-value storage.
///
/// Wraps a [`StorageBackend`] with JSON serialization. Cloning is cheap and
/// clones share the backend, so one storage can serve many tables.
#[derive(Clone)]
pub struct ColumnStorage {
    backend: Arc<dyn StorageBackend>,
}

impl ColumnStorage {
    /// Creates a storage over the given backend.
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Creates a storage over a shared backend.
    pub fn from_arc(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Creates a storage over a fresh in-memory backend.
    pub fn in_memory() -> Self {
        Self::new(InMemoryBackend::new())
    }

    /// Returns the backend.
    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    /// Get a typed value for a key.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.backend.get(key).await? {
            Some(bytes) => Ok(Some(
                serde_json::from_slice(&bytes).map_err(StorageError::Deserialization)?,
            )),
            None => Ok(None),
        }
    }

    /// Set a typed value for a key.
    pub async fn set<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec(value).map_err(StorageError::Serialization)?;
        self.backend.set(key, bytes).await
    }

    /// Delete a key.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.backend.delete(key).await
    }

    /// Delete all keys.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.backend.clear().await
    }
}

impl std::fmt::Debug for ColumnStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnStorage").finish_non_exhaustive()
    }
}
