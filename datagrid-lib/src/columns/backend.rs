//! Storage backend trait.

use async_trait::async_trait;

use crate::error::StorageError;

/// Backend trait for column configuration storage.
///
/// Implementations handle raw byte storage/retrieval.
/// [`ColumnStorage`](super::ColumnStorage) wraps this with typed
/// serialization.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Get raw bytes for a key.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Set raw bytes for a key.
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

    /// Delete a key.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Delete all keys.
    async fn clear(&self) -> Result<(), StorageError>;
}
