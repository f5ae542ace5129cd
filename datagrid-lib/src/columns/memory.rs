//! In-memory storage backend using DashMap

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::StorageError;

use super::StorageBackend;

/// An in-memory backend backed by a concurrent hash map.
///
/// Fast and thread-safe, but data is lost when the process exits. Shared
/// between tables through an `Arc`.
///
/// # Example
///
/// ```
/// use datagrid_lib::columns::InMemoryBackend;
///
/// let backend = InMemoryBackend::new();
/// assert!(backend.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    store: DashMap<String, Vec<u8>>,
}

impl InMemoryBackend {
    /// Creates a new empty backend.
    pub fn new() -> Self {
        Self {
            store: DashMap::new(),
        }
    }

    /// Creates a new backend with the specified initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            store: DashMap::with_capacity(capacity),
        }
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[async_trait]
impl StorageBackend for InMemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.store.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        self.store.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.store.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.store.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let backend = InMemoryBackend::new();

        backend.set("a", b"one".to_vec()).await.unwrap();
        backend.set("b", b"two".to_vec()).await.unwrap();
        assert_eq!(backend.get("a").await.unwrap(), Some(b"one".to_vec()));
        assert_eq!(backend.len(), 2);

        backend.delete("a").await.unwrap();
        assert_eq!(backend.get("a").await.unwrap(), None);

        backend.clear().await.unwrap();
        assert!(backend.is_empty());
    }
}
