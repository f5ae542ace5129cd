//! Storage error types

/// Errors raised by column configuration storage backends.
///
/// Callers of the column store never see these directly: persistence is
/// best-effort and failures are logged. Backends and [`ColumnStorage`] return
/// them so the store can decide what to log.
///
/// [`ColumnStorage`]: crate::columns::ColumnStorage
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// SQLite backend failure.
    #[error("database error: {0}")]
    Database(#[from] async_sqlite::Error),

    /// Failed to encode a value before writing it.
    #[error("serialization error: {0}")]
    Serialization(serde_json::Error),

    /// Stored bytes could not be decoded.
    #[error("deserialization error: {0}")]
    Deserialization(serde_json::Error),

    /// Backend cannot be reached (closed, quota exceeded, ...).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}
