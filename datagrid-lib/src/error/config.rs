//! Configuration error types

/// Problems detected in caller-supplied columns or rows.
///
/// Layout-time findings never interrupt rendering: the layout engine logs them
/// and falls back to the default width. Only [`ConfigError::MissingRowId`] is
/// returned as a hard error, from row flattening.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Two columns share the same key.
    #[error("duplicate column key \"{0}\"")]
    DuplicateColumnKey(String),

    /// A pinned column has no pixel width, so its offset cannot be computed.
    #[error("pinned column \"{key}\" must have a width in pixels, found {width}")]
    PinnedWithoutPixelWidth {
        /// Column key.
        key: String,
        /// The width spec as written.
        width: String,
    },

    /// An expandable row has no value in the configured id field.
    #[error("expandable row at {path} has no \"{id_field}\" value")]
    MissingRowId {
        /// Positional path of the row, e.g. `0.3.1`.
        path: String,
        /// The configured id field.
        id_field: String,
    },

    /// A key referenced by the caller is not a known column.
    #[error("unknown column \"{0}\"")]
    UnknownColumn(String),
}

impl ConfigError {
    /// Returns the column key this error refers to, if any.
    pub fn column_key(&self) -> Option<&str> {
        match self {
            Self::DuplicateColumnKey(key) | Self::UnknownColumn(key) => Some(key),
            Self::PinnedWithoutPixelWidth { key, .. } => Some(key),
            Self::MissingRowId { .. } => None,
        }
    }
}
