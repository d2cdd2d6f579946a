//! Error types for data pack operations.

use std::path::PathBuf;

/// Errors raised by [`DataPack`](crate::DataPack) and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A text-transform mode outside `left`, `right`, `both`.
    #[error("invalid mode `{0}`: must be one of `left`, `right`, `both`")]
    InvalidMode(String),

    /// A rename whose shape does not fit the chosen mode.
    #[error("invalid rename for mode `{mode}`: {reason}")]
    InvalidRename {
        /// Mode the rename was given for.
        mode: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A slice that cannot be resolved.
    #[error("invalid slice: {0}")]
    InvalidSlice(String),

    /// Column lookup or removal on a column that does not exist.
    #[error("column not found: `{0}`")]
    MissingColumn(String),

    /// Adding a column whose name is already taken.
    #[error("duplicate column: `{0}`")]
    DuplicateColumn(String),

    /// Column length disagreeing with the table's row count.
    #[error("column `{column}` has {found} values, expected {expected}")]
    LengthMismatch {
        /// Column name.
        column: String,
        /// Row count of the table.
        expected: usize,
        /// Length supplied.
        found: usize,
    },

    /// Row position past the end of a table.
    #[error("position {position} out of range for table of length {len}")]
    PositionOutOfRange {
        /// Requested position.
        position: usize,
        /// Table length.
        len: usize,
    },

    /// Identifier absent from an entity table.
    #[error("key `{key}` not found in `{table}`")]
    KeyNotFound {
        /// Table searched.
        table: String,
        /// Rendered key.
        key: String,
    },

    /// Identifier present more than once in an entity table.
    #[error("key `{key}` appears more than once in `{table}`")]
    DuplicateKey {
        /// Table searched.
        table: String,
        /// Rendered key.
        key: String,
    },

    /// Target data file already exists.
    #[error("refusing to overwrite existing file {}", .0.display())]
    AlreadyExists(PathBuf),

    /// IO error.
    #[error("IO error: {0}")]
    Io(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Creates an invalid rename error.
    #[must_use]
    pub fn invalid_rename(mode: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRename {
            mode: mode.into(),
            reason: reason.into(),
        }
    }

    /// Creates a missing column error.
    #[must_use]
    pub fn missing_column(name: impl Into<String>) -> Self {
        Self::MissingColumn(name.into())
    }

    /// Creates a key not found error.
    #[must_use]
    pub fn key_not_found(table: impl Into<String>, key: impl ToString) -> Self {
        Self::KeyNotFound {
            table: table.into(),
            key: key.to_string(),
        }
    }

    /// Creates a duplicate key error.
    #[must_use]
    pub fn duplicate_key(table: impl Into<String>, key: impl ToString) -> Self {
        Self::DuplicateKey {
            table: table.into(),
            key: key.to_string(),
        }
    }

    /// Creates a length mismatch error.
    #[must_use]
    pub fn length_mismatch(column: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::LengthMismatch {
            column: column.into(),
            expected,
            found,
        }
    }

    /// Whether this error is a failed row or key lookup.
    #[must_use]
    pub const fn is_lookup(&self) -> bool {
        matches!(
            self,
            Self::PositionOutOfRange { .. } | Self::KeyNotFound { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for data pack operations.
pub type Result<T> = std::result::Result<T, Error>;
