//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(io::Error),

    /// The path does not exist.
    #[error("not found: {path}")]
    NotFound {
        /// The missing path.
        path: String,
    },

    /// The path already exists and the operation requires it not to.
    #[error("already exists: {path}")]
    AlreadyExists {
        /// The conflicting path.
        path: String,
    },

    /// A directory operation was attempted on a non-directory entry.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The offending path.
        path: String,
    },

    /// Stored data could not be interpreted (e.g. a non UTF-8 link payload).
    #[error("storage corrupted: {0}")]
    Corrupted(String),

    /// The remote content repository failed to serve a request.
    #[error("transport error: {0}")]
    Transport(String),
}

impl StorageError {
    /// Creates a not found error for `path`.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Creates an already exists error for `path`.
    pub fn already_exists(path: impl Into<String>) -> Self {
        Self::AlreadyExists { path: path.into() }
    }

    /// Converts an I/O error, lifting the kinds the index layer cares about
    /// into their dedicated variants.
    pub fn from_io(err: io::Error, path: &str) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::not_found(path),
            io::ErrorKind::AlreadyExists => Self::already_exists(path),
            _ => Self::Io(err),
        }
    }

    /// Returns true if this error signals a missing path.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if this error signals an existing path.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}

impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_not_found_is_lifted() {
        let err = StorageError::from_io(io::Error::from(io::ErrorKind::NotFound), "/a/b");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "not found: /a/b");
    }

    #[test]
    fn io_already_exists_is_lifted() {
        let err = StorageError::from_io(io::Error::from(io::ErrorKind::AlreadyExists), "/a");
        assert!(err.is_already_exists());
    }

    #[test]
    fn other_io_errors_pass_through() {
        let err = StorageError::from_io(io::Error::from(io::ErrorKind::PermissionDenied), "/a");
        assert!(matches!(err, StorageError::Io(_)));
        assert!(!err.is_not_found());
    }
}
