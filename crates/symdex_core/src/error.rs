//! Error types for symdex core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in index and indexer operations.
///
/// `NotFound` and `AlreadyExists` are domain outcomes callers are expected
/// to handle; use [`CoreError::is_not_found`] and
/// [`CoreError::is_already_exists`] rather than matching on messages.
/// Everything wrapped in `Storage` is a backend failure, fatal to the
/// current operation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No index entry matches the value or pattern.
    #[error("{type_name}: no entry for {index_by}={value}")]
    NotFound {
        /// Type the index belongs to.
        type_name: String,
        /// Field (or selector name) the index is built on.
        index_by: String,
        /// The value or pattern that was looked up.
        value: String,
    },

    /// A unique index already holds the value.
    #[error("{type_name}: {index_by}={value} already exists")]
    AlreadyExists {
        /// Type the index belongs to.
        type_name: String,
        /// Field (or selector name) the index is built on.
        index_by: String,
        /// The conflicting value.
        value: String,
    },

    /// A value or primary key cannot be stored as a single entry name
    /// (empty, `.`, `..`, or containing a path separator).
    #[error("{type_name}: {index_by}={value:?} is not a valid entry name")]
    InvalidValue {
        /// Type the index belongs to.
        type_name: String,
        /// Field (or selector name) the index is built on.
        index_by: String,
        /// The rejected value or primary key.
        value: String,
    },

    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] symdex_storage::StorageError),

    /// The filter expression could not be parsed.
    #[error("invalid query: {message}")]
    Query {
        /// Description of the parse failure.
        message: String,
    },

    /// The filter expression uses an operator or function the query engine
    /// does not resolve.
    #[error("operator not supported: {operator}")]
    UnsupportedOperator {
        /// The rejected operator or function name.
        operator: String,
    },

    /// A search pattern is not a valid glob.
    #[error("invalid pattern {pattern:?}: {message}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Reason reported by the glob compiler.
        message: String,
    },

    /// The index tree holds entries it could not have written itself.
    #[error("index corrupted: {message}")]
    Corrupted {
        /// Description of the corruption.
        message: String,
    },

    /// `update` was called with entities of different types.
    #[error("update types do not match: from {from} to {to}")]
    TypeMismatch {
        /// Type of the old entity.
        from: String,
        /// Type of the new entity.
        to: String,
    },

    /// The entity has no value for a field an index or primary key refers to.
    #[error("{type_name} has no field {field}")]
    UnknownField {
        /// Type of the entity.
        type_name: String,
        /// The missing field.
        field: String,
    },

    /// No index constructor is registered for the backend/strategy pair.
    #[error("no {kind} index constructor registered for backend {backend}")]
    NoConstructor {
        /// Backend name.
        backend: String,
        /// Strategy name.
        kind: String,
    },

    /// A strategy name is not one of `unique`, `non_unique`, `autoincrement`.
    #[error("unknown index kind: {kind}")]
    InvalidKind {
        /// The rejected name.
        kind: String,
    },

    /// A function selector failed to compute its key.
    #[error("selector {name} failed: {message}")]
    Selector {
        /// Name of the selector.
        name: String,
        /// Error reported by the selector.
        message: String,
    },
}

impl CoreError {
    /// Returns true for the `NotFound` domain error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true for the `AlreadyExists` domain error.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// Returns true if a value or key was rejected as an entry name.
    #[must_use]
    pub fn is_invalid_value(&self) -> bool {
        matches!(self, Self::InvalidValue { .. })
    }

    /// Creates a query parse error.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Creates an unsupported operator error.
    pub fn unsupported(operator: impl Into<String>) -> Self {
        Self::UnsupportedOperator {
            operator: operator.into(),
        }
    }

    /// Creates an unknown index kind error.
    pub fn invalid_kind(kind: impl Into<String>) -> Self {
        Self::InvalidKind { kind: kind.into() }
    }

    /// Creates a corruption error.
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::Corrupted {
            message: message.into(),
        }
    }
}
