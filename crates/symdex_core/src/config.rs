//! Indexer configuration.

use symdex_storage::path;

/// Default data directory for disk-backed indexers.
pub const DEFAULT_DATA_DIR: &str = "/var/tmp/symdex";

/// Default data directory on a remote content repository.
pub const DEFAULT_REMOTE_DATA_DIR: &str = "/meta";

/// Configuration for an [`Indexer`](crate::Indexer).
///
/// The resulting backend layout is:
///
/// ```text
/// <data_dir>/<entity_dir>/<pk>                                   # entity files
/// <data_dir>/<index_dir_prefix>.<backend>/<strategy>.<type>.<field>/...
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexerConfig {
    /// Prefix under which index trees and entity directories live.
    pub data_dir: String,

    /// First part of the index base directory name (`index` in
    /// `index.disk`).
    pub index_dir_prefix: String,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            data_dir: DEFAULT_DATA_DIR.to_string(),
            index_dir_prefix: "index".to_string(),
        }
    }
}

impl IndexerConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration with the remote repository defaults.
    #[must_use]
    pub fn remote() -> Self {
        Self::default().data_dir(DEFAULT_REMOTE_DATA_DIR)
    }

    /// Sets the data directory.
    #[must_use]
    pub fn data_dir(mut self, dir: impl Into<String>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Sets the index directory prefix.
    #[must_use]
    pub fn index_dir_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.index_dir_prefix = prefix.into();
        self
    }

    /// Returns the directory holding all index roots for `backend`.
    #[must_use]
    pub fn index_base_dir(&self, backend: &str) -> String {
        path::join(&[
            &self.data_dir,
            &format!("{}.{}", self.index_dir_prefix, backend),
        ])
    }

    /// Returns the directory holding the entity files of `entity_dir`.
    #[must_use]
    pub fn files_dir(&self, entity_dir: &str) -> String {
        path::join(&[&self.data_dir, entity_dir])
    }
}
