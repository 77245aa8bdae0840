//! Storage backend trait definition.

use crate::error::StorageResult;

/// The storage capabilities an index needs.
///
/// Backends expose a small hierarchical namespace: directories, and
/// link entries whose payload is the path of another entry. An index is
/// nothing more than a directory tree of such links, so every backend
/// that can provide these operations can host one.
///
/// # Invariants
///
/// - `create_symlink` is exclusive: it fails with
///   [`StorageError::AlreadyExists`](crate::StorageError::AlreadyExists)
///   if `link_path` is already present. Unique indices rely on this as
///   their collision check.
/// - `resolve_symlink`, `read_dir` and `delete` fail with
///   [`StorageError::NotFound`](crate::StorageError::NotFound) when the
///   path is absent.
/// - Nothing is cached between calls; every call observes the current
///   state of the backend.
/// - Backends must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::DiskBackend`] - native symlinks on a local filesystem
/// - [`super::RemoteBackend`] - links emulated as small blobs on a remote
///   content repository
pub trait StorageBackend: Send + Sync {
    /// Short tag identifying the provider, used in the index path layout
    /// (`index.<name>`).
    fn name(&self) -> &str;

    /// Creates the directory at `path` and any missing parents.
    ///
    /// Succeeds without changes if the directory already exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or `path`
    /// exists and is not a directory.
    fn make_dir_if_not_exist(&self, path: &str) -> StorageResult<()>;

    /// Creates a link at `link_path` pointing to `target`.
    ///
    /// `target` does not need to exist.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` if `link_path` is taken, or an I/O or
    /// transport error.
    fn create_symlink(&self, target: &str, link_path: &str) -> StorageResult<()>;

    /// Returns the target path stored in the link at `link_path`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no link exists at `link_path`.
    fn resolve_symlink(&self, link_path: &str) -> StorageResult<String>;

    /// Lists the names of the entries directly under `path`, sorted.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the directory does not exist.
    fn read_dir(&self, path: &str) -> StorageResult<Vec<String>>;

    /// Deletes the entry at `path`. Directories are removed recursively.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if nothing exists at `path`.
    fn delete(&self, path: &str) -> StorageResult<()>;

    /// Returns true if any entry exists at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be queried.
    fn exists(&self, path: &str) -> StorageResult<bool>;
}
