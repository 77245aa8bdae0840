//! Remote content repository backend.
//!
//! A content repository only knows containers and blobs. Links are
//! emulated: the link is a small blob whose content is the target path,
//! and resolving it means downloading that blob.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use crate::path;

/// Backend tag used in the index path layout.
pub const REMOTE_BACKEND_NAME: &str = "cs3";

/// Kind of an entry in a content repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A container (directory).
    Container,
    /// A blob (file).
    Blob,
}

/// Client for a remote content repository.
///
/// This is the RPC seam: implementations translate each call into a
/// request against the repository's gateway. Deadlines and retries are
/// the implementation's concern.
pub trait ContentClient: Send + Sync {
    /// Returns the kind of the entry at `path`, or `None` if absent.
    fn stat(&self, path: &str) -> StorageResult<Option<EntryKind>>;

    /// Creates a single container. The parent must exist.
    fn create_container(&self, path: &str) -> StorageResult<()>;

    /// Uploads `data` as the blob at `path`, replacing any previous blob.
    fn upload(&self, path: &str, data: &[u8]) -> StorageResult<()>;

    /// Downloads the blob at `path`.
    fn download(&self, path: &str) -> StorageResult<Vec<u8>>;

    /// Lists the names of the entries directly under the container `path`.
    fn list_container(&self, path: &str) -> StorageResult<Vec<String>>;

    /// Deletes the entry at `path`, recursively for containers.
    fn delete(&self, path: &str) -> StorageResult<()>;
}

/// A storage backend on a remote content repository.
///
/// # Atomicity
///
/// `create_symlink` is a stat followed by an upload. It is exclusive with
/// respect to callers that serialise on the same index (the indexer's
/// per-type lock), not across independent processes.
///
/// # Example
///
/// ```rust
/// use symdex_storage::{InMemoryRepository, RemoteBackend, StorageBackend};
///
/// let backend = RemoteBackend::new(InMemoryRepository::new());
/// backend.make_dir_if_not_exist("/meta/index.cs3/unique.User.Mail").unwrap();
/// backend
///     .create_symlink("/meta/users/42", "/meta/index.cs3/unique.User.Mail/a@b.c")
///     .unwrap();
/// assert_eq!(
///     backend
///         .resolve_symlink("/meta/index.cs3/unique.User.Mail/a@b.c")
///         .unwrap(),
///     "/meta/users/42"
/// );
/// ```
#[derive(Debug)]
pub struct RemoteBackend<C: ContentClient> {
    client: C,
}

impl<C: ContentClient> RemoteBackend<C> {
    /// Creates a backend talking to the repository through `client`.
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Returns the underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C: ContentClient> StorageBackend for RemoteBackend<C> {
    fn name(&self) -> &str {
        REMOTE_BACKEND_NAME
    }

    fn make_dir_if_not_exist(&self, dir: &str) -> StorageResult<()> {
        let absolute = dir.starts_with('/');
        let mut current = String::new();

        for segment in dir.split('/').filter(|s| !s.is_empty()) {
            current = if current.is_empty() && !absolute {
                segment.to_string()
            } else {
                format!("{current}/{segment}")
            };

            match self.client.stat(&current)? {
                Some(EntryKind::Container) => {}
                Some(EntryKind::Blob) => {
                    return Err(StorageError::NotADirectory { path: current });
                }
                None => {
                    self.client.create_container(&current)?;
                    tracing::trace!(path = %current, "created container");
                }
            }
        }
        Ok(())
    }

    fn create_symlink(&self, target: &str, link_path: &str) -> StorageResult<()> {
        if self.client.stat(link_path)?.is_some() {
            return Err(StorageError::already_exists(link_path));
        }
        self.client.upload(link_path, target.as_bytes())?;
        tracing::trace!(link_target = target, link_path, "uploaded link blob");
        Ok(())
    }

    fn resolve_symlink(&self, link_path: &str) -> StorageResult<String> {
        match self.client.stat(link_path)? {
            Some(EntryKind::Blob) => {}
            Some(EntryKind::Container) => {
                return Err(StorageError::Corrupted(format!(
                    "{link_path} is a container, not a link"
                )));
            }
            None => return Err(StorageError::not_found(link_path)),
        }

        let data = self.client.download(link_path)?;
        String::from_utf8(data).map_err(|_| {
            StorageError::Corrupted(format!("link {link_path} holds a non UTF-8 target"))
        })
    }

    fn read_dir(&self, dir: &str) -> StorageResult<Vec<String>> {
        match self.client.stat(dir)? {
            Some(EntryKind::Container) => {}
            Some(EntryKind::Blob) => {
                return Err(StorageError::NotADirectory {
                    path: dir.to_string(),
                });
            }
            None => return Err(StorageError::not_found(dir)),
        }

        let mut names: Vec<String> = self
            .client
            .list_container(dir)?
            .iter()
            .map(|entry| path::base_name(entry).to_string())
            .collect();
        names.sort();
        Ok(names)
    }

    fn delete(&self, target: &str) -> StorageResult<()> {
        if self.client.stat(target)?.is_none() {
            return Err(StorageError::not_found(target));
        }
        self.client.delete(target)
    }

    fn exists(&self, target: &str) -> StorageResult<bool> {
        Ok(self.client.stat(target)?.is_some())
    }
}
