//! In-memory content repository for testing.

use crate::error::{StorageError, StorageResult};
use crate::path;
use crate::remote::{ContentClient, EntryKind};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone)]
enum Node {
    Container,
    Blob(Vec<u8>),
}

/// An in-process content repository.
///
/// Implements [`ContentClient`] over a map of normalised absolute paths,
/// so a [`RemoteBackend`](crate::RemoteBackend) can run without a server.
/// Suitable for:
/// - Unit and integration tests of the remote code path
/// - Ephemeral indices that don't need persistence
///
/// The root container `/` always exists. Creating a container or blob
/// requires its parent container to exist, as on a real repository.
///
/// # Thread Safety
///
/// This repository is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use symdex_storage::{ContentClient, InMemoryRepository};
///
/// let repo = InMemoryRepository::new();
/// repo.create_container("/meta").unwrap();
/// repo.upload("/meta/blob", b"payload").unwrap();
/// assert_eq!(repo.download("/meta/blob").unwrap(), b"payload");
/// assert_eq!(repo.list_container("/meta").unwrap(), vec!["/meta/blob"]);
/// ```
#[derive(Debug)]
pub struct InMemoryRepository {
    nodes: RwLock<BTreeMap<String, Node>>,
    connected: AtomicBool,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(raw: &str) -> String {
    path::join(&["/", raw])
}

impl InMemoryRepository {
    /// Creates a new repository holding only the root container.
    #[must_use]
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert("/".to_string(), Node::Container);
        Self {
            nodes: RwLock::new(nodes),
            connected: AtomicBool::new(true),
        }
    }

    /// Simulates losing (or regaining) the connection to the repository.
    ///
    /// While disconnected every call fails with
    /// [`StorageError::Transport`].
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Returns the number of entries, excluding the root container.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.read().len() - 1
    }

    /// Returns true if only the root container exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_connected(&self) -> StorageResult<()> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::Transport("repository unreachable".into()))
        }
    }

    fn require_parent(nodes: &BTreeMap<String, Node>, key: &str) -> StorageResult<()> {
        let parent = path::parent(key).unwrap_or("/");
        match nodes.get(parent) {
            Some(Node::Container) => Ok(()),
            Some(Node::Blob(_)) => Err(StorageError::NotADirectory {
                path: parent.to_string(),
            }),
            None => Err(StorageError::not_found(parent)),
        }
    }
}

impl ContentClient for InMemoryRepository {
    fn stat(&self, raw: &str) -> StorageResult<Option<EntryKind>> {
        self.check_connected()?;
        Ok(self.nodes.read().get(&normalize(raw)).map(|node| match node {
            Node::Container => EntryKind::Container,
            Node::Blob(_) => EntryKind::Blob,
        }))
    }

    fn create_container(&self, raw: &str) -> StorageResult<()> {
        self.check_connected()?;
        let key = normalize(raw);
        let mut nodes = self.nodes.write();
        if nodes.contains_key(&key) {
            return Err(StorageError::already_exists(key));
        }
        Self::require_parent(&nodes, &key)?;
        nodes.insert(key, Node::Container);
        Ok(())
    }

    fn upload(&self, raw: &str, data: &[u8]) -> StorageResult<()> {
        self.check_connected()?;
        let key = normalize(raw);
        let mut nodes = self.nodes.write();
        if let Some(Node::Container) = nodes.get(&key) {
            return Err(StorageError::already_exists(key));
        }
        Self::require_parent(&nodes, &key)?;
        nodes.insert(key, Node::Blob(data.to_vec()));
        Ok(())
    }

    fn download(&self, raw: &str) -> StorageResult<Vec<u8>> {
        self.check_connected()?;
        let key = normalize(raw);
        match self.nodes.read().get(&key) {
            Some(Node::Blob(data)) => Ok(data.clone()),
            Some(Node::Container) => Err(StorageError::Corrupted(format!(
                "cannot download container {key}"
            ))),
            None => Err(StorageError::not_found(key)),
        }
    }

    fn list_container(&self, raw: &str) -> StorageResult<Vec<String>> {
        self.check_connected()?;
        let key = normalize(raw);
        let nodes = self.nodes.read();
        match nodes.get(&key) {
            Some(Node::Container) => {}
            Some(Node::Blob(_)) => return Err(StorageError::NotADirectory { path: key }),
            None => return Err(StorageError::not_found(key)),
        }

        Ok(nodes
            .keys()
            .filter(|candidate| *candidate != "/" && path::parent(candidate) == Some(key.as_str()))
            .cloned()
            .collect())
    }

    fn delete(&self, raw: &str) -> StorageResult<()> {
        self.check_connected()?;
        let key = normalize(raw);
        if key == "/" {
            return Err(StorageError::Corrupted("cannot delete the root container".into()));
        }

        let mut nodes = self.nodes.write();
        if nodes.remove(&key).is_none() {
            return Err(StorageError::not_found(key));
        }
        let prefix = format!("{key}/");
        nodes.retain(|candidate, _| !candidate.starts_with(&prefix));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_new_is_empty() {
        let repo = InMemoryRepository::new();
        assert!(repo.is_empty());
        assert_eq!(repo.stat("/").unwrap(), Some(EntryKind::Container));
    }

    #[test]
    fn memory_paths_are_normalised() {
        let repo = InMemoryRepository::new();
        repo.create_container("meta/").unwrap();
        assert_eq!(repo.stat("/meta").unwrap(), Some(EntryKind::Container));
        assert_eq!(repo.stat("//meta").unwrap(), Some(EntryKind::Container));
    }

    #[test]
    fn memory_create_requires_parent() {
        let repo = InMemoryRepository::new();
        assert!(repo.create_container("/a/b").unwrap_err().is_not_found());
        assert!(repo.upload("/a/b", b"x").unwrap_err().is_not_found());
    }

    #[test]
    fn memory_create_container_twice_fails() {
        let repo = InMemoryRepository::new();
        repo.create_container("/a").unwrap();
        assert!(repo.create_container("/a").unwrap_err().is_already_exists());
    }

    #[test]
    fn memory_upload_replaces_blob() {
        let repo = InMemoryRepository::new();
        repo.upload("/blob", b"one").unwrap();
        repo.upload("/blob", b"two").unwrap();
        assert_eq!(repo.download("/blob").unwrap(), b"two");
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn memory_list_only_direct_children() {
        let repo = InMemoryRepository::new();
        repo.create_container("/a").unwrap();
        repo.create_container("/a/b").unwrap();
        repo.upload("/a/b/c", b"").unwrap();
        repo.upload("/a/d", b"").unwrap();

        assert_eq!(repo.list_container("/a").unwrap(), vec!["/a/b", "/a/d"]);
        assert_eq!(repo.list_container("/").unwrap(), vec!["/a"]);
    }

    #[test]
    fn memory_delete_is_recursive() {
        let repo = InMemoryRepository::new();
        repo.create_container("/a").unwrap();
        repo.create_container("/a/b").unwrap();
        repo.upload("/a/b/c", b"").unwrap();
        repo.create_container("/ab").unwrap();

        repo.delete("/a").unwrap();
        assert_eq!(repo.stat("/a/b/c").unwrap(), None);
        // sibling sharing the name prefix survives
        assert_eq!(repo.stat("/ab").unwrap(), Some(EntryKind::Container));
    }

    #[test]
    fn memory_delete_root_rejected() {
        let repo = InMemoryRepository::new();
        assert!(repo.delete("/").is_err());
    }

    #[test]
    fn memory_disconnected() {
        let repo = InMemoryRepository::new();
        repo.set_connected(false);
        assert!(matches!(repo.stat("/"), Err(StorageError::Transport(_))));
        repo.set_connected(true);
        assert!(repo.stat("/").is_ok());
    }
}
