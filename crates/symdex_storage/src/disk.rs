//! Local filesystem backend using native symlinks.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use std::fs;
use std::path::Path;

/// Backend tag used in the index path layout.
pub const DISK_BACKEND_NAME: &str = "disk";

/// A storage backend on the local filesystem.
///
/// Paths handed to this backend are ordinary filesystem paths. Index
/// entries are native symlinks, so an index tree can be inspected with
/// `ls -l` and survives process restarts.
///
/// # Atomicity
///
/// `create_symlink` relies on `symlink(2)` failing with `EEXIST`, which
/// makes it a compare-and-swap on the link path even across processes.
///
/// # Example
///
/// ```no_run
/// use symdex_storage::{DiskBackend, StorageBackend};
///
/// let backend = DiskBackend::new();
/// backend.make_dir_if_not_exist("/tmp/idx/unique.User.Mail").unwrap();
/// backend
///     .create_symlink("/tmp/users/42", "/tmp/idx/unique.User.Mail/a@b.c")
///     .unwrap();
/// assert_eq!(
///     backend.resolve_symlink("/tmp/idx/unique.User.Mail/a@b.c").unwrap(),
///     "/tmp/users/42"
/// );
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskBackend;

impl DiskBackend {
    /// Creates a new disk backend.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
fn symlink(target: &str, link_path: &str) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link_path)
}

#[cfg(windows)]
fn symlink(target: &str, link_path: &str) -> std::io::Result<()> {
    std::os::windows::fs::symlink_file(target, link_path)
}

impl StorageBackend for DiskBackend {
    fn name(&self) -> &str {
        DISK_BACKEND_NAME
    }

    fn make_dir_if_not_exist(&self, path: &str) -> StorageResult<()> {
        fs::create_dir_all(path).map_err(|e| StorageError::from_io(e, path))
    }

    fn create_symlink(&self, target: &str, link_path: &str) -> StorageResult<()> {
        symlink(target, link_path).map_err(|e| StorageError::from_io(e, link_path))?;
        tracing::trace!(link_target = target, link_path, "created symlink");
        Ok(())
    }

    fn resolve_symlink(&self, link_path: &str) -> StorageResult<String> {
        let target = fs::read_link(link_path).map_err(|e| StorageError::from_io(e, link_path))?;
        target.into_os_string().into_string().map_err(|raw| {
            StorageError::Corrupted(format!(
                "link {link_path} points to a non UTF-8 path: {}",
                raw.to_string_lossy()
            ))
        })
    }

    fn read_dir(&self, path: &str) -> StorageResult<Vec<String>> {
        let meta = fs::symlink_metadata(path).map_err(|e| StorageError::from_io(e, path))?;
        if !meta.is_dir() {
            return Err(StorageError::NotADirectory {
                path: path.to_string(),
            });
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(path).map_err(|e| StorageError::from_io(e, path))? {
            let entry = entry?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    fn delete(&self, path: &str) -> StorageResult<()> {
        let meta = fs::symlink_metadata(path).map_err(|e| StorageError::from_io(e, path))?;
        let result = if meta.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };
        result.map_err(|e| StorageError::from_io(e, path))?;
        tracing::trace!(path, "deleted");
        Ok(())
    }

    fn exists(&self, path: &str) -> StorageResult<bool> {
        // symlink_metadata so that dangling links still count as present
        match fs::symlink_metadata(Path::new(path)) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::from_io(e, path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::join;
    use tempfile::tempdir;

    fn root(dir: &tempfile::TempDir) -> String {
        dir.path().to_string_lossy().into_owned()
    }

    #[test]
    fn disk_name() {
        assert_eq!(DiskBackend::new().name(), "disk");
    }

    #[test]
    fn disk_make_dir_is_idempotent() {
        let dir = tempdir().unwrap();
        let backend = DiskBackend::new();
        let path = join(&[&root(&dir), "index.disk", "unique.User.Mail"]);

        backend.make_dir_if_not_exist(&path).unwrap();
        backend.make_dir_if_not_exist(&path).unwrap();

        assert!(backend.exists(&path).unwrap());
        assert_eq!(
            backend.read_dir(&join(&[&root(&dir), "index.disk"])).unwrap(),
            vec!["unique.User.Mail".to_string()]
        );
    }

    #[test]
    fn disk_symlink_roundtrip() {
        let dir = tempdir().unwrap();
        let backend = DiskBackend::new();
        let link = join(&[&root(&dir), "mikey"]);

        backend.create_symlink("/files/abc", &link).unwrap();
        assert_eq!(backend.resolve_symlink(&link).unwrap(), "/files/abc");
        // dangling on purpose, still present
        assert!(backend.exists(&link).unwrap());
    }

    #[test]
    fn disk_symlink_is_exclusive() {
        let dir = tempdir().unwrap();
        let backend = DiskBackend::new();
        let link = join(&[&root(&dir), "mikey"]);

        backend.create_symlink("/files/abc", &link).unwrap();
        let err = backend.create_symlink("/files/def", &link).unwrap_err();
        assert!(err.is_already_exists());
        assert_eq!(backend.resolve_symlink(&link).unwrap(), "/files/abc");
    }

    #[test]
    fn disk_resolve_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let backend = DiskBackend::new();
        let err = backend
            .resolve_symlink(&join(&[&root(&dir), "nope"]))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn disk_read_dir_sorted() {
        let dir = tempdir().unwrap();
        let backend = DiskBackend::new();
        for name in ["c", "a", "b"] {
            backend
                .create_symlink("/x", &join(&[&root(&dir), name]))
                .unwrap();
        }
        assert_eq!(backend.read_dir(&root(&dir)).unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn disk_read_dir_missing_and_non_dir() {
        let dir = tempdir().unwrap();
        let backend = DiskBackend::new();
        let link = join(&[&root(&dir), "link"]);
        backend.create_symlink("/x", &link).unwrap();

        assert!(backend
            .read_dir(&join(&[&root(&dir), "missing"]))
            .unwrap_err()
            .is_not_found());
        assert!(matches!(
            backend.read_dir(&link),
            Err(StorageError::NotADirectory { .. })
        ));
    }

    #[test]
    fn disk_delete_link_and_tree() {
        let dir = tempdir().unwrap();
        let backend = DiskBackend::new();
        let value_dir = join(&[&root(&dir), "Green"]);
        backend.make_dir_if_not_exist(&value_dir).unwrap();
        backend
            .create_symlink("/files/a", &join(&[&value_dir, "a"]))
            .unwrap();
        backend
            .create_symlink("/files/b", &join(&[&value_dir, "b"]))
            .unwrap();

        backend.delete(&join(&[&value_dir, "a"])).unwrap();
        assert_eq!(backend.read_dir(&value_dir).unwrap(), vec!["b"]);

        backend.delete(&value_dir).unwrap();
        assert!(!backend.exists(&value_dir).unwrap());
        assert!(backend.delete(&value_dir).unwrap_err().is_not_found());
    }
}
