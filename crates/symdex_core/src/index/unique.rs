//! Unique index implementation.

use crate::entity::IndexBy;
use crate::error::CoreResult;
use crate::index::base::IndexBase;
use crate::index::traits::{Index, IndexKind, IndexOptions};
use std::sync::Arc;
use symdex_storage::StorageBackend;

/// Index allowing at most one entity per value.
///
/// Layout: one link per value, `<root>/<value> -> <files_dir>/<id>`.
/// The exclusive link creation of the backend is the uniqueness check, so
/// two concurrent adds of the same value cannot both succeed.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use symdex_core::{Bound, Index, IndexBy, IndexOptions, UniqueIndex};
/// use symdex_storage::{InMemoryRepository, RemoteBackend};
///
/// let storage = Arc::new(RemoteBackend::new(InMemoryRepository::new()));
/// let index = UniqueIndex::new(
///     IndexOptions {
///         type_name: "acme.User".into(),
///         index_by: IndexBy::field("Mail"),
///         files_dir: "/meta/users".into(),
///         index_base_dir: "/meta/index.cs3".into(),
///         case_insensitive: false,
///         bound: Bound::default(),
///     },
///     storage,
/// );
/// index.init().unwrap();
/// index.add("abc", "mikey@example.com").unwrap();
/// assert_eq!(index.lookup("mikey@example.com").unwrap(), vec!["/meta/users/abc"]);
/// assert!(index.add("def", "mikey@example.com").unwrap_err().is_already_exists());
/// ```
pub struct UniqueIndex {
    base: IndexBase,
}

impl UniqueIndex {
    /// Creates a unique index. Call [`Index::init`] before use.
    pub fn new(options: IndexOptions, storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            base: IndexBase::new(IndexKind::Unique, options, storage),
        }
    }
}

impl Index for UniqueIndex {
    fn init(&self) -> CoreResult<()> {
        self.base.init()
    }

    fn lookup(&self, value: &str) -> CoreResult<Vec<String>> {
        let value = self.base.normalize(value);
        self.base.resolve_entry(&value)
    }

    fn add(&self, id: &str, value: &str) -> CoreResult<String> {
        if value.is_empty() {
            return Ok(String::new());
        }
        let value = self.base.normalize(value);
        self.base.link_entry(id, &value)?;
        tracing::debug!(root = %self.base.root, id, value = %value, "unique entry added");
        Ok(value)
    }

    fn remove(&self, id: &str, value: &str) -> CoreResult<()> {
        if value.is_empty() {
            return Ok(());
        }
        let value = self.base.normalize(value);
        self.base.unlink_entry(&value)?;
        tracing::debug!(root = %self.base.root, id, value = %value, "unique entry removed");
        Ok(())
    }

    fn search(&self, pattern: &str) -> CoreResult<Vec<String>> {
        let pattern = self.base.normalize(pattern);
        self.base.search_entries(&pattern)
    }

    fn delete(&self) -> CoreResult<()> {
        self.base.delete()
    }

    fn kind(&self) -> IndexKind {
        IndexKind::Unique
    }

    fn case_insensitive(&self) -> bool {
        self.base.options.case_insensitive
    }

    fn index_by(&self) -> &IndexBy {
        self.base.index_by()
    }

    fn type_name(&self) -> &str {
        &self.base.options.type_name
    }

    fn files_dir(&self) -> &str {
        &self.base.options.files_dir
    }

    fn root(&self) -> &str {
        &self.base.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::traits::Bound;
    use symdex_storage::{DiskBackend, InMemoryRepository, RemoteBackend};
    use tempfile::TempDir;

    fn options(base: &str, case_insensitive: bool) -> IndexOptions {
        IndexOptions {
            type_name: "acme.User".into(),
            index_by: IndexBy::field("Mail"),
            files_dir: format!("{base}/users"),
            index_base_dir: format!("{base}/index.test"),
            case_insensitive,
            bound: Bound::default(),
        }
    }

    fn remote_index(case_insensitive: bool) -> UniqueIndex {
        let storage = Arc::new(RemoteBackend::new(InMemoryRepository::new()));
        let index = UniqueIndex::new(options("/meta", case_insensitive), storage);
        index.init().unwrap();
        index
    }

    fn disk_index(dir: &TempDir) -> UniqueIndex {
        let base = dir.path().to_string_lossy().into_owned();
        let index = UniqueIndex::new(options(&base, false), Arc::new(DiskBackend::new()));
        index.init().unwrap();
        index
    }

    #[test]
    fn root_layout() {
        let index = remote_index(false);
        assert_eq!(index.root(), "/meta/index.test/unique.acme.User.Mail");
        assert_eq!(index.kind(), IndexKind::Unique);
        assert_eq!(index.files_dir(), "/meta/users");
        assert_eq!(index.type_name(), "acme.User");
    }

    #[test]
    fn init_twice() {
        let index = remote_index(false);
        index.init().unwrap();
        index.init().unwrap();
    }

    #[test]
    fn add_and_lookup() {
        let index = remote_index(false);
        assert_eq!(index.add("abc", "mikey@example.com").unwrap(), "mikey@example.com");
        assert_eq!(
            index.lookup("mikey@example.com").unwrap(),
            vec!["/meta/users/abc"]
        );
    }

    #[test]
    fn lookup_missing_is_not_found() {
        let index = remote_index(false);
        assert!(index.lookup("nobody").unwrap_err().is_not_found());
    }

    #[test]
    fn second_add_same_value_fails() {
        let index = remote_index(false);
        index.add("abc", "mikey").unwrap();
        let err = index.add("def", "mikey").unwrap_err();
        assert!(err.is_already_exists());
        assert_eq!(index.lookup("mikey").unwrap(), vec!["/meta/users/abc"]);
    }

    #[test]
    fn empty_value_is_noop() {
        let index = remote_index(false);
        assert_eq!(index.add("abc", "").unwrap(), "");
        index.remove("abc", "").unwrap();
        assert!(index.search("*").unwrap_err().is_not_found());
    }

    #[test]
    fn remove_then_lookup() {
        let index = remote_index(false);
        index.add("abc", "mikey").unwrap();
        index.remove("abc", "mikey").unwrap();
        assert!(index.lookup("mikey").unwrap_err().is_not_found());
        assert!(index.remove("abc", "mikey").unwrap_err().is_not_found());
        // value is free again
        index.add("def", "mikey").unwrap();
    }

    #[test]
    fn update_moves_entry() {
        let index = remote_index(false);
        index.add("abc", "old").unwrap();
        index.update("abc", "old", "new").unwrap();
        assert!(index.lookup("old").unwrap_err().is_not_found());
        assert_eq!(index.lookup("new").unwrap(), vec!["/meta/users/abc"]);
    }

    #[test]
    fn update_missing_source_is_not_found() {
        let index = remote_index(false);
        assert!(index.update("abc", "old", "new").unwrap_err().is_not_found());
        assert!(index.lookup("new").unwrap_err().is_not_found());
    }

    #[test]
    fn update_into_taken_value_leaves_entity_unindexed() {
        let index = remote_index(false);
        index.add("abc", "one").unwrap();
        index.add("def", "two").unwrap();

        let err = index.update("abc", "one", "two").unwrap_err();
        assert!(err.is_already_exists());
        assert!(index.lookup("one").unwrap_err().is_not_found());
        assert_eq!(index.lookup("two").unwrap(), vec!["/meta/users/def"]);
    }

    #[test]
    fn case_insensitive_normalisation() {
        let index = remote_index(true);
        assert_eq!(
            index.add("abc", "Mikey@Example.com").unwrap(),
            "mikey@example.com"
        );
        assert_eq!(
            index.lookup("mikey@example.com").unwrap(),
            index.lookup("MIKEY@EXAMPLE.COM").unwrap()
        );
        assert!(index.add("def", "MIKEY@example.com").unwrap_err().is_already_exists());
        index.remove("abc", "MiKeY@ExAmPlE.CoM").unwrap();
        assert!(index.lookup("mikey@example.com").unwrap_err().is_not_found());
    }

    #[test]
    fn search_by_glob() {
        let index = remote_index(false);
        index.add("1", "jacky").unwrap();
        index.add("2", "jack").unwrap();
        index.add("3", "mikey").unwrap();

        let mut found = index.search("jac*").unwrap();
        found.sort();
        assert_eq!(found, vec!["/meta/users/1", "/meta/users/2"]);
        assert!(index.search("zed*").unwrap_err().is_not_found());
    }

    #[test]
    fn invalid_glob() {
        let index = remote_index(false);
        assert!(matches!(
            index.search("[unclosed"),
            Err(crate::error::CoreError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn dot_values_are_rejected() {
        let index = remote_index(false);
        index.add("abc", "mikey").unwrap();

        for value in [".", "..", "a/b", "..\\x"] {
            assert!(index.add("def", value).unwrap_err().is_invalid_value(), "{value}");
            assert!(index.remove("def", value).unwrap_err().is_invalid_value(), "{value}");
            assert!(index.lookup(value).unwrap_err().is_invalid_value(), "{value}");
        }
        assert!(index.add("../x", "other").unwrap_err().is_invalid_value());

        assert_eq!(index.lookup("mikey").unwrap(), vec!["/meta/users/abc"]);
        index.add("def", "other").unwrap();
    }

    #[test]
    fn disk_parent_value_cannot_delete_root() {
        let dir = tempfile::tempdir().unwrap();
        let index = disk_index(&dir);
        index.add("abc", "mikey@example.com").unwrap();

        assert!(index.remove("x", "..").unwrap_err().is_invalid_value());
        assert!(index.remove("x", ".").unwrap_err().is_invalid_value());

        assert_eq!(index.lookup("mikey@example.com").unwrap().len(), 1);
        index.add("def", "jacky@example.com").unwrap();
    }

    #[test]
    fn delete_removes_tree() {
        let index = remote_index(false);
        index.add("abc", "mikey").unwrap();
        index.delete().unwrap();
        index.delete().unwrap();
        assert!(index.lookup("mikey").unwrap_err().is_not_found());
    }

    #[test]
    fn disk_add_lookup_remove() {
        let dir = tempfile::tempdir().unwrap();
        let index = disk_index(&dir);
        let base = dir.path().to_string_lossy().into_owned();

        index.add("abc", "mikey@example.com").unwrap();
        assert_eq!(
            index.lookup("mikey@example.com").unwrap(),
            vec![format!("{base}/users/abc")]
        );
        assert!(index.add("x", "mikey@example.com").unwrap_err().is_already_exists());
        index.remove("abc", "mikey@example.com").unwrap();
        assert!(index.lookup("mikey@example.com").unwrap_err().is_not_found());
    }
}
