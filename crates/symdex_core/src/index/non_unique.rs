//! Non-unique index implementation.

use crate::entity::IndexBy;
use crate::error::{CoreError, CoreResult};
use crate::index::base::IndexBase;
use crate::index::traits::{Index, IndexKind, IndexOptions};
use std::sync::Arc;
use symdex_storage::{path, StorageBackend};

/// Index allowing any number of entities per value.
///
/// Layout: one directory per value holding one link per entity,
/// `<root>/<value>/<id> -> <files_dir>/<id>`.
///
/// # Invariants
///
/// - A value directory exists iff it holds at least one link; `remove`
///   deletes it together with its last member.
pub struct NonUniqueIndex {
    base: IndexBase,
}

impl NonUniqueIndex {
    /// Creates a non-unique index. Call [`Index::init`] before use.
    pub fn new(options: IndexOptions, storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            base: IndexBase::new(IndexKind::NonUnique, options, storage),
        }
    }

    fn member_path(&self, value: &str, id: &str) -> CoreResult<String> {
        let value_dir = self.base.entry_path(value)?;
        self.base.check_segment(id)?;
        Ok(path::join(&[&value_dir, id]))
    }

    /// Resolves every link inside the value directory `value`.
    fn resolve_members(&self, value: &str) -> CoreResult<Vec<String>> {
        let value_dir = self.base.entry_path(value)?;
        let members = self
            .base
            .storage
            .read_dir(&value_dir)
            .map_err(|e| self.base.translate(e, value))?;

        members
            .iter()
            .map(|id| {
                let member = self.member_path(value, id)?;
                self.base
                    .storage
                    .resolve_symlink(&member)
                    .map_err(CoreError::from)
            })
            .collect()
    }
}

impl Index for NonUniqueIndex {
    fn init(&self) -> CoreResult<()> {
        self.base.init()
    }

    fn lookup(&self, value: &str) -> CoreResult<Vec<String>> {
        let value = self.base.normalize(value);
        let targets = self.resolve_members(&value)?;
        if targets.is_empty() {
            return Err(self.base.not_found(&value));
        }
        Ok(targets)
    }

    fn add(&self, id: &str, value: &str) -> CoreResult<String> {
        if value.is_empty() {
            return Ok(String::new());
        }
        let value = self.base.normalize(value);
        let target = self.base.entity_path(id)?;
        let member = self.member_path(&value, id)?;

        self.base
            .storage
            .make_dir_if_not_exist(&self.base.entry_path(&value)?)?;
        self.base
            .storage
            .create_symlink(&target, &member)
            .map_err(|e| self.base.translate(e, &value))?;

        tracing::debug!(root = %self.base.root, id, value = %value, "non-unique entry added");
        Ok(value)
    }

    fn remove(&self, id: &str, value: &str) -> CoreResult<()> {
        if value.is_empty() {
            return Ok(());
        }
        let value = self.base.normalize(value);
        let member = self.member_path(&value, id)?;

        self.base
            .storage
            .delete(&member)
            .map_err(|e| self.base.translate(e, &value))?;

        let value_dir = self.base.entry_path(&value)?;
        if self.base.storage.read_dir(&value_dir)?.is_empty() {
            self.base.storage.delete(&value_dir)?;
            tracing::debug!(
                root = %self.base.root,
                value = %value,
                "empty value directory removed"
            );
        }

        tracing::debug!(root = %self.base.root, id, value = %value, "non-unique entry removed");
        Ok(())
    }

    fn search(&self, pattern: &str) -> CoreResult<Vec<String>> {
        let pattern = self.base.normalize(pattern);
        let mut targets = Vec::new();
        for value in self.base.matching_entries(&pattern)? {
            targets.extend(self.resolve_members(&value)?);
        }

        if targets.is_empty() {
            return Err(self.base.not_found(&pattern));
        }
        Ok(targets)
    }

    fn delete(&self) -> CoreResult<()> {
        self.base.delete()
    }

    fn kind(&self) -> IndexKind {
        IndexKind::NonUnique
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

    fn options(base: &str, case_insensitive: bool) -> IndexOptions {
        IndexOptions {
            type_name: "acme.Pet".into(),
            index_by: IndexBy::field("Color"),
            files_dir: format!("{base}/pets"),
            index_base_dir: format!("{base}/index.test"),
            case_insensitive,
            bound: Bound::default(),
        }
    }

    fn remote_index(case_insensitive: bool) -> (NonUniqueIndex, Arc<dyn StorageBackend>) {
        let storage: Arc<dyn StorageBackend> =
            Arc::new(RemoteBackend::new(InMemoryRepository::new()));
        let index = NonUniqueIndex::new(options("/meta", case_insensitive), storage.clone());
        index.init().unwrap();
        (index, storage)
    }

    fn sorted(mut v: Vec<String>) -> Vec<String> {
        v.sort();
        v
    }

    #[test]
    fn root_layout() {
        let (index, _) = remote_index(false);
        assert_eq!(index.root(), "/meta/index.test/non_unique.acme.Pet.Color");
    }

    #[test]
    fn fan_in_lookup() {
        let (index, _) = remote_index(false);
        index.add("a", "Green").unwrap();
        index.add("b", "Green").unwrap();
        index.add("c", "White").unwrap();

        assert_eq!(
            sorted(index.lookup("Green").unwrap()),
            vec!["/meta/pets/a", "/meta/pets/b"]
        );
        assert_eq!(index.lookup("White").unwrap(), vec!["/meta/pets/c"]);
    }

    #[test]
    fn same_member_twice_fails() {
        let (index, _) = remote_index(false);
        index.add("a", "Green").unwrap();
        assert!(index.add("a", "Green").unwrap_err().is_already_exists());
    }

    #[test]
    fn removing_last_member_removes_value_dir() {
        let (index, storage) = remote_index(false);
        index.add("a", "Green").unwrap();
        index.add("b", "Green").unwrap();

        index.remove("a", "Green").unwrap();
        assert_eq!(index.lookup("Green").unwrap(), vec!["/meta/pets/b"]);
        assert!(storage.exists(&format!("{}/Green", index.root())).unwrap());

        index.remove("b", "Green").unwrap();
        assert!(index.lookup("Green").unwrap_err().is_not_found());
        assert!(!storage.exists(&format!("{}/Green", index.root())).unwrap());
    }

    #[test]
    fn remove_missing_member_is_not_found() {
        let (index, _) = remote_index(false);
        assert!(index.remove("a", "Green").unwrap_err().is_not_found());
        index.add("a", "Green").unwrap();
        assert!(index.remove("b", "Green").unwrap_err().is_not_found());
        assert_eq!(index.lookup("Green").unwrap(), vec!["/meta/pets/a"]);
    }

    #[test]
    fn empty_value_is_noop() {
        let (index, _) = remote_index(false);
        assert_eq!(index.add("a", "").unwrap(), "");
        index.remove("a", "").unwrap();
    }

    #[test]
    fn update_moves_member() {
        let (index, _) = remote_index(false);
        index.add("a", "Green").unwrap();
        index.add("b", "Green").unwrap();
        index.update("a", "Green", "White").unwrap();

        assert_eq!(index.lookup("Green").unwrap(), vec!["/meta/pets/b"]);
        assert_eq!(index.lookup("White").unwrap(), vec!["/meta/pets/a"]);
    }

    #[test]
    fn values_and_ids_must_be_single_segments() {
        let (index, storage) = remote_index(false);
        index.add("a", "Green").unwrap();

        for value in [".", "..", "Green/..", "../Green"] {
            assert!(index.add("b", value).unwrap_err().is_invalid_value(), "{value}");
            assert!(index.remove("a", value).unwrap_err().is_invalid_value(), "{value}");
            assert!(index.lookup(value).unwrap_err().is_invalid_value(), "{value}");
        }
        for id in [".", "..", "x/y"] {
            assert!(index.add(id, "Green").unwrap_err().is_invalid_value(), "{id}");
            assert!(index.remove(id, "Green").unwrap_err().is_invalid_value(), "{id}");
        }

        // nothing landed outside the value directories
        assert_eq!(storage.read_dir(index.root()).unwrap(), vec!["Green"]);
        assert_eq!(index.search("*").unwrap(), vec!["/meta/pets/a"]);
    }

    #[test]
    fn search_two_levels() {
        let (index, _) = remote_index(false);
        index.add("a", "Green").unwrap();
        index.add("b", "Green").unwrap();
        index.add("c", "Grey").unwrap();
        index.add("d", "White").unwrap();

        assert_eq!(
            sorted(index.search("Gr*").unwrap()),
            vec!["/meta/pets/a", "/meta/pets/b", "/meta/pets/c"]
        );
        assert!(index.search("Bl*").unwrap_err().is_not_found());
    }

    #[test]
    fn case_insensitive_values() {
        let (index, _) = remote_index(true);
        index.add("a", "Green").unwrap();
        index.add("b", "GREEN").unwrap();

        assert_eq!(
            sorted(index.lookup("green").unwrap()),
            vec!["/meta/pets/a", "/meta/pets/b"]
        );
        assert_eq!(sorted(index.search("GR*").unwrap()).len(), 2);
    }

    #[test]
    fn disk_fan_in() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().to_string_lossy().into_owned();
        let index = NonUniqueIndex::new(options(&base, false), Arc::new(DiskBackend::new()));
        index.init().unwrap();

        index.add("a", "Green").unwrap();
        index.add("b", "Green").unwrap();
        assert_eq!(
            sorted(index.lookup("Green").unwrap()),
            vec![format!("{base}/pets/a"), format!("{base}/pets/b")]
        );

        index.remove("a", "Green").unwrap();
        index.remove("b", "Green").unwrap();
        assert!(index.lookup("Green").unwrap_err().is_not_found());
        assert!(!dir
            .path()
            .join("index.test/non_unique.acme.Pet.Color/Green")
            .exists());
    }
}
