//! Autoincrement index implementation.

use crate::entity::IndexBy;
use crate::error::{CoreError, CoreResult};
use crate::index::base::IndexBase;
use crate::index::traits::{Index, IndexKind, IndexOptions};
use std::sync::Arc;
use symdex_storage::StorageBackend;

/// Unique index that generates integer values.
///
/// `add` with an empty value allocates the next ordinal: the bound's lower
/// end on an empty index, otherwise one past the largest present value
/// (never below `lower`). Explicit values are stored like a unique index
/// would store them. Layout matches [`UniqueIndex`](crate::UniqueIndex).
///
/// The ordinal is derived from a listing of the root, so two writers
/// racing on the same tree collide on link creation and the loser gets
/// `AlreadyExists`. The indexer's per-type write lock prevents this within
/// one process.
pub struct AutoincrementIndex {
    base: IndexBase,
}

impl AutoincrementIndex {
    /// Creates an autoincrement index. Call [`Index::init`] before use.
    pub fn new(options: IndexOptions, storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            base: IndexBase::new(IndexKind::Autoincrement, options, storage),
        }
    }

    /// Computes the next ordinal from the entries currently under the root.
    ///
    /// # Errors
    ///
    /// Returns `Corrupted` if an entry name is not an integer.
    fn next(&self) -> CoreResult<i64> {
        let lower = self.base.options.bound.lower;
        let names = self.base.storage.read_dir(&self.base.root)?;

        let mut max: Option<i64> = None;
        for name in &names {
            let value: i64 = name.parse().map_err(|_| {
                CoreError::corrupted(format!(
                    "autoincrement entry {name:?} under {} is not an integer",
                    self.base.root
                ))
            })?;
            max = Some(max.map_or(value, |m| m.max(value)));
        }

        Ok(match max {
            None => lower,
            Some(max) => max.saturating_add(1).max(lower),
        })
    }
}

impl Index for AutoincrementIndex {
    fn init(&self) -> CoreResult<()> {
        self.base.init()
    }

    fn lookup(&self, value: &str) -> CoreResult<Vec<String>> {
        let value = self.base.normalize(value);
        self.base.resolve_entry(&value)
    }

    fn add(&self, id: &str, value: &str) -> CoreResult<String> {
        let value = if value.is_empty() {
            self.next()?.to_string()
        } else {
            self.base.normalize(value)
        };

        self.base.link_entry(id, &value)?;
        tracing::debug!(root = %self.base.root, id, value = %value, "autoincrement entry added");
        Ok(value)
    }

    fn remove(&self, id: &str, value: &str) -> CoreResult<()> {
        if value.is_empty() {
            return Ok(());
        }
        let value = self.base.normalize(value);
        self.base.unlink_entry(&value)?;
        tracing::debug!(root = %self.base.root, id, value = %value, "autoincrement entry removed");
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
        IndexKind::Autoincrement
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
