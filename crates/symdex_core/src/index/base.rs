//! State and link operations shared by all strategies.

use crate::entity::IndexBy;
use crate::error::{CoreError, CoreResult};
use crate::index::traits::{IndexKind, IndexOptions};
use globset::{GlobBuilder, GlobMatcher};
use std::sync::Arc;
use symdex_storage::{path, StorageBackend, StorageError};

/// Identity, layout and backend handle of one index.
///
/// The root is `<index_base_dir>/<kind>.<type_name>.<index_by>`, so two
/// indices on the same field with different strategies never share a
/// tree.
pub(crate) struct IndexBase {
    pub(crate) kind: IndexKind,
    pub(crate) options: IndexOptions,
    pub(crate) root: String,
    pub(crate) storage: Arc<dyn StorageBackend>,
}

impl IndexBase {
    pub(crate) fn new(
        kind: IndexKind,
        options: IndexOptions,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        let root_name = format!("{}.{}.{}", kind, options.type_name, options.index_by);
        let root = path::join(&[&options.index_base_dir, &root_name]);
        Self {
            kind,
            options,
            root,
            storage,
        }
    }

    pub(crate) fn index_by(&self) -> &IndexBy {
        &self.options.index_by
    }

    /// Lower-cases `value` for case-insensitive indices.
    pub(crate) fn normalize(&self, value: &str) -> String {
        if self.options.case_insensitive {
            value.to_lowercase()
        } else {
            value.to_string()
        }
    }

    /// Rejects anything that is not exactly one path segment.
    ///
    /// Values and ids become entry names, so `.`, `..` or a separator would
    /// address an entry outside the index tree.
    pub(crate) fn check_segment(&self, segment: &str) -> CoreResult<()> {
        let is_segment = !segment.is_empty()
            && segment != "."
            && segment != ".."
            && !segment.contains(['/', '\\']);
        if is_segment {
            Ok(())
        } else {
            Err(CoreError::InvalidValue {
                type_name: self.options.type_name.clone(),
                index_by: self.options.index_by.to_string(),
                value: segment.to_string(),
            })
        }
    }

    /// Path of the entity file for `id`, the target of every link.
    pub(crate) fn entity_path(&self, id: &str) -> CoreResult<String> {
        self.check_segment(id)?;
        Ok(path::join(&[&self.options.files_dir, id]))
    }

    /// Path of the entry for `value` directly under the root.
    pub(crate) fn entry_path(&self, value: &str) -> CoreResult<String> {
        self.check_segment(value)?;
        Ok(path::join(&[&self.root, value]))
    }

    pub(crate) fn init(&self) -> CoreResult<()> {
        self.storage.make_dir_if_not_exist(&self.root)?;
        tracing::debug!(root = %self.root, "index initialised");
        Ok(())
    }

    pub(crate) fn delete(&self) -> CoreResult<()> {
        match self.storage.delete(&self.root) {
            Ok(()) => {
                tracing::debug!(root = %self.root, "index deleted");
                Ok(())
            }
            Err(err) if err.is_not_found() => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    pub(crate) fn not_found(&self, value: &str) -> CoreError {
        CoreError::NotFound {
            type_name: self.options.type_name.clone(),
            index_by: self.options.index_by.to_string(),
            value: value.to_string(),
        }
    }

    pub(crate) fn already_exists(&self, value: &str) -> CoreError {
        CoreError::AlreadyExists {
            type_name: self.options.type_name.clone(),
            index_by: self.options.index_by.to_string(),
            value: value.to_string(),
        }
    }

    /// Lifts backend `NotFound`/`AlreadyExists` into the domain errors for
    /// `value`; everything else passes through.
    pub(crate) fn translate(&self, err: StorageError, value: &str) -> CoreError {
        match err {
            StorageError::NotFound { .. } => self.not_found(value),
            StorageError::AlreadyExists { .. } => self.already_exists(value),
            other => CoreError::Storage(other),
        }
    }

    pub(crate) fn matcher(&self, pattern: &str) -> CoreResult<GlobMatcher> {
        GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map(|glob| glob.compile_matcher())
            .map_err(|e| CoreError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
    }

    /// Creates the link `<root>/<value>` to the entity file of `id`.
    pub(crate) fn link_entry(&self, id: &str, value: &str) -> CoreResult<()> {
        let target = self.entity_path(id)?;
        let entry = self.entry_path(value)?;
        self.storage
            .create_symlink(&target, &entry)
            .map_err(|e| self.translate(e, value))
    }

    /// Resolves the single link `<root>/<value>`.
    pub(crate) fn resolve_entry(&self, value: &str) -> CoreResult<Vec<String>> {
        let entry = self.entry_path(value)?;
        let target = self
            .storage
            .resolve_symlink(&entry)
            .map_err(|e| self.translate(e, value))?;
        Ok(vec![target])
    }

    /// Deletes the single link `<root>/<value>`.
    pub(crate) fn unlink_entry(&self, value: &str) -> CoreResult<()> {
        let entry = self.entry_path(value)?;
        self.storage
            .delete(&entry)
            .map_err(|e| self.translate(e, value))
    }

    /// Names of the entries directly under the root matching `pattern`.
    pub(crate) fn matching_entries(&self, pattern: &str) -> CoreResult<Vec<String>> {
        let matcher = self.matcher(pattern)?;
        let names = self
            .storage
            .read_dir(&self.root)
            .map_err(|e| self.translate(e, pattern))?;
        Ok(names
            .into_iter()
            .filter(|name| matcher.is_match(name.as_str()))
            .collect())
    }

    /// Resolves every single-level link whose value matches `pattern`.
    pub(crate) fn search_entries(&self, pattern: &str) -> CoreResult<Vec<String>> {
        let matches = self.matching_entries(pattern)?;
        if matches.is_empty() {
            return Err(self.not_found(pattern));
        }

        matches
            .iter()
            .map(|name| {
                let entry = self.entry_path(name)?;
                self.storage.resolve_symlink(&entry).map_err(CoreError::from)
            })
            .collect()
    }
}
