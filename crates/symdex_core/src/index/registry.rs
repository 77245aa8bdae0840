//! Index constructor registry.

use crate::error::{CoreError, CoreResult};
use crate::index::autoincrement::AutoincrementIndex;
use crate::index::non_unique::NonUniqueIndex;
use crate::index::traits::{Index, IndexKind, IndexOptions};
use crate::index::unique::UniqueIndex;
use std::collections::HashMap;
use std::sync::Arc;
use symdex_storage::{StorageBackend, DISK_BACKEND_NAME, REMOTE_BACKEND_NAME};

/// Builds an index for a backend.
pub type IndexConstructor =
    Arc<dyn Fn(IndexOptions, Arc<dyn StorageBackend>) -> Arc<dyn Index> + Send + Sync>;

/// Maps `(backend name, strategy)` to an index constructor.
///
/// The registry is an ordinary value handed to the indexer, so tests and
/// embedders can swap or extend strategies without global state.
///
/// # Example
///
/// ```rust
/// use symdex_core::{IndexKind, IndexRegistry};
///
/// let registry = IndexRegistry::with_defaults();
/// assert!(registry.supports("disk", IndexKind::NonUnique));
/// assert!(registry.supports("cs3", IndexKind::Autoincrement));
/// assert!(!registry.supports("s3", IndexKind::Unique));
/// ```
#[derive(Clone, Default)]
pub struct IndexRegistry {
    constructors: HashMap<(String, IndexKind), IndexConstructor>,
}

impl IndexRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with all three strategies for the disk and remote
    /// backends.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for backend in [DISK_BACKEND_NAME, REMOTE_BACKEND_NAME] {
            registry.register(backend, IndexKind::Unique, |options, storage| {
                Arc::new(UniqueIndex::new(options, storage))
            });
            registry.register(backend, IndexKind::NonUnique, |options, storage| {
                Arc::new(NonUniqueIndex::new(options, storage))
            });
            registry.register(backend, IndexKind::Autoincrement, |options, storage| {
                Arc::new(AutoincrementIndex::new(options, storage))
            });
        }
        registry
    }

    /// Registers `constructor` for `backend` and `kind`, replacing any
    /// previous one.
    pub fn register<F>(&mut self, backend: impl Into<String>, kind: IndexKind, constructor: F)
    where
        F: Fn(IndexOptions, Arc<dyn StorageBackend>) -> Arc<dyn Index> + Send + Sync + 'static,
    {
        self.constructors
            .insert((backend.into(), kind), Arc::new(constructor));
    }

    /// Returns true if a constructor is registered for the pair.
    #[must_use]
    pub fn supports(&self, backend: &str, kind: IndexKind) -> bool {
        self.constructors.contains_key(&(backend.to_string(), kind))
    }

    /// Builds an index on `storage` with the constructor registered for the
    /// backend's name and `kind`. The index is not initialised.
    ///
    /// # Errors
    ///
    /// Returns `NoConstructor` if nothing is registered for the pair.
    pub fn construct(
        &self,
        kind: IndexKind,
        options: IndexOptions,
        storage: Arc<dyn StorageBackend>,
    ) -> CoreResult<Arc<dyn Index>> {
        let backend = storage.name().to_string();
        let constructor =
            self.constructors
                .get(&(backend.clone(), kind))
                .ok_or_else(|| CoreError::NoConstructor {
                    backend,
                    kind: kind.to_string(),
                })?;
        Ok(constructor(options, storage))
    }
}

impl std::fmt::Debug for IndexRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self
            .constructors
            .keys()
            .map(|(backend, kind)| format!("{backend}/{kind}"))
            .collect();
        keys.sort();
        f.debug_struct("IndexRegistry")
            .field("constructors", &keys)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::IndexBy;
    use crate::index::traits::Bound;
    use symdex_storage::{DiskBackend, InMemoryRepository, RemoteBackend};

    fn options() -> IndexOptions {
        IndexOptions {
            type_name: "acme.User".into(),
            index_by: IndexBy::field("Mail"),
            files_dir: "/meta/users".into(),
            index_base_dir: "/meta/index.cs3".into(),
            case_insensitive: false,
            bound: Bound::default(),
        }
    }

    #[test]
    fn defaults_cover_both_backends() {
        let registry = IndexRegistry::with_defaults();
        for backend in ["disk", "cs3"] {
            for kind in IndexKind::ALL {
                assert!(registry.supports(backend, kind));
            }
        }
    }

    #[test]
    fn construct_picks_strategy() {
        let registry = IndexRegistry::with_defaults();
        let storage = Arc::new(RemoteBackend::new(InMemoryRepository::new()));
        for kind in IndexKind::ALL {
            let index = registry.construct(kind, options(), storage.clone()).unwrap();
            assert_eq!(index.kind(), kind);
            assert_eq!(index.root(), format!("/meta/index.cs3/{kind}.acme.User.Mail"));
        }
    }

    #[test]
    fn missing_constructor() {
        let registry = IndexRegistry::new();
        let err = registry
            .construct(IndexKind::Unique, options(), Arc::new(DiskBackend::new()))
            .err()
            .unwrap();
        assert!(matches!(err, CoreError::NoConstructor { ref backend, .. } if backend == "disk"));
    }

    #[test]
    fn custom_constructor_replaces_default() {
        let mut registry = IndexRegistry::with_defaults();
        registry.register("cs3", IndexKind::Unique, |options, storage| {
            Arc::new(NonUniqueIndex::new(options, storage))
        });
        let storage = Arc::new(RemoteBackend::new(InMemoryRepository::new()));
        let index = registry
            .construct(IndexKind::Unique, options(), storage)
            .unwrap();
        assert_eq!(index.kind(), IndexKind::NonUnique);
    }
}
