//! Test fixtures and indexer helpers.
//!
//! Provides indexers on both backends, with automatic cleanup, and common
//! index setups.

use std::sync::{Arc, Once};
use symdex_core::{IndexDefinition, IndexKind, Indexer, IndexerConfig};
use symdex_storage::{DiskBackend, InMemoryRepository, RemoteBackend, StorageBackend};
use tempfile::TempDir;

use crate::entities::{Account, Pet};

/// Installs a `fmt` tracing subscriber filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Which backend a [`TestIndexer`] runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Native symlinks in a temporary directory.
    Disk,
    /// Emulated links in an [`InMemoryRepository`].
    Remote,
}

impl BackendKind {
    /// Both backends.
    pub const ALL: [BackendKind; 2] = [Self::Disk, Self::Remote];
}

/// A test indexer with automatic cleanup.
pub struct TestIndexer {
    /// The indexer instance.
    pub indexer: Indexer,
    /// Backend the indexer runs on.
    pub backend: BackendKind,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestIndexer {
    /// Creates an indexer on native symlinks under a fresh temp dir.
    pub fn disk() -> Self {
        init_tracing();
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = IndexerConfig::new().data_dir(temp_dir.path().to_string_lossy());
        Self {
            indexer: Indexer::new(config, Arc::new(DiskBackend::new())),
            backend: BackendKind::Disk,
            _temp_dir: Some(temp_dir),
        }
    }

    /// Creates an indexer on a fresh in-memory content repository.
    pub fn remote() -> Self {
        init_tracing();
        let storage = Arc::new(RemoteBackend::new(InMemoryRepository::new()));
        Self {
            indexer: Indexer::new(IndexerConfig::remote(), storage),
            backend: BackendKind::Remote,
            _temp_dir: None,
        }
    }

    /// Creates an indexer on `backend`.
    pub fn on(backend: BackendKind) -> Self {
        match backend {
            BackendKind::Disk => Self::disk(),
            BackendKind::Remote => Self::remote(),
        }
    }

    /// Returns the storage backend.
    pub fn storage(&self) -> &Arc<dyn StorageBackend> {
        self.indexer.storage()
    }

    /// Returns `<data_dir>/<relative>` on the backend.
    pub fn data_path(&self, relative: &str) -> String {
        symdex_storage::path::join(&[&self.indexer.config().data_dir, relative])
    }
}

impl std::ops::Deref for TestIndexer {
    type Target = Indexer;

    fn deref(&self) -> &Self::Target {
        &self.indexer
    }
}

/// Runs `f` once per backend with a fresh indexer.
pub fn with_each_backend<F>(mut f: F)
where
    F: FnMut(&TestIndexer),
{
    for backend in BackendKind::ALL {
        let indexer = TestIndexer::on(backend);
        f(&indexer);
    }
}

/// Common index setups.
pub mod scenarios {
    use super::*;
    use symdex_core::Bound;

    /// Registers the pet indices: unique `Name`, non-unique `Color`.
    pub fn pet_indices(indexer: &Indexer) {
        indexer
            .add_index(IndexDefinition::of::<Pet>("Name", "Id", "pets", IndexKind::Unique))
            .expect("Failed to add Name index");
        indexer
            .add_index(IndexDefinition::of::<Pet>("Color", "Id", "pets", IndexKind::NonUnique))
            .expect("Failed to add Color index");
    }

    /// Registers the account indices: unique case-insensitive `Mail`,
    /// autoincrement `Number` starting at `lower`.
    pub fn account_indices(indexer: &Indexer, lower: i64) {
        indexer
            .add_index(
                IndexDefinition::of::<Account>("Mail", "Id", "accounts", IndexKind::Unique)
                    .case_insensitive(true),
            )
            .expect("Failed to add Mail index");
        indexer
            .add_index(
                IndexDefinition::of::<Account>("Number", "Id", "accounts", IndexKind::Autoincrement)
                    .bound(Bound::new(lower, i64::MAX)),
            )
            .expect("Failed to add Number index");
    }

    /// Registers the pet indices and adds three pets: `A` and `B` are
    /// green, `C` is white.
    pub fn colored_pets(indexer: &Indexer) -> Vec<Pet> {
        pet_indices(indexer);
        let pets = vec![
            Pet::new("A", "Ace", "Green", "Dog"),
            Pet::new("B", "Bo", "Green", "Cat"),
            Pet::new("C", "Cy", "White", "Dog"),
        ];
        for pet in &pets {
            indexer.add(pet).expect("Failed to add pet");
        }
        pets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disk_indexer_lives_in_temp_dir() {
        let test = TestIndexer::disk();
        assert_eq!(test.storage().name(), "disk");
        assert!(test.data_path("index.disk").ends_with("/index.disk"));
    }

    #[test]
    fn remote_indexer_uses_meta_prefix() {
        let test = TestIndexer::remote();
        assert_eq!(test.storage().name(), "cs3");
        assert_eq!(test.data_path("index.cs3"), "/meta/index.cs3");
    }

    #[test]
    fn scenario_registers_fields() {
        with_each_backend(|test| {
            scenarios::colored_pets(test);
            assert_eq!(test.indexed_fields(&Pet::type_name_of()), vec!["Name", "Color"]);
        });
    }

    #[test]
    fn init_tracing_twice() {
        init_tracing();
        init_tracing();
    }
}
