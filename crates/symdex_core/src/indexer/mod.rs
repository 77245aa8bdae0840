//! Indexer facade.

mod lock;
mod type_set;

use crate::config::IndexerConfig;
use crate::entity::{canonical_field_name, IndexBy, Indexable};
use crate::error::{CoreError, CoreResult};
use crate::index::{Bound, Index, IndexKind, IndexOptions, IndexRegistry};
use crate::query::{self, Resolver};
use lock::NamedRwLock;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use symdex_storage::{path, StorageBackend};
use type_set::TypeIndexSet;

/// Declaration of one index, passed to [`Indexer::add_index`].
///
/// # Example
///
/// ```rust
/// use symdex_core::{Bound, IndexDefinition, IndexKind};
///
/// let kind = IndexKind::Autoincrement;
/// let def = IndexDefinition::new("acme.Account", "Number", "Id", "accounts", kind)
///     .bound(Bound::new(1000, 9999));
/// assert_eq!(def.bound.lower, 1000);
/// ```
#[derive(Debug, Clone)]
pub struct IndexDefinition {
    /// Fully-qualified type name, as returned by [`Indexable::type_name`].
    pub type_name: String,
    /// Field selector.
    pub index_by: IndexBy,
    /// Field holding the primary key. Only the first definition of a type
    /// sets it.
    pub pk_field: String,
    /// Directory of the entity files, relative to the data directory.
    pub entity_dir: String,
    /// Strategy.
    pub kind: IndexKind,
    /// Range for autoincrement indices.
    pub bound: Bound,
    /// Whether values are lower-cased.
    pub case_insensitive: bool,
}

impl IndexDefinition {
    /// Creates a case-sensitive definition with the default bound.
    pub fn new(
        type_name: impl Into<String>,
        index_by: impl Into<IndexBy>,
        pk_field: impl Into<String>,
        entity_dir: impl Into<String>,
        kind: IndexKind,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            index_by: index_by.into(),
            pk_field: pk_field.into(),
            entity_dir: entity_dir.into(),
            kind,
            bound: Bound::default(),
            case_insensitive: false,
        }
    }

    /// Creates a definition for the Rust type `T`.
    pub fn of<T: Indexable + ?Sized>(
        index_by: impl Into<IndexBy>,
        pk_field: impl Into<String>,
        entity_dir: impl Into<String>,
        kind: IndexKind,
    ) -> Self {
        Self::new(crate::entity::type_fqn::<T>(), index_by, pk_field, entity_dir, kind)
    }

    /// Sets the autoincrement range.
    #[must_use]
    pub fn bound(mut self, bound: Bound) -> Self {
        self.bound = bound;
        self
    }

    /// Makes the index case-insensitive.
    #[must_use]
    pub fn case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }
}

/// A value stored by [`Indexer::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexAddResult {
    /// Canonical field name of the index.
    pub field: String,
    /// Stored value: the normalised input, or the generated ordinal of an
    /// autoincrement index.
    pub value: String,
}

/// Entry point for maintaining and querying the indices of many entity
/// types on one storage backend.
///
/// # Thread Safety
///
/// Every call holds the reader/writer lock of the entity type it works on
/// for its whole fan-out: readers of a type never see a write half-applied
/// across that type's indices, and types never contend with each other.
/// [`query`](Self::query) takes the read lock once per leaf.
///
/// # Consistency
///
/// Fan-out over several indices is not transactional. If one index fails,
/// the call returns that error and indices already written stay written.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use symdex_core::{IndexDefinition, IndexKind, Indexable, Indexer, IndexerConfig};
/// use symdex_storage::{InMemoryRepository, RemoteBackend};
///
/// struct Pet { id: &'static str, color: &'static str }
///
/// impl Indexable for Pet {
///     fn type_name(&self) -> String { "acme.Pet".into() }
///     fn value_of(&self, field: &str) -> Option<String> {
///         match field {
///             "Id" => Some(self.id.into()),
///             "Color" => Some(self.color.into()),
///             _ => None,
///         }
///     }
/// }
///
/// let storage = Arc::new(RemoteBackend::new(InMemoryRepository::new()));
/// let indexer = Indexer::new(IndexerConfig::remote(), storage);
/// indexer
///     .add_index(IndexDefinition::new("acme.Pet", "Color", "Id", "pets", IndexKind::NonUnique))
///     .unwrap();
///
/// indexer.add(&Pet { id: "a", color: "Green" }).unwrap();
/// indexer.add(&Pet { id: "b", color: "Green" }).unwrap();
/// indexer.add(&Pet { id: "c", color: "White" }).unwrap();
///
/// let mut found = indexer.query("acme.Pet", "startswith(Color,'Gr')").unwrap();
/// found.sort();
/// assert_eq!(found, vec!["a", "b"]);
/// ```
pub struct Indexer {
    config: IndexerConfig,
    storage: Arc<dyn StorageBackend>,
    registry: Arc<IndexRegistry>,
    indices: RwLock<HashMap<String, TypeIndexSet>>,
    locks: NamedRwLock,
}

impl Indexer {
    /// Creates an indexer with the default strategy registry.
    pub fn new(config: IndexerConfig, storage: Arc<dyn StorageBackend>) -> Self {
        Self::with_registry(config, storage, Arc::new(IndexRegistry::with_defaults()))
    }

    /// Creates an indexer building indices through `registry`.
    pub fn with_registry(
        config: IndexerConfig,
        storage: Arc<dyn StorageBackend>,
        registry: Arc<IndexRegistry>,
    ) -> Self {
        Self {
            config,
            storage,
            registry,
            indices: RwLock::new(HashMap::new()),
            locks: NamedRwLock::new(),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    /// Returns the storage backend.
    pub fn storage(&self) -> &Arc<dyn StorageBackend> {
        &self.storage
    }

    /// Builds, initialises and registers an index.
    ///
    /// The index is registered only after its root exists, so a failed
    /// `init` leaves the type unchanged.
    ///
    /// # Errors
    ///
    /// Returns `NoConstructor` if the registry has no constructor for this
    /// backend and strategy, or the error of [`Index::init`].
    pub fn add_index(&self, def: IndexDefinition) -> CoreResult<()> {
        let field = canonical_field_name(def.index_by.name());
        let options = IndexOptions {
            type_name: def.type_name.clone(),
            index_by: def.index_by,
            files_dir: self.config.files_dir(&def.entity_dir),
            index_base_dir: self.config.index_base_dir(self.storage.name()),
            case_insensitive: def.case_insensitive,
            bound: def.bound,
        };
        let index = self
            .registry
            .construct(def.kind, options, Arc::clone(&self.storage))?;

        let lock = self.locks.get(&def.type_name);
        let _guard = lock.write();

        index.init()?;

        let mut indices = self.indices.write();
        let set = indices.entry(def.type_name.clone()).or_default();
        set.set_pk_field_if_unset(&def.pk_field);
        set.push(&field, Arc::clone(&index));

        tracing::info!(
            type_name = %def.type_name,
            field = %field,
            kind = %def.kind,
            case_insensitive = def.case_insensitive,
            root = index.root(),
            "index added"
        );
        Ok(())
    }

    /// Returns a snapshot of the indices of `type_name`.
    fn snapshot(&self, type_name: &str) -> Option<TypeIndexSet> {
        self.indices.read().get(type_name).cloned()
    }

    /// Reads the primary key of `entity`.
    fn primary_key(set: &TypeIndexSet, entity: &dyn Indexable) -> CoreResult<String> {
        let pk_field = set.pk_field().unwrap_or_default();
        entity.value_of(pk_field).ok_or_else(|| CoreError::UnknownField {
            type_name: entity.type_name(),
            field: pk_field.to_string(),
        })
    }

    /// Indexes `entity` in every index of its type.
    ///
    /// Returns the stored value of each index that stored one, in
    /// registration order. An entity of a type with no indices stores
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns the first index error, typically `AlreadyExists`. Indices
    /// before the failing one keep their entries.
    pub fn add(&self, entity: &dyn Indexable) -> CoreResult<Vec<IndexAddResult>> {
        let type_name = entity.type_name();
        let lock = self.locks.get(&type_name);
        let _guard = lock.write();

        let Some(set) = self.snapshot(&type_name) else {
            tracing::debug!(type_name = %type_name, "add on type without indices");
            return Ok(Vec::new());
        };
        let pk = Self::primary_key(&set, entity)?;

        let mut results = Vec::new();
        for (written, (field, index)) in set.iter().enumerate() {
            let stored = index
                .index_by()
                .value_of(entity)
                .and_then(|value| index.add(&pk, &value))
                .inspect_err(|err| {
                    warn_partial("add", &type_name, &pk, field, written, err);
                })?;
            if !stored.is_empty() {
                results.push(IndexAddResult {
                    field: field.to_string(),
                    value: stored,
                });
            }
        }

        tracing::debug!(type_name = %type_name, pk = %pk, stored = results.len(), "entity indexed");
        Ok(results)
    }

    /// Removes `entity` from every index of its type, using its current
    /// field values.
    ///
    /// # Errors
    ///
    /// Returns the first index error, typically `NotFound`. Indices before
    /// the failing one stay cleared.
    pub fn delete(&self, entity: &dyn Indexable) -> CoreResult<()> {
        let type_name = entity.type_name();
        let lock = self.locks.get(&type_name);
        let _guard = lock.write();

        let Some(set) = self.snapshot(&type_name) else {
            return Ok(());
        };
        let pk = Self::primary_key(&set, entity)?;

        for (removed, (field, index)) in set.iter().enumerate() {
            index
                .index_by()
                .value_of(entity)
                .and_then(|value| index.remove(&pk, &value))
                .inspect_err(|err| {
                    warn_partial("delete", &type_name, &pk, field, removed, err);
                })?;
        }

        tracing::debug!(type_name = %type_name, pk = %pk, "entity removed from indices");
        Ok(())
    }

    /// Moves the index entries of an entity from the values of `old` to
    /// the values of `new`.
    ///
    /// Per index: equal values are skipped, an empty old value is an add,
    /// an empty new value is a remove, anything else is [`Index::update`].
    /// The primary key is read from `old`.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if the entities are of different types, or
    /// the first index error.
    pub fn update(&self, old: &dyn Indexable, new: &dyn Indexable) -> CoreResult<()> {
        let type_name = old.type_name();
        let new_type_name = new.type_name();
        if type_name != new_type_name {
            return Err(CoreError::TypeMismatch {
                from: type_name,
                to: new_type_name,
            });
        }

        let lock = self.locks.get(&type_name);
        let _guard = lock.write();

        let Some(set) = self.snapshot(&type_name) else {
            return Ok(());
        };
        let pk = Self::primary_key(&set, old)?;

        for (updated, (field, index)) in set.iter().enumerate() {
            let old_value = index.index_by().value_of(old)?;
            let new_value = index.index_by().value_of(new)?;
            if old_value == new_value {
                continue;
            }

            let result = if old_value.is_empty() {
                index.add(&pk, &new_value).map(|_| ())
            } else if new_value.is_empty() {
                index.remove(&pk, &old_value)
            } else {
                index.update(&pk, &old_value, &new_value)
            };
            result.inspect_err(|err| {
                warn_partial("update", &type_name, &pk, field, updated, err);
            })?;
        }

        tracing::debug!(type_name = %type_name, pk = %pk, "entity reindexed");
        Ok(())
    }

    /// Returns the primary keys of the entities of `type_name` whose
    /// `field` equals `value`, across every index on that field.
    ///
    /// Field names are canonicalised, so `color` finds indices registered
    /// on `Color`. An unknown type or field, or no match, yields an empty
    /// vector.
    pub fn find_by(&self, type_name: &str, field: &str, value: &str) -> CoreResult<Vec<String>> {
        self.collect(type_name, field, value, |index, value| index.lookup(value))
    }

    /// Like [`find_by`](Self::find_by), matching `pattern` as a glob.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` if `pattern` is not a valid glob.
    pub fn find_by_partial(
        &self,
        type_name: &str,
        field: &str,
        pattern: &str,
    ) -> CoreResult<Vec<String>> {
        self.collect(type_name, field, pattern, |index, pattern| index.search(pattern))
    }

    fn collect<F>(
        &self,
        type_name: &str,
        field: &str,
        value: &str,
        op: F,
    ) -> CoreResult<Vec<String>>
    where
        F: Fn(&dyn Index, &str) -> CoreResult<Vec<String>>,
    {
        let field = canonical_field_name(field);
        let lock = self.locks.get(type_name);
        let _guard = lock.read();

        let Some(set) = self.snapshot(type_name) else {
            return Ok(Vec::new());
        };

        let mut pks = Vec::new();
        for index in set.indices_for(&field) {
            match op(&**index, value) {
                Ok(targets) => pks.extend(
                    targets
                        .iter()
                        .map(|target| path::base_name(target).to_string()),
                ),
                Err(err) if err.is_not_found() => {}
                Err(err) => return Err(err),
            }
        }
        query::dedup(&mut pks);

        tracing::debug!(type_name, field = %field, value, found = pks.len(), "lookup");
        Ok(pks)
    }

    /// Resolves a filter expression against the indices of `type_name`.
    ///
    /// Supported: `field eq 'value'`, `startswith(field,'prefix')` and
    /// `or`. The expression is fully validated before any lookup runs.
    ///
    /// # Errors
    ///
    /// Returns `Query` or `UnsupportedOperator` for invalid expressions,
    /// and lookup errors otherwise.
    pub fn query(&self, type_name: &str, filter: &str) -> CoreResult<Vec<String>> {
        let tree = query::compile(filter)?;
        let pks = tree.resolve(self, type_name)?;
        tracing::debug!(type_name, filter, found = pks.len(), "query resolved");
        Ok(pks)
    }

    /// Deletes every index tree and forgets all registrations.
    ///
    /// # Errors
    ///
    /// Returns the first [`Index::delete`] error. Registrations are dropped
    /// even then.
    pub fn reset(&self) -> CoreResult<()> {
        let drained: Vec<(String, TypeIndexSet)> = self.indices.write().drain().collect();

        let mut deleted = 0;
        for (type_name, set) in drained {
            let lock = self.locks.get(&type_name);
            let _guard = lock.write();
            for (_, index) in set.iter() {
                index.delete()?;
                deleted += 1;
            }
        }

        tracing::info!(deleted, "indexer reset");
        Ok(())
    }

    /// Returns the canonical field names indexed for `type_name`, in
    /// registration order.
    pub fn indexed_fields(&self, type_name: &str) -> Vec<String> {
        self.indices
            .read()
            .get(type_name)
            .map(TypeIndexSet::field_names)
            .unwrap_or_default()
    }

    /// Returns the primary key field of `type_name`, if it has indices.
    pub fn pk_field(&self, type_name: &str) -> Option<String> {
        self.indices
            .read()
            .get(type_name)
            .and_then(|set| set.pk_field().map(str::to_string))
    }

    /// Returns the number of indices registered for `type_name`.
    pub fn index_count(&self, type_name: &str) -> usize {
        self.indices
            .read()
            .get(type_name)
            .map_or(0, TypeIndexSet::len)
    }
}

impl Resolver for Indexer {
    fn find_by(&self, type_name: &str, field: &str, value: &str) -> CoreResult<Vec<String>> {
        Indexer::find_by(self, type_name, field, value)
    }

    fn find_by_partial(
        &self,
        type_name: &str,
        field: &str,
        pattern: &str,
    ) -> CoreResult<Vec<String>> {
        Indexer::find_by_partial(self, type_name, field, pattern)
    }
}

impl std::fmt::Debug for Indexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Indexer")
            .field("config", &self.config)
            .field("backend", &self.storage.name())
            .field("types", &self.indices.read().len())
            .finish()
    }
}

/// Logs a fan-out aborted after `done` indices were already changed.
fn warn_partial(op: &str, type_name: &str, pk: &str, field: &str, done: usize, err: &CoreError) {
    if done > 0 {
        tracing::warn!(
            op,
            type_name,
            pk,
            field,
            indices_changed = done,
            error = %err,
            "fan-out aborted; earlier indices were not rolled back"
        );
    }
}
