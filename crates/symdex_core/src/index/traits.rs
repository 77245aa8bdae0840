//! Index trait and index identity types.

use crate::entity::IndexBy;
use crate::error::{CoreError, CoreResult};
use std::fmt;
use std::str::FromStr;

/// Index strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    /// At most one entity per value.
    Unique,
    /// Any number of entities per value.
    NonUnique,
    /// Unique, with generated integer values when none is given.
    Autoincrement,
}

impl IndexKind {
    /// All strategies, in declaration order.
    pub const ALL: [IndexKind; 3] = [Self::Unique, Self::NonUnique, Self::Autoincrement];

    /// Returns the name used in index root paths.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unique => "unique",
            Self::NonUnique => "non_unique",
            Self::Autoincrement => "autoincrement",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unique" => Ok(Self::Unique),
            "non_unique" => Ok(Self::NonUnique),
            "autoincrement" => Ok(Self::Autoincrement),
            other => Err(CoreError::invalid_kind(other)),
        }
    }
}

/// Value range for autoincrement indices.
///
/// Only `lower` is enforced: generated values never start below it. `upper`
/// is carried for callers that want to check it themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bound {
    /// First value handed out on an empty index.
    pub lower: i64,
    /// Declared upper end of the range.
    pub upper: i64,
}

impl Bound {
    /// Creates a bound.
    #[must_use]
    pub const fn new(lower: i64, upper: i64) -> Self {
        Self { lower, upper }
    }
}

impl Default for Bound {
    fn default() -> Self {
        Self {
            lower: 0,
            upper: i64::MAX,
        }
    }
}

/// Everything a strategy constructor needs to build an index.
#[derive(Debug, Clone)]
pub struct IndexOptions {
    /// Fully-qualified name of the indexed type.
    pub type_name: String,
    /// Field selector.
    pub index_by: IndexBy,
    /// Directory holding the entity files links point into.
    pub files_dir: String,
    /// Directory holding all index roots of the backend
    /// (`<data_dir>/index.<backend>`).
    pub index_base_dir: String,
    /// Whether values are lower-cased before every backend operation.
    pub case_insensitive: bool,
    /// Range for autoincrement indices.
    pub bound: Bound,
}

/// Core index trait.
///
/// An index maps values to entity paths through link entries on a storage
/// backend. All three strategies implement it; the indexer only talks to
/// indices through this trait.
///
/// Lookups and searches that match nothing fail with
/// [`CoreError::NotFound`] on every strategy. Empty values are never
/// indexed: `add` and `remove` with an empty value are no-ops (except that
/// autoincrement generates a value on `add`).
pub trait Index: Send + Sync {
    /// Creates the index root. Safe to call any number of times.
    fn init(&self) -> CoreResult<()>;

    /// Returns the paths of the entities indexed under exactly `value`.
    fn lookup(&self, value: &str) -> CoreResult<Vec<String>>;

    /// Indexes entity `id` under `value` and returns the stored value.
    ///
    /// Returns an empty string if nothing was stored.
    fn add(&self, id: &str, value: &str) -> CoreResult<String>;

    /// Removes entity `id` from under `value`.
    fn remove(&self, id: &str, value: &str) -> CoreResult<()>;

    /// Moves entity `id` from `old_value` to `new_value`.
    ///
    /// This is `remove` followed by `add` and is not atomic: if the second
    /// step fails the entity is left unindexed for this field. Callers
    /// retrying the whole update get at-least-once semantics.
    fn update(&self, id: &str, old_value: &str, new_value: &str) -> CoreResult<()> {
        self.remove(id, old_value)?;
        if let Err(err) = self.add(id, new_value) {
            tracing::warn!(
                type_name = self.type_name(),
                index_by = %self.index_by(),
                id,
                old_value,
                new_value,
                error = %err,
                "update removed old value but failed to add new one"
            );
            return Err(err);
        }
        Ok(())
    }

    /// Returns the paths of the entities whose value matches the glob
    /// `pattern`.
    fn search(&self, pattern: &str) -> CoreResult<Vec<String>>;

    /// Removes the whole index tree.
    fn delete(&self) -> CoreResult<()>;

    /// Returns the strategy of this index.
    fn kind(&self) -> IndexKind;

    /// Returns true if values are lower-cased before use.
    fn case_insensitive(&self) -> bool;

    /// Returns the field selector.
    fn index_by(&self) -> &IndexBy;

    /// Returns the fully-qualified name of the indexed type.
    fn type_name(&self) -> &str;

    /// Returns the directory link targets point into.
    fn files_dir(&self) -> &str;

    /// Returns the index root directory.
    fn root(&self) -> &str;
}
