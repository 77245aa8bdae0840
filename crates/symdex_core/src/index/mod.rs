//! Index strategies.
//!
//! An index is a directory of links on a storage backend. Each link's name
//! is an indexed value and its payload is the path of the entity file it
//! points to. There is no other index state: the tree is the index.
//!
//! # Index Types
//!
//! - [`UniqueIndex`]: at most one entity per value
//! - [`NonUniqueIndex`]: a directory of members per value
//! - [`AutoincrementIndex`]: unique, with generated integer values
//!
//! Strategies are built through an [`IndexRegistry`] keyed by backend name
//! and [`IndexKind`].

mod autoincrement;
mod base;
mod non_unique;
mod registry;
mod traits;
mod unique;

pub use autoincrement::AutoincrementIndex;
pub use non_unique::NonUniqueIndex;
pub use registry::{IndexConstructor, IndexRegistry};
pub use traits::{Bound, Index, IndexKind, IndexOptions};
pub use unique::UniqueIndex;
