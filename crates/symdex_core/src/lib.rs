//! # symdex core
//!
//! Secondary indices over entity files, stored as link trees on a
//! [`StorageBackend`](symdex_storage::StorageBackend).
//!
//! This crate provides:
//! - Three index strategies: [`UniqueIndex`], [`NonUniqueIndex`] and
//!   [`AutoincrementIndex`]
//! - An [`IndexRegistry`] mapping backend and strategy to constructors
//! - The [`Indexer`] facade fanning entity changes out to every index of
//!   a type, under one reader/writer lock per type
//! - A [`query`] engine for the `eq` / `startswith` / `or` filter subset
//!
//! ## Layout
//!
//! ```text
//! <data_dir>/index.<backend>/<strategy>.<type>.<field>/<value>          unique, autoincrement
//! <data_dir>/index.<backend>/<strategy>.<type>.<field>/<value>/<pk>     non_unique
//! ```
//!
//! Each entry is a link to `<data_dir>/<entity_dir>/<pk>`. The tree is the
//! only index state; nothing is cached between calls.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod entity;
mod error;
mod index;
mod indexer;
pub mod query;

pub use config::{IndexerConfig, DEFAULT_DATA_DIR, DEFAULT_REMOTE_DATA_DIR};
pub use entity::{canonical_field_name, type_fqn, IndexBy, Indexable, SelectorError, SelectorFn};
pub use error::{CoreError, CoreResult};
pub use index::{
    AutoincrementIndex, Bound, Index, IndexConstructor, IndexKind, IndexOptions, IndexRegistry,
    NonUniqueIndex, UniqueIndex,
};
pub use indexer::{IndexAddResult, IndexDefinition, Indexer};
