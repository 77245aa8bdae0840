//! # symdex storage
//!
//! Storage backend trait and implementations for symdex indices.
//!
//! An index is a directory tree of links: each link's name is an indexed
//! value and its payload is the path of the entity file it points to.
//! This crate provides the capabilities such a tree needs, independent of
//! where it lives.
//!
//! ## Design Principles
//!
//! - Backends know directories and links, nothing about index strategies
//! - Link creation is exclusive and doubles as the collision check
//! - No handles or listings are cached between calls
//! - Must be `Send + Sync` for concurrent access
//!
//! ## Available Backends
//!
//! - [`DiskBackend`] - Native symlinks on the local filesystem
//! - [`RemoteBackend`] - Links emulated as blobs on a content repository
//!   reached through a [`ContentClient`]
//! - [`InMemoryRepository`] - In-process [`ContentClient`] for tests
//!
//! ## Example
//!
//! ```rust
//! use symdex_storage::{InMemoryRepository, RemoteBackend, StorageBackend};
//!
//! let backend = RemoteBackend::new(InMemoryRepository::new());
//! backend.make_dir_if_not_exist("/meta/idx").unwrap();
//! backend.create_symlink("/meta/files/1", "/meta/idx/hello").unwrap();
//! assert_eq!(backend.read_dir("/meta/idx").unwrap(), vec!["hello"]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod disk;
mod error;
mod memory;
pub mod path;
mod remote;

pub use backend::StorageBackend;
pub use disk::{DiskBackend, DISK_BACKEND_NAME};
pub use error::{StorageError, StorageResult};
pub use memory::InMemoryRepository;
pub use remote::{ContentClient, EntryKind, RemoteBackend, REMOTE_BACKEND_NAME};
