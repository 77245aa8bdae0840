//! # symdex testkit
//!
//! Test utilities for symdex.
//!
//! This crate provides:
//! - Indexer fixtures on the disk and in-memory remote backends
//! - Sample indexable entities
//! - Property-based test generators using proptest
//! - A model-checking integration harness and end-to-end checks
//! - Fuzz testing harnesses
//! - Stress testing utilities
//! - Shared layout and query vectors
//!
//! ## Usage
//!
//! ```rust
//! use symdex_testkit::prelude::*;
//!
//! with_each_backend(|test| {
//!     scenarios::colored_pets(test);
//!     let mut green = test.find_by(&Pet::type_name_of(), "Color", "Green").unwrap();
//!     green.sort();
//!     assert_eq!(green, vec!["A", "B"]);
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod entities;
pub mod fixtures;
pub mod fuzz;
pub mod generators;
pub mod integration;
pub mod stress;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::entities::*;
    pub use crate::fixtures::*;
    pub use crate::fuzz::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
    pub use crate::stress::*;
    pub use crate::vectors::*;
}

pub use entities::*;
pub use fixtures::*;
pub use fuzz::*;
pub use generators::*;
pub use integration::*;
pub use stress::*;
pub use vectors::*;
