//! Filter expression queries.
//!
//! A filter is an OData `$filter` string restricted to
//! `field eq 'value'`, `startswith(field,'value')` and `or`. Resolution has
//! two phases: [`parse`] and [`QueryTree::build`] validate the expression
//! without touching storage, then [`QueryTree::resolve`] runs one indexer
//! lookup per leaf.
//!
//! # Example
//!
//! ```rust
//! use symdex_core::query::{compile, FilterKind};
//!
//! let tree = compile("Color eq 'White' or startswith(color,'Gr')").unwrap();
//! let leaves = tree.leaves();
//! assert_eq!(leaves[1].kind, FilterKind::FindByPartial);
//! assert_eq!(leaves[1].field, "Color");
//! assert_eq!(leaves[1].value, "Gr*");
//!
//! assert!(compile("Color eq 'White' and Age eq '3'").unwrap_err().to_string().contains("and"));
//! ```

mod lexer;
mod parser;
mod tree;

pub use lexer::{tokenize, Lexer, Token};
pub use parser::{parse, NodeKind, ParseNode, Parser, MAX_DEPTH};
pub use tree::{Filter, FilterKind, QueryTree, Resolver};

pub(crate) use tree::dedup;

use crate::error::CoreResult;

/// Parses and transforms `filter` into a resolvable tree.
///
/// # Errors
///
/// Returns `Query` for syntax errors and `UnsupportedOperator` for
/// operators outside the supported subset.
pub fn compile(filter: &str) -> CoreResult<QueryTree> {
    QueryTree::build(&parse(filter)?)
}
