//! Indexable entities and field selectors.

mod accessor;
mod selector;

pub use accessor::{canonical_field_name, type_fqn, Indexable};
pub use selector::{IndexBy, SelectorError, SelectorFn};
