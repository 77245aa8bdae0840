//! Query trees: building from parse nodes and resolving against indices.

use crate::entity::canonical_field_name;
use crate::error::{CoreError, CoreResult};
use crate::query::parser::{NodeKind, ParseNode};

/// How a leaf looks up its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Exact match, from `field eq 'value'`.
    FindBy,
    /// Glob match, from `startswith(field,'value')`. The literal has its
    /// glob metacharacters wrapped in classes (`*` becomes `[*]`) and the
    /// value carries a trailing `*`.
    FindByPartial,
}

/// A single index lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    /// Lookup kind.
    pub kind: FilterKind,
    /// Canonical field name.
    pub field: String,
    /// Value or glob pattern, unquoted.
    pub value: String,
}

/// A resolvable query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTree {
    /// Union of both branches.
    Or(Box<QueryTree>, Box<QueryTree>),
    /// A single lookup.
    Leaf(Filter),
}

/// Answers the lookups of a query tree.
///
/// Implemented by [`Indexer`](crate::Indexer). Both methods return primary
/// keys and an empty vector when nothing matches.
pub trait Resolver {
    /// Exact lookup of `value` on `field` of `type_name`.
    fn find_by(&self, type_name: &str, field: &str, value: &str) -> CoreResult<Vec<String>>;

    /// Glob lookup of `pattern` on `field` of `type_name`.
    fn find_by_partial(
        &self,
        type_name: &str,
        field: &str,
        pattern: &str,
    ) -> CoreResult<Vec<String>>;
}

impl QueryTree {
    /// Transforms a parse tree into a query tree.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedOperator` for anything other than `eq`,
    /// `startswith` and binary `or`, and `Query` for misplaced operands.
    pub fn build(node: &ParseNode) -> CoreResult<Self> {
        match (node.kind, node.value.as_str()) {
            (NodeKind::Logical, "or") => match node.children.as_slice() {
                [left, right] => Ok(Self::Or(
                    Box::new(Self::build(left)?),
                    Box::new(Self::build(right)?),
                )),
                _ => Err(CoreError::unsupported("or with other than two operands")),
            },
            (NodeKind::Logical, "eq") => {
                let (field, value) = operands(node)?;
                Ok(Self::Leaf(Filter {
                    kind: FilterKind::FindBy,
                    field,
                    value,
                }))
            }
            (NodeKind::Func, "startswith") => {
                let (field, value) = operands(node)?;
                Ok(Self::Leaf(Filter {
                    kind: FilterKind::FindByPartial,
                    field,
                    value: format!("{}*", glob_literal(&value)),
                }))
            }
            (NodeKind::Logical | NodeKind::Func, other) => Err(CoreError::unsupported(other)),
            (NodeKind::Property | NodeKind::Literal, other) => Err(CoreError::query(format!(
                "expected a comparison or function call, found {other:?}"
            ))),
        }
    }

    /// Resolves the tree post-order and returns the deduplicated primary
    /// keys, in first-seen order.
    pub fn resolve<R: Resolver + ?Sized>(
        &self,
        resolver: &R,
        type_name: &str,
    ) -> CoreResult<Vec<String>> {
        let mut results = match self {
            Self::Or(left, right) => {
                let mut results = left.resolve(resolver, type_name)?;
                results.extend(right.resolve(resolver, type_name)?);
                results
            }
            Self::Leaf(filter) => match filter.kind {
                FilterKind::FindBy => resolver.find_by(type_name, &filter.field, &filter.value)?,
                FilterKind::FindByPartial => {
                    resolver.find_by_partial(type_name, &filter.field, &filter.value)?
                }
            },
        };
        dedup(&mut results);
        Ok(results)
    }

    /// Returns the leaves in resolution order.
    #[must_use]
    pub fn leaves(&self) -> Vec<&Filter> {
        match self {
            Self::Or(left, right) => {
                let mut leaves = left.leaves();
                leaves.extend(right.leaves());
                leaves
            }
            Self::Leaf(filter) => vec![filter],
        }
    }
}

/// Extracts `(property, literal)` from a two-operand node.
fn operands(node: &ParseNode) -> CoreResult<(String, String)> {
    match node.children.as_slice() {
        [field, value] if field.kind == NodeKind::Property && value.kind == NodeKind::Literal => {
            Ok((canonical_field_name(&field.value), unquote(&value.value)))
        }
        _ => Err(CoreError::query(format!(
            "{} expects a property and a literal",
            node.value
        ))),
    }
}

/// Strips the surrounding single quotes of a literal and unescapes `''`.
/// Bare literals (numbers) are returned as written.
fn unquote(literal: &str) -> String {
    match literal
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
    {
        Some(inner) => inner.replace("''", "'"),
        None => literal.to_string(),
    }
}

/// Escapes glob metacharacters so `literal` only matches itself.
fn glob_literal(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());
    for c in literal.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '{' | '}' | '\\') {
            escaped.push('[');
            escaped.push(c);
            escaped.push(']');
        } else {
            escaped.push(c);
        }
    }
    escaped
}

/// Removes duplicates, keeping the first occurrence of each value.
pub(crate) fn dedup(values: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    values.retain(|value| seen.insert(value.clone()));
}
