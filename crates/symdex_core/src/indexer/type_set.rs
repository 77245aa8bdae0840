//! Per-type index bookkeeping.

use crate::index::Index;
use std::sync::Arc;

/// The indices registered for one entity type.
///
/// Fields keep their registration order, and so do the indices of each
/// field; the indexer fans out in exactly this order. Cloning is cheap
/// (indices are shared), which lets the indexer work on a snapshot without
/// holding the registry lock across backend calls.
#[derive(Clone, Default)]
pub(crate) struct TypeIndexSet {
    pk_field: Option<String>,
    fields: Vec<(String, Vec<Arc<dyn Index>>)>,
}

impl TypeIndexSet {
    /// Returns the primary key field, set by the first registration.
    pub(crate) fn pk_field(&self) -> Option<&str> {
        self.pk_field.as_deref()
    }

    /// Sets the primary key field unless one is already set.
    pub(crate) fn set_pk_field_if_unset(&mut self, pk_field: &str) {
        if self.pk_field.is_none() {
            self.pk_field = Some(pk_field.to_string());
        }
    }

    /// Appends `index` to the bucket of `field`.
    pub(crate) fn push(&mut self, field: &str, index: Arc<dyn Index>) {
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, indices)) => indices.push(index),
            None => self.fields.push((field.to_string(), vec![index])),
        }
    }

    /// Returns the indices registered for `field`, or an empty slice.
    pub(crate) fn indices_for(&self, field: &str) -> &[Arc<dyn Index>] {
        match self.fields.iter().find(|(name, _)| name == field) {
            Some((_, indices)) => indices,
            None => &[],
        }
    }

    /// Iterates `(field, index)` pairs in registration order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Index>)> {
        self.fields
            .iter()
            .flat_map(|(name, indices)| indices.iter().map(move |index| (name.as_str(), index)))
    }

    /// Returns the registered field names in registration order.
    pub(crate) fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|(name, _)| name.clone()).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.fields.iter().map(|(_, indices)| indices.len()).sum()
    }
}
