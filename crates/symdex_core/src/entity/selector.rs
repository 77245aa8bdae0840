//! Field selectors for indices.

use crate::entity::Indexable;
use crate::error::{CoreError, CoreResult};
use std::fmt;
use std::sync::Arc;

/// Error type a function selector may return.
pub type SelectorError = Box<dyn std::error::Error + Send + Sync>;

/// A function computing an index key from an entity.
pub type SelectorFn = Arc<dyn Fn(&dyn Indexable) -> Result<String, SelectorError> + Send + Sync>;

/// Selects the value an index is built on.
///
/// The selector's display form (the field path, or the function's name)
/// is part of the index root path and the key under which the index is
/// registered for its type.
#[derive(Clone)]
pub enum IndexBy {
    /// A named field, read through [`Indexable::value_of`].
    Field(String),
    /// A derived key computed by a function.
    Func {
        /// Name identifying the derived key.
        name: String,
        /// The key function.
        func: SelectorFn,
    },
}

impl IndexBy {
    /// Selects a named field.
    pub fn field(path: impl Into<String>) -> Self {
        Self::Field(path.into())
    }

    /// Selects a derived key computed by `func`.
    ///
    /// ```rust
    /// use symdex_core::{IndexBy, Indexable};
    ///
    /// let by_domain = IndexBy::func("MailDomain", |entity: &dyn Indexable| {
    ///     let mail = entity.value_of("Mail").unwrap_or_default();
    ///     Ok(mail.rsplit('@').next().unwrap_or_default().to_string())
    /// });
    /// assert_eq!(by_domain.to_string(), "MailDomain");
    /// ```
    pub fn func<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&dyn Indexable) -> Result<String, SelectorError> + Send + Sync + 'static,
    {
        Self::Func {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Returns the selector's name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Field(path) => path,
            Self::Func { name, .. } => name,
        }
    }

    /// Extracts the selected value from `entity`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownField` if the entity lacks the field, or `Selector`
    /// if the key function fails.
    pub fn value_of(&self, entity: &dyn Indexable) -> CoreResult<String> {
        match self {
            Self::Field(path) => entity.value_of(path).ok_or_else(|| CoreError::UnknownField {
                type_name: entity.type_name(),
                field: path.clone(),
            }),
            Self::Func { name, func } => func(entity).map_err(|e| CoreError::Selector {
                name: name.clone(),
                message: e.to_string(),
            }),
        }
    }
}

impl fmt::Display for IndexBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Debug for IndexBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(path) => f.debug_tuple("Field").field(path).finish(),
            Self::Func { name, .. } => {
                f.debug_struct("Func").field("name", name).finish_non_exhaustive()
            }
        }
    }
}

impl From<&str> for IndexBy {
    fn from(path: &str) -> Self {
        Self::field(path)
    }
}
