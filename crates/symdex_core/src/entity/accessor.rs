//! Reflection-free access to entity field values.

/// An entity that can be indexed.
///
/// Indices never inspect entities directly; they ask for field values by
/// name. Implementations return `None` for fields they do not have and
/// `Some(String::new())` for fields that are present but empty (empty
/// values are not indexed).
///
/// # Example
///
/// ```rust
/// use symdex_core::Indexable;
///
/// struct User {
///     id: String,
///     mail: String,
/// }
///
/// impl Indexable for User {
///     fn value_of(&self, field: &str) -> Option<String> {
///         match field {
///             "Id" => Some(self.id.clone()),
///             "Mail" => Some(self.mail.clone()),
///             _ => None,
///         }
///     }
/// }
///
/// let user = User { id: "1".into(), mail: "a@b.c".into() };
/// assert_eq!(user.value_of("Mail").as_deref(), Some("a@b.c"));
/// assert!(user.type_name().ends_with(".User"));
/// ```
pub trait Indexable {
    /// Fully-qualified type name under which indices for this entity are
    /// registered.
    ///
    /// Defaults to the Rust type path with `::` replaced by `.`.
    fn type_name(&self) -> String {
        type_fqn::<Self>()
    }

    /// Returns the value of `field`, or `None` if the entity has no such
    /// field. Nested fields are addressed with dotted paths.
    fn value_of(&self, field: &str) -> Option<String>;
}

/// Returns the fully-qualified name of `T` as used in index paths.
///
/// ```rust
/// struct Pet;
/// let name = symdex_core::type_fqn::<Pet>();
/// assert!(name.ends_with(".Pet"));
/// assert!(!name.contains("::"));
/// ```
#[must_use]
pub fn type_fqn<T: ?Sized>() -> String {
    std::any::type_name::<T>().replace("::", ".")
}

/// Normalises a field name to the canonical UpperCamelCase form under
/// which indices are registered.
///
/// `_`, `-`, `.` and spaces separate words; the first letter of every
/// word is upper-cased and the rest is kept as written.
///
/// ```rust
/// use symdex_core::canonical_field_name;
///
/// assert_eq!(canonical_field_name("color"), "Color");
/// assert_eq!(canonical_field_name("first_name"), "FirstName");
/// assert_eq!(canonical_field_name("OnPremisesSamAccountName"), "OnPremisesSamAccountName");
/// ```
#[must_use]
pub fn canonical_field_name(field: &str) -> String {
    field
        .split(['_', '-', '.', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
