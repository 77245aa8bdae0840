//! Sample indexable entities.

use symdex_core::{type_fqn, Indexable};

/// A bank account, indexed by unique mail and autoincrement number.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Account {
    /// Primary key.
    pub id: String,
    /// Owner's mail address.
    pub mail: String,
    /// Account number; empty until one is assigned.
    pub number: String,
    /// Owner's display name.
    pub owner: String,
}

impl Account {
    /// Creates an account without a number.
    pub fn new(id: &str, mail: &str, owner: &str) -> Self {
        Self {
            id: id.into(),
            mail: mail.into(),
            number: String::new(),
            owner: owner.into(),
        }
    }

    /// Returns the type name under which accounts are indexed.
    pub fn type_name_of() -> String {
        type_fqn::<Self>()
    }
}

impl Indexable for Account {
    fn value_of(&self, field: &str) -> Option<String> {
        match field {
            "Id" => Some(self.id.clone()),
            "Mail" => Some(self.mail.clone()),
            "Number" => Some(self.number.clone()),
            "Owner" => Some(self.owner.clone()),
            _ => None,
        }
    }
}

/// A pet, indexed by unique name and non-unique color.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pet {
    /// Primary key.
    pub id: String,
    /// Name.
    pub name: String,
    /// Color.
    pub color: String,
    /// Species.
    pub kind: String,
}

impl Pet {
    /// Creates a pet.
    pub fn new(id: &str, name: &str, color: &str, kind: &str) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            kind: kind.into(),
        }
    }

    /// Returns a copy with another color.
    #[must_use]
    pub fn with_color(&self, color: &str) -> Self {
        Self {
            color: color.into(),
            ..self.clone()
        }
    }

    /// Returns the type name under which pets are indexed.
    pub fn type_name_of() -> String {
        type_fqn::<Self>()
    }
}

impl Indexable for Pet {
    fn value_of(&self, field: &str) -> Option<String> {
        match field {
            "Id" => Some(self.id.clone()),
            "Name" => Some(self.name.clone()),
            "Color" => Some(self.color.clone()),
            "Kind" => Some(self.kind.clone()),
            _ => None,
        }
    }
}
