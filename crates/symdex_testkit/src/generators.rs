//! Property-based test generators using proptest.
//!
//! Provides strategies for generating index values, primary keys and
//! operation sequences that are valid entry names on every backend.

use crate::entities::Pet;
use proptest::prelude::*;

/// Strategy for generating primary keys.
pub fn pk_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9]{1,12}").expect("Invalid regex")
}

/// Strategy for generating index values usable as a single path segment.
pub fn value_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9][A-Za-z0-9@_+-]{0,15}").expect("Invalid regex")
}

/// Strategy for generating values that are not a single entry name:
/// dot segments and values carrying a separator.
pub fn path_like_value_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(".".to_string()),
        Just("..".to_string()),
        prop::string::string_regex("(\\.\\./)?[a-z]{0,4}/[a-z.]{0,4}").expect("Invalid regex"),
    ]
}

/// Strategy for generating a color from a small palette, so generated
/// pets share values.
pub fn color_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["Green", "White", "Grey", "Black", "Brown"])
        .prop_map(str::to_string)
}

/// Strategy for generating pets with distinct ids and names.
pub fn pets_strategy(max: usize) -> impl Strategy<Value = Vec<Pet>> {
    prop::collection::vec(color_strategy(), 1..max).prop_map(|colors| {
        colors
            .into_iter()
            .enumerate()
            .map(|(i, color)| Pet::new(&format!("p{i}"), &format!("pet{i}"), &color, "Dog"))
            .collect()
    })
}

/// An operation on a single index, for model-based tests.
#[derive(Debug, Clone)]
pub enum IndexOperation {
    /// Index `pk` under `value`.
    Add {
        /// Primary key.
        pk: String,
        /// Value.
        value: String,
    },
    /// Remove `pk` from under `value`.
    Remove {
        /// Primary key.
        pk: String,
        /// Value.
        value: String,
    },
    /// Look `value` up.
    Lookup {
        /// Value.
        value: String,
    },
}

/// Strategy for generating index operations over a small key space, so
/// collisions and removals of present entries are frequent.
pub fn index_operation_strategy() -> impl Strategy<Value = IndexOperation> {
    let pk = prop::sample::select(vec!["a", "b", "c", "d"]).prop_map(str::to_string);
    let value = prop::sample::select(vec!["x", "y", "z"]).prop_map(str::to_string);
    prop_oneof![
        3 => (pk.clone(), value.clone()).prop_map(|(pk, value)| IndexOperation::Add { pk, value }),
        2 => (pk, value.clone()).prop_map(|(pk, value)| IndexOperation::Remove { pk, value }),
        2 => value.prop_map(|value| IndexOperation::Lookup { value }),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<IndexOperation>> {
    prop::collection::vec(index_operation_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 64,
            max_shrink_iters: 500,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 16,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 512,
            max_shrink_iters: 5000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
