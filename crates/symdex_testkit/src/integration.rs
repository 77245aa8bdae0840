//! Cross-crate integration test helpers.
//!
//! Provides a model-checking harness over the indexer and the end-to-end
//! checks every backend must pass.

use crate::entities::{Account, Pet};
use crate::fixtures::{scenarios, TestIndexer};
use std::collections::HashMap;
use symdex_core::{Bound, Index, IndexBy, IndexKind, IndexOptions, Indexer};

/// A harness tracking pets next to an indexer with the pet indices, to
/// verify lookups against the expected state.
pub struct IntegrationHarness {
    /// The indexer under test.
    pub test: TestIndexer,
    /// Pets currently indexed, by id.
    pets: HashMap<String, Pet>,
}

impl IntegrationHarness {
    /// Creates a harness with the pet indices registered on `test`.
    pub fn new(test: TestIndexer) -> Self {
        scenarios::pet_indices(&test);
        Self {
            test,
            pets: HashMap::new(),
        }
    }

    fn indexer(&self) -> &Indexer {
        &self.test
    }

    /// Adds a pet and tracks it.
    pub fn add(&mut self, pet: Pet) {
        self.indexer().add(&pet).expect("Failed to add pet");
        self.pets.insert(pet.id.clone(), pet);
    }

    /// Moves a tracked pet to a new color.
    pub fn recolor(&mut self, id: &str, color: &str) {
        let old = self.pets.get(id).expect("Unknown pet").clone();
        let new = old.with_color(color);
        self.indexer().update(&old, &new).expect("Failed to update pet");
        self.pets.insert(id.to_string(), new);
    }

    /// Removes a tracked pet.
    pub fn remove(&mut self, id: &str) {
        let pet = self.pets.remove(id).expect("Unknown pet");
        self.indexer().delete(&pet).expect("Failed to delete pet");
    }

    /// Verifies every name and color lookup against the tracked pets.
    pub fn verify_all(&self) {
        let type_name = Pet::type_name_of();

        let mut by_color: HashMap<&str, Vec<String>> = HashMap::new();
        for pet in self.pets.values() {
            assert_eq!(
                self.indexer()
                    .find_by(&type_name, "Name", &pet.name)
                    .expect("Name lookup failed"),
                vec![pet.id.clone()],
                "name lookup for {}",
                pet.id
            );
            by_color.entry(&pet.color).or_default().push(pet.id.clone());
        }

        for (color, mut expected) in by_color {
            let mut actual = self
                .indexer()
                .find_by(&type_name, "Color", color)
                .expect("Color lookup failed");
            actual.sort();
            expected.sort();
            assert_eq!(actual, expected, "color lookup for {color}");
        }
    }

    /// Returns the number of tracked pets.
    pub fn tracked_count(&self) -> usize {
        self.pets.len()
    }
}

/// Builds a bare index of `kind` on the storage of `test`, for checks that
/// bypass the facade.
pub fn bare_index(test: &TestIndexer, kind: IndexKind, bound: Bound) -> std::sync::Arc<dyn Index> {
    let backend = test.storage().name().to_string();
    let options = IndexOptions {
        type_name: "testkit.Item".into(),
        index_by: IndexBy::field("Value"),
        files_dir: test.data_path("items"),
        index_base_dir: test.indexer.config().index_base_dir(&backend),
        case_insensitive: false,
        bound,
    };
    let index = symdex_core::IndexRegistry::with_defaults()
        .construct(kind, options, std::sync::Arc::clone(test.storage()))
        .expect("Failed to construct index");
    index.init().expect("Failed to init index");
    index
}

/// End-to-end checks run against every backend.
pub mod checks {
    use super::*;

    /// A second add of the same value to a unique index fails.
    pub fn check_uniqueness(test: &TestIndexer) {
        let index = bare_index(test, IndexKind::Unique, Bound::default());
        index.add("a", "taken").expect("First add failed");
        let err = index.add("b", "taken").expect_err("Second add succeeded");
        assert!(err.is_already_exists(), "unexpected error: {err}");
    }

    /// Add then lookup returns the entity path; remove then lookup fails.
    pub fn check_round_trip(test: &TestIndexer) {
        for kind in [IndexKind::Unique, IndexKind::NonUnique, IndexKind::Autoincrement] {
            let index = bare_index(test, kind, Bound::default());
            let stored = index.add("a", "42").expect("Add failed");
            assert_eq!(stored, "42");
            assert_eq!(
                index.lookup("42").expect("Lookup failed"),
                vec![test.data_path("items/a")],
                "{kind}"
            );
            index.remove("a", "42").expect("Remove failed");
            assert!(index.lookup("42").expect_err("Lookup succeeded").is_not_found());
            index.delete().expect("Delete failed");
        }
    }

    /// Non-unique values collect members and vanish with the last one.
    pub fn check_fan_in(test: &TestIndexer) {
        let index = bare_index(test, IndexKind::NonUnique, Bound::default());
        index.add("pk1", "Green").expect("Add failed");
        index.add("pk2", "Green").expect("Add failed");

        let mut found = index.lookup("Green").expect("Lookup failed");
        found.sort();
        assert_eq!(found, vec![test.data_path("items/pk1"), test.data_path("items/pk2")]);

        index.remove("pk1", "Green").expect("Remove failed");
        assert_eq!(
            index.lookup("Green").expect("Lookup failed"),
            vec![test.data_path("items/pk2")]
        );

        index.remove("pk2", "Green").expect("Remove failed");
        assert!(index.lookup("Green").expect_err("Lookup succeeded").is_not_found());
        let value_dir = symdex_storage::path::join(&[index.root(), "Green"]);
        assert!(!test.storage().exists(&value_dir).expect("Exists failed"));
    }

    /// Generated ordinals start at the lower bound and increase by one.
    pub fn check_autoincrement(test: &TestIndexer) {
        for (lower, expected) in [(0, ["0", "1", "2"]), (1000, ["1000", "1001", "1002"])] {
            let index = bare_index(test, IndexKind::Autoincrement, Bound::new(lower, i64::MAX));
            for (i, want) in expected.iter().enumerate() {
                assert_eq!(&index.add(&format!("e{i}"), "").expect("Add failed"), want);
            }
            index.delete().expect("Delete failed");
        }
    }

    /// Case-insensitive indices normalise on add and lookup.
    pub fn check_case_insensitive(test: &TestIndexer) {
        scenarios::account_indices(test, 0);
        let account = Account::new("acc1", "Mikey@Example.com", "Mikey");
        let results = test.add(&account).expect("Add failed");
        assert_eq!(results[0].value, "mikey@example.com");

        let type_name = Account::type_name_of();
        assert_eq!(
            test.find_by(&type_name, "Mail", "mikey@example.com").expect("Lookup failed"),
            vec!["acc1"]
        );
        assert_eq!(
            test.find_by(&type_name, "mail", "MIKEY@EXAMPLE.COM").expect("Lookup failed"),
            vec!["acc1"]
        );
    }

    /// Registering an index twice keeps a single root.
    pub fn check_idempotent_init(test: &TestIndexer) {
        let index = bare_index(test, IndexKind::Unique, Bound::default());
        index.init().expect("Second init failed");
        index.init().expect("Third init failed");

        let base = test.indexer.config().index_base_dir(test.storage().name());
        let roots = test.storage().read_dir(&base).expect("Listing failed");
        assert_eq!(roots, vec!["unique.testkit.Item.Value"]);
    }

    /// The color query scenario.
    pub fn check_query_scenario(test: &TestIndexer) {
        scenarios::colored_pets(test);
        let type_name = Pet::type_name_of();

        let mut partial = test
            .query(&type_name, "startswith(Color,'Gr')")
            .expect("Query failed");
        partial.sort();
        assert_eq!(partial, vec!["A", "B"]);

        let mut either = test
            .query(&type_name, "Color eq 'White' or Color eq 'Green'")
            .expect("Query failed");
        either.sort();
        assert_eq!(either, vec!["A", "B", "C"]);
    }

    /// Values and primary keys that are not single entry names are rejected
    /// without touching the index tree.
    pub fn check_entry_names_stay_in_tree(test: &TestIndexer) {
        scenarios::account_indices(test, 0);
        let type_name = Account::type_name_of();
        test.add(&Account::new("1", "a@x", "A")).expect("Add failed");

        for mail in ["..", ".", "../a@x", "a@x/.."] {
            let err = test
                .delete(&Account::new("2", mail, "B"))
                .expect_err("Delete of a path-like value succeeded");
            assert!(err.is_invalid_value(), "unexpected error: {err}");
            let err = test
                .add(&Account::new("2", mail, "B"))
                .expect_err("Add of a path-like value succeeded");
            assert!(err.is_invalid_value(), "unexpected error: {err}");
        }
        let err = test
            .add(&Account::new("..", "c@x", "C"))
            .expect_err("Add of a path-like key succeeded");
        assert!(err.is_invalid_value(), "unexpected error: {err}");

        assert_eq!(
            test.find_by(&type_name, "Mail", "a@x").expect("Lookup failed"),
            vec!["1"]
        );
        test.add(&Account::new("3", "b@x", "C")).expect("Add after rejection failed");
        assert_eq!(
            test.find_by(&type_name, "Mail", "b@x").expect("Lookup failed"),
            vec!["3"]
        );
    }

    /// Runs every check on a fresh indexer.
    pub fn run_all(make: impl Fn() -> TestIndexer) {
        check_uniqueness(&make());
        check_round_trip(&make());
        check_fan_in(&make());
        check_autoincrement(&make());
        check_case_insensitive(&make());
        check_idempotent_init(&make());
        check_query_scenario(&make());
        check_entry_names_stay_in_tree(&make());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::BackendKind;

    #[test]
    fn harness_tracks_changes() {
        for backend in BackendKind::ALL {
            let mut harness = IntegrationHarness::new(TestIndexer::on(backend));
            harness.add(Pet::new("1", "Rex", "Green", "Dog"));
            harness.add(Pet::new("2", "Tom", "Green", "Cat"));
            harness.add(Pet::new("3", "Kit", "White", "Cat"));
            harness.verify_all();

            harness.recolor("1", "White");
            harness.verify_all();

            harness.remove("2");
            harness.verify_all();
            assert_eq!(harness.tracked_count(), 2);
        }
    }

    #[test]
    fn checks_pass_on_remote() {
        checks::run_all(TestIndexer::remote);
    }
}
