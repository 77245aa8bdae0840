//! End-to-end index properties, run against both backends.

use proptest::prelude::*;
use std::collections::HashSet;
use symdex_core::{Bound, CoreError, IndexBy, IndexDefinition, IndexKind, Indexable};
use symdex_testkit::checks;
use symdex_testkit::prelude::*;

#[test]
fn disk_passes_all_checks() {
    checks::run_all(TestIndexer::disk);
}

#[test]
fn remote_passes_all_checks() {
    checks::run_all(TestIndexer::remote);
}

#[test]
fn query_over_multiple_fields() {
    with_each_backend(|test| {
        scenarios::colored_pets(test);
        let type_name = Pet::type_name_of();

        let mut found = test
            .query(&type_name, "Name eq 'Cy' or startswith(color,'Gre')")
            .unwrap();
        found.sort();
        assert_eq!(found, vec!["A", "B", "C"]);

        assert!(test.query(&type_name, "Color eq 'Black'").unwrap().is_empty());
        assert!(test.query(&type_name, "Unknown eq 'x'").unwrap().is_empty());
    });
}

#[test]
fn query_rejects_before_touching_storage() {
    with_each_backend(|test| {
        // No indices at all: a valid query resolves to nothing, an invalid
        // one still reports its error.
        assert!(test.query("acme.Nope", "A eq 'b'").unwrap().is_empty());
        assert!(matches!(
            test.query("acme.Nope", "A eq 'b' and C eq 'd'"),
            Err(CoreError::UnsupportedOperator { .. })
        ));
    });
}

#[test]
fn deeply_nested_query_is_a_query_error() {
    with_each_backend(|test| {
        scenarios::colored_pets(test);
        let filter = format!("{}Color eq 'White'{}", "(".repeat(20_000), ")".repeat(20_000));
        assert!(matches!(
            test.query(&Pet::type_name_of(), &filter),
            Err(CoreError::Query { .. })
        ));

        let filter = format!("{}Color eq 'White'{}", "(".repeat(8), ")".repeat(8));
        assert_eq!(test.query(&Pet::type_name_of(), &filter).unwrap(), vec!["C"]);
    });
}

#[test]
fn startswith_treats_glob_characters_as_text() {
    with_each_backend(|test| {
        scenarios::pet_indices(test);
        test.add(&Pet::new("1", "a*b", "Green", "Dog")).unwrap();
        test.add(&Pet::new("2", "ab", "Green", "Dog")).unwrap();
        test.add(&Pet::new("3", "a[1]", "Green", "Dog")).unwrap();
        let type_name = Pet::type_name_of();

        assert_eq!(test.query(&type_name, "startswith(Name,'a*')").unwrap(), vec!["1"]);
        assert_eq!(test.query(&type_name, "startswith(Name,'a[')").unwrap(), vec!["3"]);
        assert!(test.query(&type_name, "startswith(Name,'*')").unwrap().is_empty());

        let mut all = test.query(&type_name, "startswith(Name,'a')").unwrap();
        all.sort();
        assert_eq!(all, vec!["1", "2", "3"]);
    });
}

#[test]
fn recolor_and_delete_through_facade() {
    with_each_backend(|test| {
        let pets = scenarios::colored_pets(test);
        let type_name = Pet::type_name_of();

        test.update(&pets[0], &pets[0].with_color("White")).unwrap();
        let mut white = test.find_by(&type_name, "Color", "White").unwrap();
        white.sort();
        assert_eq!(white, vec!["A", "C"]);
        assert_eq!(test.find_by(&type_name, "Color", "Green").unwrap(), vec!["B"]);

        test.delete(&pets[1]).unwrap();
        assert!(test.find_by(&type_name, "Color", "Green").unwrap().is_empty());
        assert!(test.find_by(&type_name, "Name", "Bo").unwrap().is_empty());
    });
}

#[test]
fn accounts_get_sequential_numbers() {
    with_each_backend(|test| {
        scenarios::account_indices(test, 1000);
        let type_name = Account::type_name_of();

        let mut numbers = Vec::new();
        for (i, mail) in ["a@x", "b@x", "c@x"].iter().enumerate() {
            let results = test.add(&Account::new(&format!("acc{i}"), mail, "Owner")).unwrap();
            numbers.push(results[1].value.clone());
        }
        assert_eq!(numbers, vec!["1000", "1001", "1002"]);
        assert_eq!(test.find_by(&type_name, "Number", "1001").unwrap(), vec!["acc1"]);
    });
}

#[test]
fn duplicate_mail_is_rejected_case_insensitively() {
    with_each_backend(|test| {
        scenarios::account_indices(test, 0);
        test.add(&Account::new("1", "Mikey@Example.com", "Mikey")).unwrap();
        let err = test.add(&Account::new("2", "MIKEY@example.com", "Other")).unwrap_err();
        assert!(err.is_already_exists());
    });
}

#[test]
fn reset_then_rebuild() {
    with_each_backend(|test| {
        scenarios::colored_pets(test);
        test.reset().unwrap();
        assert!(test.indexed_fields(&Pet::type_name_of()).is_empty());

        let pets = scenarios::colored_pets(test);
        assert_eq!(pets.len(), 3);
        assert_eq!(
            test.find_by(&Pet::type_name_of(), "Color", "White").unwrap(),
            vec!["C"]
        );
    });
}

#[test]
fn function_selector_index() {
    with_each_backend(|test| {
        let by_domain = IndexBy::func("MailDomain", |entity: &dyn Indexable| {
            let mail = entity.value_of("Mail").unwrap_or_default();
            Ok(mail.rsplit_once('@').map(|(_, d)| d.to_string()).unwrap_or_default())
        });
        test.add_index(IndexDefinition::of::<Account>(
            by_domain,
            "Id",
            "accounts",
            IndexKind::NonUnique,
        ))
        .unwrap();

        test.add(&Account::new("1", "a@acme.org", "A")).unwrap();
        test.add(&Account::new("2", "b@acme.org", "B")).unwrap();
        test.add(&Account::new("3", "c@other.org", "C")).unwrap();

        let mut acme = test
            .find_by(&Account::type_name_of(), "MailDomain", "acme.org")
            .unwrap();
        acme.sort();
        assert_eq!(acme, vec!["1", "2"]);
        assert_eq!(
            test.query(&Account::type_name_of(), "startswith(MailDomain,'oth')")
                .unwrap(),
            vec!["3"]
        );
    });
}

#[test]
fn bound_upper_is_not_enforced() {
    with_each_backend(|test| {
        let index = bare_index(test, IndexKind::Autoincrement, Bound::new(5, 6));
        let values: Vec<_> = (0..3).map(|i| index.add(&format!("e{i}"), "").unwrap()).collect();
        assert_eq!(values, vec!["5", "6", "7"]);
    });
}

proptest! {
    #![proptest_config(PropTestConfig::quick().to_proptest_config())]

    #[test]
    fn unique_admits_one_add_per_value(values in prop::collection::vec(value_strategy(), 1..12)) {
        let test = TestIndexer::remote();
        let index = bare_index(&test, IndexKind::Unique, Bound::default());
        let mut seen = HashSet::new();
        for (i, value) in values.iter().enumerate() {
            let result = index.add(&format!("pk{i}"), value);
            if seen.insert(value.clone()) {
                prop_assert!(result.is_ok());
            } else {
                prop_assert!(result.unwrap_err().is_already_exists());
            }
        }
    }

    #[test]
    fn path_like_values_never_reach_storage(value in path_like_value_strategy()) {
        let test = TestIndexer::disk();
        scenarios::pet_indices(&test);
        let type_name = Pet::type_name_of();
        test.add(&Pet::new("A", "Ace", "Green", "Dog")).unwrap();

        let stray = Pet::new("B", &value, "Green", "Dog");
        prop_assert!(test.delete(&stray).unwrap_err().is_invalid_value());
        prop_assert!(test.add(&stray).unwrap_err().is_invalid_value());
        let recolored = Pet::new("C", "Cy", &value, "Cat");
        prop_assert!(test.add(&recolored).unwrap_err().is_invalid_value());

        prop_assert_eq!(test.find_by(&type_name, "Name", "Ace").unwrap(), vec!["A"]);
        prop_assert_eq!(test.find_by_partial(&type_name, "Color", "*").unwrap(), vec!["A"]);
    }

    #[test]
    fn harness_matches_model(pets in pets_strategy(10), recolor in color_strategy()) {
        let mut harness = IntegrationHarness::new(TestIndexer::remote());
        for pet in pets.clone() {
            harness.add(pet);
        }
        harness.verify_all();

        harness.recolor(&pets[0].id, &recolor);
        harness.verify_all();

        harness.remove(&pets[pets.len() - 1].id);
        harness.verify_all();
    }
}
