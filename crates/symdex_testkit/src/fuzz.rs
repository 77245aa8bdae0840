//! Fuzz testing harnesses for symdex.
//!
//! This module provides fuzz targets that can be used with cargo-fuzz
//! or other fuzzing frameworks.

use crate::fixtures::TestIndexer;
use crate::generators::IndexOperation;
use std::collections::{BTreeSet, HashMap};
use symdex_core::{Bound, IndexKind};

/// Fuzz target for the filter parser.
///
/// Tests that arbitrary strings either compile or return a `Query` or
/// `UnsupportedOperator` error (no panics).
pub fn fuzz_query_compile(data: &[u8]) {
    let Ok(filter) = std::str::from_utf8(data) else {
        return;
    };
    match symdex_core::query::compile(filter) {
        Ok(tree) => assert!(!tree.leaves().is_empty()),
        Err(err) => assert!(
            matches!(
                err,
                symdex_core::CoreError::Query { .. }
                    | symdex_core::CoreError::UnsupportedOperator { .. }
            ),
            "unexpected error kind: {err}"
        ),
    }
}

/// Fuzz target for index operations.
///
/// Interprets `data` as a sequence of operations on a unique and a
/// non-unique index and checks both against a model.
pub fn fuzz_index_operations(data: &[u8]) {
    let ops = helpers::parse_sequence(data);
    if ops.is_empty() {
        return;
    }
    helpers::execute_sequence(&ops, &TestIndexer::remote());
}

/// Helper functions for fuzz testing.
pub mod helpers {
    use super::*;
    use crate::integration::bare_index;

    const PKS: [&str; 4] = ["a", "b", "c", "d"];
    const VALUES: [&str; 3] = ["x", "y", "z"];

    /// Decodes two bytes per operation.
    pub fn parse_sequence(data: &[u8]) -> Vec<IndexOperation> {
        data.chunks_exact(2)
            .map(|pair| {
                let pk = PKS[(pair[1] & 0x03) as usize].to_string();
                let value = VALUES[((pair[1] >> 2) % 3) as usize].to_string();
                match pair[0] % 3 {
                    0 => IndexOperation::Add { pk, value },
                    1 => IndexOperation::Remove { pk, value },
                    _ => IndexOperation::Lookup { value },
                }
            })
            .collect()
    }

    /// Runs `ops` against fresh unique and non-unique indices on `test`,
    /// asserting every outcome against an in-memory model.
    pub fn execute_sequence(ops: &[IndexOperation], test: &TestIndexer) {
        let unique = bare_index(test, IndexKind::Unique, Bound::default());
        let non_unique = bare_index(test, IndexKind::NonUnique, Bound::default());
        let target = |pk: &str| test.data_path(&format!("items/{pk}"));

        let mut unique_model: HashMap<String, String> = HashMap::new();
        let mut non_unique_model: HashMap<String, BTreeSet<String>> = HashMap::new();

        for op in ops {
            match op {
                IndexOperation::Add { pk, value } => {
                    let result = unique.add(pk, value);
                    if unique_model.contains_key(value) {
                        assert!(result.expect_err("duplicate add").is_already_exists());
                    } else {
                        result.expect("add failed");
                        unique_model.insert(value.clone(), pk.clone());
                    }

                    let members = non_unique_model.entry(value.clone()).or_default();
                    let result = non_unique.add(pk, value);
                    if members.contains(pk) {
                        assert!(result.expect_err("duplicate member").is_already_exists());
                    } else {
                        result.expect("add failed");
                        members.insert(pk.clone());
                    }
                }
                IndexOperation::Remove { pk, value } => {
                    // Unique removal is keyed by value alone.
                    let result = unique.remove(pk, value);
                    if unique_model.remove(value).is_some() {
                        result.expect("remove failed");
                    } else {
                        assert!(result.expect_err("remove of absent value").is_not_found());
                    }

                    let members = non_unique_model.entry(value.clone()).or_default();
                    let result = non_unique.remove(pk, value);
                    if members.remove(pk) {
                        result.expect("remove failed");
                    } else {
                        assert!(result.expect_err("remove of absent member").is_not_found());
                    }
                }
                IndexOperation::Lookup { value } => {
                    match unique_model.get(value) {
                        Some(pk) => assert_eq!(
                            unique.lookup(value).expect("lookup failed"),
                            vec![target(pk)]
                        ),
                        None => assert!(unique.lookup(value).expect_err("lookup").is_not_found()),
                    }

                    let members = non_unique_model.get(value).cloned().unwrap_or_default();
                    if members.is_empty() {
                        assert!(non_unique.lookup(value).expect_err("lookup").is_not_found());
                    } else {
                        let mut found = non_unique.lookup(value).expect("lookup failed");
                        found.sort();
                        let expected: Vec<String> = members.iter().map(|pk| target(pk)).collect();
                        assert_eq!(found, expected);
                    }
                }
            }
        }
    }
}
