//! Shared test vectors for index layout and filter compilation.
//!
//! Index trees written by one implementation must be readable by another,
//! so the layout is pinned down as data rather than only as test code.

use serde::{Deserialize, Serialize};

/// Where an add must place its link, relative to the index base dir.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Strategy name.
    pub kind: String,
    /// Indexed type.
    pub type_name: String,
    /// Indexed field.
    pub field: String,
    /// Whether the index is case-insensitive.
    pub case_insensitive: bool,
    /// Primary key added.
    pub pk: String,
    /// Value added; empty asks autoincrement for the next ordinal.
    pub value: String,
    /// Expected link path, relative to `<data_dir>/index.<backend>`.
    pub expected_entry: String,
    /// Expected link target, relative to `<data_dir>`.
    pub expected_target: String,
}

/// How a filter expression must compile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// The filter expression.
    pub filter: String,
    /// Expected leaves as `[kind, field, value]`, in resolution order.
    pub expected_leaves: Vec<[String; 3]>,
    /// Expected error class (`query` or `unsupported`), if compiling fails.
    pub expected_error: Option<String>,
}

fn layout(
    id: &str,
    description: &str,
    kind: &str,
    field: &str,
    case_insensitive: bool,
    value: &str,
    expected_entry: &str,
) -> LayoutVector {
    LayoutVector {
        id: id.into(),
        description: description.into(),
        kind: kind.into(),
        type_name: "acme.User".into(),
        field: field.into(),
        case_insensitive,
        pk: "u1".into(),
        value: value.into(),
        expected_entry: expected_entry.into(),
        expected_target: "users/u1".into(),
    }
}

/// Index layout vectors.
pub fn layout_vectors() -> Vec<LayoutVector> {
    vec![
        layout(
            "unique_plain",
            "Unique link named after the value",
            "unique",
            "Mail",
            false,
            "mikey@example.com",
            "unique.acme.User.Mail/mikey@example.com",
        ),
        layout(
            "unique_case_insensitive",
            "Case-insensitive values are stored lower-cased",
            "unique",
            "Mail",
            true,
            "Mikey@Example.com",
            "unique.acme.User.Mail/mikey@example.com",
        ),
        layout(
            "non_unique_member",
            "Non-unique link nested under a value directory",
            "non_unique",
            "Name",
            false,
            "Mikey",
            "non_unique.acme.User.Name/Mikey/u1",
        ),
        layout(
            "autoincrement_first",
            "First generated ordinal on an empty index is the lower bound",
            "autoincrement",
            "Uid",
            false,
            "",
            "autoincrement.acme.User.Uid/0",
        ),
        layout(
            "autoincrement_explicit",
            "Explicit values are stored as given",
            "autoincrement",
            "Uid",
            false,
            "1234",
            "autoincrement.acme.User.Uid/1234",
        ),
    ]
}

fn leaf(kind: &str, field: &str, value: &str) -> [String; 3] {
    [kind.into(), field.into(), value.into()]
}

fn query(id: &str, filter: &str, expected_leaves: Vec<[String; 3]>) -> QueryVector {
    QueryVector {
        id: id.into(),
        filter: filter.into(),
        expected_leaves,
        expected_error: None,
    }
}

fn query_error(id: &str, filter: &str, class: &str) -> QueryVector {
    QueryVector {
        id: id.into(),
        filter: filter.into(),
        expected_leaves: Vec::new(),
        expected_error: Some(class.into()),
    }
}

/// Filter compilation vectors.
pub fn query_vectors() -> Vec<QueryVector> {
    vec![
        query("eq", "Color eq 'Green'", vec![leaf("find_by", "Color", "Green")]),
        query(
            "eq_lower_field",
            "color eq 'Green'",
            vec![leaf("find_by", "Color", "Green")],
        ),
        query(
            "startswith",
            "startswith(Color,'Gr')",
            vec![leaf("find_by_partial", "Color", "Gr*")],
        ),
        query(
            "or",
            "Color eq 'White' or Color eq 'Green'",
            vec![
                leaf("find_by", "Color", "White"),
                leaf("find_by", "Color", "Green"),
            ],
        ),
        query(
            "escaped_quote",
            "Name eq 'O''Neil'",
            vec![leaf("find_by", "Name", "O'Neil")],
        ),
        query_error("and", "Color eq 'a' and Name eq 'b'", "unsupported"),
        query_error("ne", "Color ne 'a'", "unsupported"),
        query_error("endswith", "endswith(Color,'n')", "unsupported"),
        query_error("dangling", "Color eq", "query"),
        query_error("empty", "", "query"),
    ]
}

/// Returns all vectors as pretty-printed JSON.
pub fn all_vectors_json() -> String {
    let vectors = AllTestVectors {
        layout: layout_vectors(),
        query: query_vectors(),
    };

    serde_json::to_string_pretty(&vectors).expect("Failed to serialize vectors")
}

#[derive(Debug, Serialize, Deserialize)]
struct AllTestVectors {
    layout: Vec<LayoutVector>,
    query: Vec<QueryVector>,
}
