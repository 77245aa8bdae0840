//! Helpers for `/`-separated backend paths.
//!
//! Backends address entries with plain strings so that the same index
//! layout works on a local disk and on a remote content repository.

/// Joins path segments with `/`, collapsing duplicate separators.
///
/// A leading `/` on the first segment is preserved.
///
/// ```rust
/// use symdex_storage::path::join;
///
/// let root = join(&["/data", "index.disk", "unique.User.Mail"]);
/// assert_eq!(root, "/data/index.disk/unique.User.Mail");
/// assert_eq!(join(&["data/", "/files", "1"]), "data/files/1");
/// ```
#[must_use]
pub fn join(segments: &[&str]) -> String {
    let absolute = segments.first().is_some_and(|s| s.starts_with('/'));
    let joined = segments
        .iter()
        .flat_map(|s| s.split('/'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Returns the last segment of `path`, ignoring trailing separators.
#[must_use]
pub fn base_name(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}

/// Returns everything before the last segment of `path`, or `None` for a
/// single-segment path.
#[must_use]
pub fn parent(path: &str) -> Option<&str> {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) => Some("/"),
        Some(idx) => Some(&trimmed[..idx]),
        None => None,
    }
}
