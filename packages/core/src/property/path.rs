//! Property path validation and field list splitting

use once_cell::sync::Lazy;
use regex::Regex;

static PROPERTY_PATH: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_\-.]*(/[A-Za-z0-9_\-.]+)*$").ok());

/// Whether `path` is a syntactically valid property path (`a`, `a/b/c`, `a_b.c`).
#[must_use]
pub fn is_valid_property_path(path: &str) -> bool {
    PROPERTY_PATH
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(path))
}

/// Split a comma-separated partial-response field list into trimmed entries.
///
/// Empty entries are dropped, so `"a, ,b/c,"` yields `["a", "b/c"]`.
pub fn split_field_list(fields: &str) -> Vec<&str> {
    fields
        .split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .collect()
}
