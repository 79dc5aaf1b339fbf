//! SQL literal encoding for values bound into row filters.
//!
//! Values produced here are only ever used as literal operands, never as
//! identifiers or operators, so doubling the single quote is the complete
//! escaping rule.

use std::borrow::Cow;

/// The unquoted SQL `NULL` keyword, rendered for absent scalar attributes.
pub const NULL: &str = "NULL";

/// Double every single quote in `value`.
///
/// Borrows the input when it contains no quote.
#[must_use]
pub fn escape(value: &str) -> Cow<'_, str> {
    if value.contains('\'') {
        Cow::Owned(value.replace('\'', "''"))
    } else {
        Cow::Borrowed(value)
    }
}

/// Render `value` as a quoted, escaped string literal: `O'Brien` → `'O''Brien'`.
#[must_use]
pub fn quote(value: &str) -> String {
    format!("'{}'", escape(value))
}

/// Render an optional value as a quoted literal, or `NULL` when absent.
#[must_use]
pub fn quote_or_null(value: Option<&str>) -> String {
    value.map_or_else(|| NULL.to_owned(), quote)
}

/// Render a list of values as a Postgres array literal of quoted elements:
/// `["a", "b"]` → `ARRAY['a','b']`.
#[must_use]
pub fn array<S: AsRef<str>>(values: &[S]) -> String {
    let elements: Vec<String> = values.iter().map(|v| quote(v.as_ref())).collect();
    format!("ARRAY[{}]", elements.join(","))
}
