//! Search-query construction from keywords or raw user input.

use crate::types::SearchQuery;

/// Number of leading keywords used for a derived query.
pub const DEFAULT_QUERY_KEYWORDS: usize = 3;

/// Space-join the first `count` keywords.
pub fn from_keywords<S: AsRef<str>>(keywords: &[S], count: usize) -> SearchQuery {
    let term = keywords
        .iter()
        .take(count)
        .map(|k| k.as_ref())
        .collect::<Vec<_>>()
        .join(" ");
    SearchQuery::new(term)
}

/// Use a user-typed query verbatim, minus surrounding whitespace.
pub fn from_raw(raw: &str) -> SearchQuery {
    SearchQuery::new(raw.trim())
}
