//! Whitespace cleanup, readiness gating, and character-safe truncation.

/// Collapse every run of whitespace into a single space and trim the ends.
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether `text` carries more than `threshold` characters once trimmed.
pub fn is_ready(text: &str, threshold: usize) -> bool {
    text.trim().chars().count() > threshold
}

/// Prefix of `text` holding at most `max_chars` characters.
///
/// Always cuts on a UTF-8 boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
