//! Query cleanup applied before keyword search.

/// Characters replaced by a space before a query reaches the keyword engine.
pub const STRIPPED_PUNCTUATION: &[char] = &['¿', '?', '¡', '!', ',', '.', ':'];

/// Lower-case, blank out `STRIPPED_PUNCTUATION`, collapse whitespace runs and trim.
pub fn normalize_query(query: &str) -> String {
    query
        .to_lowercase()
        .replace(STRIPPED_PUNCTUATION, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
