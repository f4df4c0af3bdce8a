//! Text processing utilities.

/// Stand-in for literal values that are empty or whitespace-only.
///
/// Wikibase rejects empty string values, so such literals are submitted as
/// this marker instead.
pub const EMPTY_LITERAL_PLACEHOLDER: &str = "[empty]";

/// `true` for strings that are empty or contain only whitespace.
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Return `value` unchanged, or [`EMPTY_LITERAL_PLACEHOLDER`] if it is blank.
pub fn literal_or_placeholder(value: &str) -> &str {
    if is_blank(value) {
        EMPTY_LITERAL_PLACEHOLDER
    } else {
        value
    }
}
