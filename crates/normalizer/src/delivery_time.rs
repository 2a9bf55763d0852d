//! The closed free-text → minutes table (spec §6). Adapters call
//! [`parse_free_text`] directly rather than keeping their own copy, so the
//! table is maintained in exactly one place.

use std::{collections::HashMap, sync::LazyLock};

static FREE_TEXT_TABLE: LazyLock<HashMap<&'static str, i64>> = LazyLock::new(|| {
    HashMap::from([
        ("instant", 10),
        ("minutes", 10),
        ("within 24 hours", 1440),
        ("1 business day", 1440),
        ("2 business days", 2880),
        ("3 business days", 4320),
        ("5 business days", 7200),
    ])
});

/// Looks up a free-text delivery-time phrase, case-insensitively and with
/// surrounding whitespace trimmed. Returns `None` for anything outside the
/// closed table — callers fall back to `error_kind = Parsing` or treat the
/// delivery time as unknown, per the calling adapter's own policy.
pub fn parse_free_text(text: &str) -> Option<i64> {
    FREE_TEXT_TABLE.get(text.trim().to_lowercase().as_str()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_phrases_case_insensitively() {
        assert_eq!(parse_free_text("Within 24 Hours"), Some(1440));
        assert_eq!(parse_free_text("  instant  "), Some(10));
    }

    #[test]
    fn unknown_phrase_is_none() {
        assert_eq!(parse_free_text("next tuesday"), None);
    }
}
