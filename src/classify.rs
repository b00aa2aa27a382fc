//! Deterministic text classification for teaser titles and descriptions.
//!
//! Two pure classifiers feed the output schema: a case-insensitive phrase
//! occurrence count and a currency-mention flag. Both are free of hidden
//! state so re-running them on identical input always yields identical
//! output.

use once_cell::sync::Lazy;
use regex::Regex;

/// Currency pattern: a dollar amount with optional thousands separators and
/// optional 1-2 decimal digits, or a bare number followed by "dollars"/"USD".
/// The symbol form is case-sensitive; the word forms are not.
static MONEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\d{1,3}(?:,\d{3})*(?:\.\d{1,2})?|\d+\s(?i:dollars|USD)").unwrap()
});

/// Count non-overlapping, case-insensitive occurrences of `phrase` in
/// `haystack`.
///
/// An empty phrase returns 0. The configuration layer rejects an empty
/// search phrase outright, so this is a backstop rather than a supported
/// input.
pub fn count_phrase(haystack: &str, phrase: &str) -> usize {
    if phrase.is_empty() {
        return 0;
    }
    haystack
        .to_lowercase()
        .matches(&phrase.to_lowercase())
        .count()
}

/// Whether the text mentions a money amount.
///
/// Short-circuits on the first match; the number of mentions is not
/// aggregated.
pub fn mentions_money(text: &str) -> bool {
    MONEY_RE.is_match(text)
}
