//! Month arithmetic for the rolling extraction window.
//!
//! The search feed labels teasers with locale date strings like `Oct. 14` —
//! month abbreviation only, no year. The extraction window is therefore
//! expressed as a single stop month: walk the feed newest-first and stop at
//! the first item whose month equals the boundary.
//!
//! # Wrapping
//!
//! Month arithmetic is 1-based and wraps modulo 12 exactly once. Look-back
//! windows larger than 12 months are rejected at configuration time
//! ([`crate::cli::Cli::validate`]), so a single wrap is always sufficient.

/// Canonical English three-letter month abbreviations, 1-based.
pub const MONTH_ABBRS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Compute the stop-boundary month abbreviation for the extraction window.
///
/// Counts `months_back` months backwards from `current_month` (1..=12),
/// wrapping into the previous year when the subtraction goes to zero or
/// below. A look-back of 0 is treated as 1 so the walk never stops on the
/// current month's first item.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(cutoff_month(1, 1), "Dec");
/// assert_eq!(cutoff_month(6, 3), "Mar");
/// ```
pub fn cutoff_month(current_month: u32, months_back: u32) -> &'static str {
    let months_back = if months_back == 0 { 1 } else { months_back };

    let mut result = current_month as i32 - months_back as i32;
    if result <= 0 {
        result += 12;
    }

    MONTH_ABBRS[(result - 1) as usize]
}

/// Normalize a raw month token from a feed date label to its canonical
/// abbreviation.
///
/// The feed is not consistent about abbreviation length: September renders
/// as `Sept.`, June and July are often spelled out. Matching takes the
/// leading alphabetic run of the token and compares its first three letters
/// case-insensitively against the canonical table.
///
/// Returns `None` when the token does not resolve to a month, which callers
/// treat as "does not match the cutoff" (fail-open).
pub fn normalize_month(label: &str) -> Option<&'static str> {
    let token: String = label
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if token.len() < 3 {
        return None;
    }

    let prefix = &token[..3];
    MONTH_ABBRS
        .iter()
        .find(|abbr| abbr.eq_ignore_ascii_case(prefix))
        .copied()
}
