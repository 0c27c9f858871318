//! Ordering checks for listing pages.
//!
//! All checks are non-strict (equal neighbours are fine) and treat empty or
//! single-element lists as ordered. Strings compare ordinally, byte by byte.

/// Non-decreasing order
#[must_use]
pub fn is_ascending(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] <= w[1])
}

/// Non-increasing order
#[must_use]
pub fn is_descending(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] >= w[1])
}

/// A to Z
#[must_use]
pub fn is_sorted_alphabetically<S: AsRef<str>>(values: &[S]) -> bool {
    values.windows(2).all(|w| w[0].as_ref() <= w[1].as_ref())
}

/// Z to A
#[must_use]
pub fn is_sorted_reverse_alphabetically<S: AsRef<str>>(values: &[S]) -> bool {
    values.windows(2).all(|w| w[0].as_ref() >= w[1].as_ref())
}

/// Parse a displayed price such as `$29.99`
#[must_use]
pub fn parse_price(text: &str) -> Option<f64> {
    text.trim()
        .trim_start_matches('$')
        .replace(',', "")
        .trim()
        .parse()
        .ok()
}
