//! Tag canonicalization.
//!
//! Variant tags for one physical item (`P101A`, `P101B`, `p 101a`) collapse to
//! a single base key so that every table indexes the same entity the same way.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_BASE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Z]+[0-9]+)").unwrap());

/// Reduce a raw tag to its canonical base key.
///
/// Trims, uppercases, strips whitespace and maps `^` to `/`. When the cleaned tag
/// starts with letters followed by digits, only that prefix is kept. Empty
/// input yields the empty string, which callers treat as "no tag".
pub fn canonicalize(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .to_uppercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '^' { '/' } else { c })
        .collect();

    match TAG_BASE_RE.captures(&cleaned) {
        Some(caps) => caps[1].to_string(),
        None => cleaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_suffix_after_digits() {
        assert_eq!(canonicalize("FI101A"), "FI101");
        assert_eq!(canonicalize("fi101a"), "FI101");
        assert_eq!(canonicalize("P101B"), "P101");
        assert_eq!(canonicalize("P101-1"), "P101");
    }

    #[test]
    fn removes_spaces_and_uppercases() {
        assert_eq!(canonicalize("  p 101 a "), "P101");
        assert_eq!(canonicalize("tic 301"), "TIC301");
    }

    #[test]
    fn keeps_cleaned_string_without_prefix() {
        assert_eq!(canonicalize("P-101"), "P-101");
        assert_eq!(canonicalize("a^b"), "A/B");
        assert_eq!(canonicalize("101"), "101");
    }

    #[test]
    fn empty_input() {
        assert_eq!(canonicalize(""), "");
        assert_eq!(canonicalize("   "), "");
    }

    #[test]
    fn idempotent() {
        for raw in [
            "FI101A", "fi101a", "P-101", "x^y 1", "  ", "LIC-2001B", "泵101", "AB12CD34",
        ] {
            let once = canonicalize(raw);
            assert_eq!(canonicalize(&once), once, "not idempotent for {raw:?}");
        }
    }
}
