//! Company name normalisation and query sanitisation.
//!
//! Normalised names are the comparison form used by both the match scorer
//! and duplicate resolution, so spelling variants such as
//! `"Sobha & Co. LLC"` and `"sobha and co"` collapse to the same key.

use std::sync::LazyLock;

use regex::Regex;

/// Legal-entity suffixes removed as isolated words, with optional dots.
static LEGAL_SUFFIX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:l\.l\.c|llc|f\.z\.e|fze)\b").expect("valid regex")
});

/// Suffix tokens as they appear once punctuation is gone.
const BARE_SUFFIXES: &[&str] = &["llc", "fze"];

/// Characters stripped from raw queries before they reach a record source.
const UNSAFE_QUERY_CHARS: &[char] = &['<', '>', '"', '\'', '`', '\r', '\n'];

/// Normalise a company name for comparison.
///
/// Lower-cases, rewrites `&` as `and`, removes legal suffixes (`LLC`,
/// `L.L.C`, `FZE`, `F.Z.E`) when they stand alone as words, keeps only
/// `[a-z0-9]` and spaces, then collapses whitespace.
///
/// The function is total and idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let lowered = text.trim().to_lowercase().replace('&', "and");
    let without_suffixes = LEGAL_SUFFIX_REGEX.replace_all(&lowered, "");

    let kept: String = without_suffixes
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();

    // Stripping can expose a bare suffix ("f-ze" -> "fze"); drop those too
    // so the result is a fixed point.
    kept.split_whitespace()
        .filter(|token| !BARE_SUFFIXES.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sanitise a raw user query.
///
/// Strips markup and quote characters plus line breaks, trims, and
/// truncates to `max_chars` characters. An empty result means there is
/// nothing to search for.
pub fn sanitize_query(raw: &str, max_chars: usize) -> String {
    let stripped: String = raw.chars().filter(|c| !UNSAFE_QUERY_CHARS.contains(c)).collect();
    stripped.trim().chars().take(max_chars).collect()
}
