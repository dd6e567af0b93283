//! ASIN extraction from Amazon URLs.
//!
//! Pure functions, no I/O. Shortened links must be resolved before
//! extraction; an unresolved `amzn.to` path yields nothing.

use regex_lite::Regex;
use std::sync::LazyLock;
use url::Url;

/// A 10-character uppercase-alphanumeric token following a known product
/// path marker, terminated by a path/query boundary or end of string.
static PATH_ASIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(?:dp|gp/product|gp/aw/d|product)/([A-Z0-9]{10})(?:[/?#]|$)").unwrap()
});

/// Extracts an ASIN from a URL, trying path markers first, then a
/// case-insensitive `asin` query parameter.
pub fn extract_asin(url: &str) -> Option<String> {
    if let Some(captures) = PATH_ASIN.captures(url) {
        return Some(captures[1].to_string());
    }

    let parsed = Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key.eq_ignore_ascii_case("asin"))
        .map(|(_, value)| value.to_string())
        .filter(|value| is_valid_asin(value))
}

/// Checks the fixed ASIN shape: exactly 10 uppercase letters or digits.
pub fn is_valid_asin(token: &str) -> bool {
    token.len() == 10 && token.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}
