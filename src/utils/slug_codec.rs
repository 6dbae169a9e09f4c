//! Slug generation, sanitization and validation.
//!
//! All functions here are pure except [`generate_random`], which draws from the thread-local
//! CSPRNG.

use rand::Rng;
use regex::Regex;
use std::sync::LazyLock;

/// Shortest slug accepted.
pub const MIN_LEN: usize = 3;

/// Longest slug accepted.
pub const MAX_LEN: usize = 50;

/// Characters used for generated slugs.
pub const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Path prefixes owned by the service's own routes. A slug starting with any of these
/// (case-insensitive) would be shadowed by a route or shadow one.
pub const RESERVED_PREFIXES: &[&str] = &["api", "auth", "health"];

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid slug regex"));

static DISALLOWED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_-]").expect("valid charset regex"));

static UNDERSCORE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_{2,}").expect("valid underscore regex"));

static DASH_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-{2,}").expect("valid dash regex"));

/// Canonicalizes a user-supplied slug.
///
/// Lowercases and trims the input, strips characters outside `[A-Za-z0-9_-]`, collapses runs
/// of `_` and of `-`, then trims separators from both ends. The result may be empty or too
/// short; callers validate it with [`validate_format`].
///
/// # Examples
///
/// ```ignore
/// assert_eq!(sanitize("  My Promo!! "), "mypromo");
/// assert_eq!(sanitize("--summer__sale--"), "summer_sale");
/// ```
pub fn sanitize(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let stripped = DISALLOWED_RE.replace_all(&lowered, "");
    let collapsed = UNDERSCORE_RUN_RE.replace_all(&stripped, "_");
    let collapsed = DASH_RUN_RE.replace_all(&collapsed, "-");

    collapsed.trim_matches(|c| c == '_' || c == '-').to_string()
}

/// Returns `true` iff the slug has 3 to 50 characters, all from `[A-Za-z0-9_-]`.
pub fn validate_format(slug: &str) -> bool {
    (MIN_LEN..=MAX_LEN).contains(&slug.len()) && SLUG_RE.is_match(slug)
}

/// Returns `true` if the slug collides with a reserved route prefix.
pub fn is_reserved(slug: &str) -> bool {
    let lowered = slug.to_ascii_lowercase();
    RESERVED_PREFIXES
        .iter()
        .any(|prefix| lowered.starts_with(prefix))
}

/// Generates `length` characters drawn uniformly from [`ALPHABET`].
///
/// Uses `rand::rng()`, a ChaCha-based generator reseeded from the OS, so generated slugs are
/// not predictable from previously issued ones.
pub fn generate_random(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sanitize_lowercases_and_trims() {
        assert_eq!(sanitize("  PromoCode  "), "promocode");
    }

    #[test]
    fn test_sanitize_strips_invalid_characters() {
        assert_eq!(sanitize("a b"), "ab");
        assert_eq!(sanitize("sale@2025!"), "sale2025");
    }

    #[test]
    fn test_sanitize_collapses_runs_separately() {
        assert_eq!(sanitize("a__b--c"), "a_b-c");
        assert_eq!(sanitize("a_-_b"), "a_-_b");
    }

    #[test]
    fn test_sanitize_trims_separators() {
        assert_eq!(sanitize("--summer__sale--"), "summer_sale");
        assert_eq!(sanitize("_-x-_"), "x");
    }

    #[test]
    fn test_sanitize_can_produce_empty() {
        assert_eq!(sanitize("!!!"), "");
    }

    #[test]
    fn test_validate_format_bounds() {
        assert!(!validate_format("ab"));
        assert!(validate_format("abc"));
        assert!(validate_format(&"a".repeat(50)));
        assert!(!validate_format(&"a".repeat(51)));
    }

    #[test]
    fn test_validate_format_charset() {
        assert!(validate_format("My-Link_01"));
        assert!(!validate_format("a b c"));
        assert!(!validate_format("slug/path"));
        assert!(!validate_format("caf√©"));
    }

    #[test]
    fn test_reserved_prefixes_case_insensitive() {
        assert!(is_reserved("api"));
        assert!(is_reserved("APIdocs"));
        assert!(is_reserved("healthz"));
        assert!(is_reserved("Auth-login"));
        assert!(!is_reserved("rapid"));
        assert!(!is_reserved("promo"));
    }

    #[test]
    fn test_generate_random_length_and_charset() {
        for len in [6, 10, 15] {
            let slug = generate_random(len);
            assert_eq!(slug.len(), len);
            assert!(slug.bytes().all(|b| ALPHABET.contains(&b)));
            assert!(validate_format(&slug));
        }
    }

    #[test]
    fn test_generate_random_is_spread() {
        let slugs: HashSet<String> = (0..1000).map(|_| generate_random(8)).collect();
        assert_eq!(slugs.len(), 1000);
    }
}
