//! Destination URL completion and validation.
//!
//! Destinations are stored as the caller wrote them. The only rewrite is prepending
//! `https://` when the caller omitted a scheme; parsing is used purely to validate.

use url::Url;

/// Maximum stored URL length.
pub const MAX_URL_LEN: usize = 2048;

const DEFAULT_SCHEME_PREFIX: &str = "https://";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlNormalizationError {
    #[error("URL must not be empty")]
    Empty,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must be at most {MAX_URL_LEN} characters")]
    TooLong,
}

/// Completes and validates a destination URL.
///
/// # Rules
///
/// 1. Surrounding whitespace is trimmed
/// 2. Input without `http://` or `https://` (case-insensitive) gets `https://` prepended,
///    unless it carries some other `scheme://`, which is rejected
/// 3. The result must parse as an absolute URL with a host
/// 4. The result must not exceed [`MAX_URL_LEN`] characters
///
/// # Errors
///
/// Returns the matching [`UrlNormalizationError`] variant for each rule violated.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_url("example.com").unwrap(), "https://example.com");
/// assert_eq!(normalize_url("https://example.com").unwrap(), "https://example.com");
/// ```
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlNormalizationError::Empty);
    }

    let lowered = trimmed.to_ascii_lowercase();
    let completed = if lowered.starts_with("http://") || lowered.starts_with("https://") {
        trimmed.to_string()
    } else if has_scheme(trimmed) {
        return Err(UrlNormalizationError::UnsupportedProtocol);
    } else {
        format!("{DEFAULT_SCHEME_PREFIX}{trimmed}")
    };

    if completed.chars().count() > MAX_URL_LEN {
        return Err(UrlNormalizationError::TooLong);
    }

    let parsed =
        Url::parse(&completed).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(completed),
        _ => Err(UrlNormalizationError::InvalidFormat(
            "URL must include a host".to_string(),
        )),
    }
}

/// True when `input` opens with `scheme://`. A `://` after the first `/`, `?`
/// or `#` belongs to the path or query, not to a scheme.
fn has_scheme(input: &str) -> bool {
    input
        .split_once("://")
        .is_some_and(|(head, _)| !head.is_empty() && !head.contains(['/', '?', '#']))
}
