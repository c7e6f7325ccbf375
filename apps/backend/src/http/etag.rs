//! ETag helpers for optimistic concurrency control.
//!
//! Match snapshots carry their session version as an ETag, so clients
//! can submit moves with If-Match and poll with If-None-Match instead of
//! carrying the version in request bodies.

use crate::domain::session::MatchId;
use crate::error::AppError;
use crate::errors::ErrorCode;

/// Generate an ETag for a match resource.
///
/// Format: `"match-{id}-v{version}"` (with quotes, as required by HTTP spec)
///
/// # Example
/// ```
/// # use backend::http::etag::match_etag;
/// # use backend::domain::session::MatchId;
/// let id = MatchId::parse("8N4V9D2K7M").unwrap();
/// let etag = match_etag(&id, 5);
/// assert_eq!(etag, r#""match-8N4V9D2K7M-v5""#);
/// ```
pub fn match_etag(id: &MatchId, version: u64) -> String {
    format!(r#""match-{id}-v{version}""#)
}

/// Parse the session version from a match ETag value.
///
/// Accepts ETags in the format `"match-{id}-v{version}"` and extracts the
/// version number.
///
/// # Errors
/// Returns `AppError::bad_request` with `ErrorCode::InvalidHeader` if:
/// - The ETag is missing or malformed
/// - The version cannot be parsed as u64
///
/// # Example
/// ```
/// # use backend::http::etag::parse_match_version_from_etag;
/// let version = parse_match_version_from_etag(r#""match-8N4V9D2K7M-v5""#).unwrap();
/// assert_eq!(version, 5);
/// ```
pub fn parse_match_version_from_etag(s: &str) -> Result<u64, AppError> {
    let s = s.trim_matches('"');

    // Expected format: match-{id}-v{version}; the version sits after the
    // last "-v".
    let version_prefix = "-v";
    let version_start = s
        .rfind(version_prefix)
        .ok_or_else(|| {
            AppError::bad_request(
                ErrorCode::InvalidHeader,
                format!("Invalid ETag format: missing version marker. Expected format: \"match-{{id}}-v{{version}}\", got: \"{s}\""),
            )
        })?
        + version_prefix.len();

    let version_str = &s[version_start..];
    version_str.parse::<u64>().map_err(|_| {
        AppError::bad_request(
            ErrorCode::InvalidHeader,
            format!("Invalid ETag format: version must be a valid integer, got: \"{version_str}\""),
        )
    })
}
