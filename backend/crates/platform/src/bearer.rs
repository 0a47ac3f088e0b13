//! Bearer Credential Extraction
//!
//! Common handling for the `Authorization: Bearer <token>` scheme.

use axum::http::{HeaderMap, header};

/// Extract a bearer token from request headers
///
/// Returns `None` when the header is absent, not valid UTF-8, or uses a
/// different authorization scheme.
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();

    if token.is_empty() { None } else { Some(token) }
}
