use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use subtle::ConstantTimeEq;

use crate::error::LexiconError;
use crate::router::LexiconState;

pub const ADMIN_KEY_HEADER: &str = "x-beesmart-key";

fn key_matches(candidate: &str, expected: &str) -> bool {
    bool::from(candidate.as_bytes().ct_eq(expected.as_bytes()))
}

/// Ensure the inbound request carries the admin key.
/// Accepts either:
/// - Header: `x-beesmart-key: ...`
/// - Header: `Authorization: Bearer ...`
/// - Query string: `?key=...`
pub fn ensure_authorized(
    headers: &HeaderMap,
    query: Option<&str>,
    expected: &str,
) -> Result<(), LexiconError> {
    if expected.is_empty() {
        return Err(LexiconError::Unauthorized);
    }

    // 1) header: x-beesmart-key
    if let Some(hv) = headers.get(ADMIN_KEY_HEADER).and_then(|v| v.to_str().ok())
        && key_matches(hv.trim(), expected)
    {
        return Ok(());
    }

    // 2) header: Authorization: Bearer <key>
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        let auth = auth.trim();
        if let Some(token) = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            && key_matches(token.trim(), expected)
        {
            return Ok(());
        }
    }

    // 3) query: key=...
    if let Some(qs) = query {
        for (k, v) in url::form_urlencoded::parse(qs.as_bytes()) {
            if k == "key" && key_matches(&v, expected) {
                return Ok(());
            }
        }
    }

    Err(LexiconError::Unauthorized)
}

#[derive(Debug, Clone, Copy)]
pub struct RequireAdminKey;

impl FromRequestParts<LexiconState> for RequireAdminKey {
    type Rejection = LexiconError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &LexiconState,
    ) -> Result<Self, Self::Rejection> {
        ensure_authorized(&parts.headers, parts.uri.query(), &state.admin_key)?;
        Ok(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn accepts_header_bearer_and_query() {
        let mut headers = HeaderMap::new();
        headers.insert(ADMIN_KEY_HEADER, HeaderValue::from_static("s3cret"));
        assert!(ensure_authorized(&headers, None, "s3cret").is_ok());

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer s3cret"));
        assert!(ensure_authorized(&headers, None, "s3cret").is_ok());

        assert!(ensure_authorized(&HeaderMap::new(), Some("a=1&key=s3cret"), "s3cret").is_ok());
    }

    #[test]
    fn rejects_wrong_or_missing_key() {
        let mut headers = HeaderMap::new();
        headers.insert(ADMIN_KEY_HEADER, HeaderValue::from_static("nope"));
        assert!(matches!(
            ensure_authorized(&headers, Some("key=s3cre"), "s3cret"),
            Err(LexiconError::Unauthorized)
        ));
        assert!(ensure_authorized(&HeaderMap::new(), None, "").is_err());
    }
}
