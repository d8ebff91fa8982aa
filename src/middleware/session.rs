use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use sha2::{Digest, Sha256};
use std::convert::Infallible;

pub const SESSION_HEADER: &str = "x-session-id";
pub const UNKNOWN_SESSION: &str = "session_unknown";

/// Session id derived from request headers.
///
/// Handlers prefer an explicit `session_id` in the request body over this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSession(pub String);

impl ClientSession {
    /// Body-supplied id when present, otherwise the header-derived one.
    pub fn or_explicit(self, explicit: Option<String>) -> String {
        explicit
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or(self.0)
    }
}

pub fn session_from_headers(headers: &HeaderMap) -> String {
    if let Some(id) = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
    {
        return id.to_string();
    }

    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(session_for_ip)
        .unwrap_or_else(|| UNKNOWN_SESSION.to_string())
}

/// `session_` plus the first 8 hex digits of the SHA-256 of the address.
pub fn session_for_ip(ip: &str) -> String {
    let digest = Sha256::digest(ip.as_bytes());
    let hex = hex::encode(digest);
    format!("session_{}", &hex[..8])
}

impl<S> FromRequestParts<S> for ClientSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(session_from_headers(&parts.headers)))
    }
}
