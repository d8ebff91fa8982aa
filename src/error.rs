use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum LexiconError {
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Ractor error: {0}")]
    RactorError(String),

    #[error("Upstream error with status: {0}")]
    UpstreamStatus(reqwest::StatusCode),

    #[error("Dictionary API circuit breaker is open")]
    BreakerOpen,

    #[error("Invalid word format: {0:?}")]
    InvalidWord(String),

    #[error("Unauthorized: invalid or missing key")]
    Unauthorized,

    #[error("Unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}

impl LexiconError {
    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            LexiconError::Reqwest(e) => e.is_timeout() || e.is_connect(),
            LexiconError::UpstreamStatus(status) => {
                status.is_server_error() || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }

    /// Whether this failure should count against the dictionary API breaker.
    pub fn trips_breaker(&self) -> bool {
        matches!(
            self,
            LexiconError::Reqwest(_) | LexiconError::UpstreamStatus(_)
        )
    }
}

impl IntoResponse for LexiconError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            LexiconError::DatabaseError(_)
            | LexiconError::RactorError(_)
            | LexiconError::Io(_)
            | LexiconError::UnknownVariant { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                },
            ),
            LexiconError::Json(_) | LexiconError::InvalidWord(_) => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    code: "BAD_REQUEST".to_string(),
                    message: "The request could not be processed.".to_string(),
                },
            ),
            LexiconError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ApiErrorBody {
                    code: "UNAUTHORIZED".to_string(),
                    message: "invalid or missing key".to_string(),
                },
            ),
            LexiconError::BreakerOpen => (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiErrorBody {
                    code: "BREAKER_OPEN".to_string(),
                    message: "Dictionary lookups are temporarily paused.".to_string(),
                },
            ),
            LexiconError::Reqwest(_) | LexiconError::UrlParse(_) => (
                StatusCode::BAD_GATEWAY,
                ApiErrorBody {
                    code: "BAD_GATEWAY".to_string(),
                    message: "Upstream service is unavailable.".to_string(),
                },
            ),
            LexiconError::UpstreamStatus(code) => {
                let (err_code, msg) = match code {
                    reqwest::StatusCode::TOO_MANY_REQUESTS => {
                        ("RATE_LIMIT", "Upstream rate limit exceeded.")
                    }
                    reqwest::StatusCode::NOT_FOUND => ("NOT_FOUND", "Upstream resource not found."),
                    _ => ("UPSTREAM_ERROR", "An upstream error occurred."),
                };
                (
                    StatusCode::from_u16(code.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY),
                    ApiErrorBody {
                        code: err_code.to_string(),
                        message: msg.to_string(),
                    },
                )
            }
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_retry_and_trip_breaker() {
        let err = LexiconError::UpstreamStatus(reqwest::StatusCode::BAD_GATEWAY);
        assert!(err.is_retryable());
        assert!(err.trips_breaker());
    }

    #[test]
    fn parse_failures_do_not_trip_breaker() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = LexiconError::Json(json_err);
        assert!(!err.is_retryable());
        assert!(!err.trips_breaker());
        assert!(!LexiconError::BreakerOpen.trips_breaker());
    }

    #[test]
    fn breaker_open_maps_to_503() {
        let resp = LexiconError::BreakerOpen.into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
