use axum::{
    Json,
    extract::{Path, State},
};
use tracing::info;

use crate::dictionary::{ResolverStatus, WordInfo};
use crate::middleware::auth::RequireAdminKey;
use crate::router::LexiconState;

/// GET /api/define/{word} -> kid-friendly definition and example.
pub async fn define_handler(
    State(state): State<LexiconState>,
    Path(word): Path<String>,
) -> Json<WordInfo> {
    Json(state.resolver.resolve(&word).await)
}

/// GET /api/dictionary/status
pub async fn dictionary_status_handler(State(state): State<LexiconState>) -> Json<ResolverStatus> {
    Json(state.resolver.status())
}

/// POST /api/dictionary/breaker/reset -> closes the breaker and returns the new status.
pub async fn breaker_reset_handler(
    _auth: RequireAdminKey,
    State(state): State<LexiconState>,
) -> Json<ResolverStatus> {
    state.resolver.reset_breaker();
    info!("dictionary API breaker reset by admin");
    Json(state.resolver.status())
}
