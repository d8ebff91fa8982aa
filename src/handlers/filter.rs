use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::LexiconError;
use crate::filter::{FilterStatus, ViolationNotice, WordEntry};
use crate::middleware::session::ClientSession;
use crate::router::LexiconState;

#[derive(Debug, Deserialize)]
pub struct FilterWordsRequest {
    #[serde(default)]
    pub words: Vec<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FilterWordsResponse {
    pub ok: bool,
    pub count: usize,
    pub filtered: Vec<String>,
    pub blocked: Vec<String>,
    pub messages: Vec<ViolationNotice>,
}

#[derive(Debug, Deserialize)]
pub struct FilterEntriesRequest {
    #[serde(default)]
    pub words: Vec<WordEntry>,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FilterEntriesResponse {
    pub ok: bool,
    pub count: usize,
    pub words: Vec<WordEntry>,
    pub blocked: Vec<String>,
    pub messages: Vec<ViolationNotice>,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub session_id: Option<String>,
}

/// POST /api/filter/words
pub async fn filter_words_handler(
    State(state): State<LexiconState>,
    client: ClientSession,
    Json(req): Json<FilterWordsRequest>,
) -> Result<Json<FilterWordsResponse>, LexiconError> {
    let session_id = client.or_explicit(req.session_id);
    let outcome = state.tracker.filter_words(&session_id, req.words).await?;
    Ok(Json(FilterWordsResponse {
        ok: true,
        count: outcome.filtered.len(),
        filtered: outcome.filtered,
        blocked: outcome.blocked,
        messages: outcome.messages,
    }))
}

/// POST /api/filter/entries
pub async fn filter_entries_handler(
    State(state): State<LexiconState>,
    client: ClientSession,
    Json(req): Json<FilterEntriesRequest>,
) -> Result<Json<FilterEntriesResponse>, LexiconError> {
    let session_id = client.or_explicit(req.session_id);
    let outcome = state.tracker.filter_entries(&session_id, req.words).await?;
    Ok(Json(FilterEntriesResponse {
        ok: true,
        count: outcome.accepted.len(),
        words: outcome.accepted,
        blocked: outcome.blocked,
        messages: outcome.messages,
    }))
}

/// GET /api/filter/status
pub async fn filter_status_handler(
    State(state): State<LexiconState>,
    client: ClientSession,
    Query(query): Query<StatusQuery>,
) -> Result<Json<FilterStatus>, LexiconError> {
    let session_id = client.or_explicit(query.session_id);
    Ok(Json(state.tracker.status(&session_id).await?))
}
