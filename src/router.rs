use crate::dictionary::DictionaryResolver;
use crate::filter::TrackerHandle;
use crate::handlers::dictionary::{breaker_reset_handler, define_handler, dictionary_status_handler};
use crate::handlers::filter::{filter_entries_handler, filter_status_handler, filter_words_handler};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;

/// Upper bound for filter request bodies.
const BODY_LIMIT: usize = 2 * 1024 * 1024;

#[derive(Clone)]
pub struct LexiconState {
    pub resolver: Arc<DictionaryResolver>,
    pub tracker: TrackerHandle,
    pub admin_key: Arc<str>,
}

impl LexiconState {
    pub fn new(resolver: Arc<DictionaryResolver>, tracker: TrackerHandle, admin_key: &str) -> Self {
        Self {
            resolver,
            tracker,
            admin_key: Arc::from(admin_key),
        }
    }
}

pub fn lexicon_router(state: LexiconState) -> Router {
    Router::new()
        .route("/api/define/{word}", get(define_handler))
        .route("/api/dictionary/status", get(dictionary_status_handler))
        .route("/api/dictionary/breaker/reset", post(breaker_reset_handler))
        .route("/api/filter/words", post(filter_words_handler))
        .route("/api/filter/entries", post(filter_entries_handler))
        .route("/api/filter/status", get(filter_status_handler))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}
