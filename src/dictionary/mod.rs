//! Word definition resolution.
//!
//! Layout:
//! - `lexicon.rs`: offline Simple English Wiktionary dump
//! - `cache.rs`: persisted JSON cache of API results
//! - `breaker.rs`: failure-counting guard for the remote API
//! - `api.rs`: rate-limited remote dictionary client
//! - `kid.rs`: kid-friendly wording and fill-in-the-blank examples
//! - `fallback.rs`: suffix-based synthetic definitions
//! - `resolver.rs`: the lexicon -> cache -> API -> fallback chain

pub mod api;
pub mod breaker;
pub mod cache;
pub mod fallback;
pub mod kid;
pub mod lexicon;
pub mod resolver;

pub use api::{ApiDefinition, DictionaryApi};
pub use breaker::{BreakerStatus, CircuitBreaker, CircuitState};
pub use cache::{CacheEntry, DefinitionCache};
pub use lexicon::{Lexicon, LexiconEntry, LexiconSlot};
pub use resolver::{DictionaryResolver, ResolverStatus};

use serde::{Deserialize, Serialize};

/// Where a resolved definition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Lexicon,
    Cache,
    Api,
    Fallback,
}

/// A definition and fill-in-the-blank example ready for a spelling quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordInfo {
    pub word: String,
    pub definition: String,
    pub example: String,
    pub source: Source,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,
}
