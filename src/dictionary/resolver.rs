use super::api::{ApiDefinition, DictionaryApi};
use super::breaker::BreakerStatus;
use super::cache::{CacheEntry, DefinitionCache};
use super::lexicon::{LexiconEntry, LexiconSlot};
use super::{Source, WordInfo, fallback, kid};
use crate::error::LexiconError;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize)]
pub struct ResolverStatus {
    pub breaker: BreakerStatus,
    pub lexicon_loaded: bool,
    pub lexicon_entries: usize,
    pub cached_entries: usize,
}

/// Resolves words through lexicon, cache, remote API and synthetic fallback.
pub struct DictionaryResolver {
    lexicon: LexiconSlot,
    cache: Arc<DefinitionCache>,
    api: DictionaryApi,
}

impl DictionaryResolver {
    pub fn new(lexicon: LexiconSlot, cache: Arc<DefinitionCache>, api: DictionaryApi) -> Self {
        Self {
            lexicon,
            cache,
            api,
        }
    }

    pub fn lexicon(&self) -> &LexiconSlot {
        &self.lexicon
    }

    pub fn cache(&self) -> &DefinitionCache {
        &self.cache
    }

    /// Always yields a usable definition; lookup failures fall through to the
    /// next layer.
    pub async fn resolve(&self, word: &str) -> WordInfo {
        let word = word.trim();
        let key = word.to_lowercase();
        if key.is_empty() {
            return fallback::synthesize(word);
        }

        if let Some(entry) = self.lexicon.get().and_then(|lexicon| lexicon.get(&key)) {
            debug!(word, "resolved from lexicon");
            return from_lexicon(word, entry);
        }

        if let Some(entry) = self.cache.get(&key) {
            debug!(word, "resolved from cache");
            return from_cache(word, entry);
        }

        match self.api.lookup(word).await {
            Ok(Some(found)) => {
                let entry = cache_entry(&found);
                if let Err(e) = self.cache.insert(&key, entry).await {
                    warn!(word, error = %e, "failed to write definition cache");
                }
                return from_api(word, found);
            }
            Ok(None) => {}
            Err(LexiconError::BreakerOpen | LexiconError::InvalidWord(_)) => {}
            Err(e) => debug!(word, error = %e, "API layer failed; using fallback"),
        }

        debug!(word, "resolved from fallback");
        fallback::synthesize(word)
    }

    pub fn status(&self) -> ResolverStatus {
        ResolverStatus {
            breaker: self.api.breaker().status(),
            lexicon_loaded: self.lexicon.is_loaded(),
            lexicon_entries: self.lexicon.get().map_or(0, |lexicon| lexicon.len()),
            cached_entries: self.cache.len(),
        }
    }

    pub fn reset_breaker(&self) {
        self.api.breaker().reset();
    }
}

fn from_lexicon(word: &str, entry: &LexiconEntry) -> WordInfo {
    WordInfo {
        word: word.to_string(),
        definition: entry.definition.clone(),
        example: kid::example_sentence(word, entry.example.as_deref()),
        source: Source::Lexicon,
        phonetic: None,
        part_of_speech: entry.part_of_speech.clone(),
    }
}

fn from_cache(word: &str, entry: CacheEntry) -> WordInfo {
    let example = if entry.example.contains(kid::BLANK) {
        entry.example
    } else {
        kid::example_sentence(word, Some(&entry.example))
    };
    WordInfo {
        word: word.to_string(),
        definition: entry.definition,
        example,
        source: Source::Cache,
        phonetic: entry.phonetic,
        part_of_speech: entry.part_of_speech,
    }
}

fn from_api(word: &str, found: ApiDefinition) -> WordInfo {
    WordInfo {
        word: word.to_string(),
        definition: found.definition,
        example: found.example,
        source: Source::Api,
        phonetic: found.phonetic,
        part_of_speech: found.part_of_speech,
    }
}

fn cache_entry(found: &ApiDefinition) -> CacheEntry {
    CacheEntry {
        definition: found.definition.clone(),
        example: found.example.clone(),
        phonetic: found.phonetic.clone(),
        part_of_speech: found.part_of_speech.clone(),
        created: Some(Utc::now()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DictionaryConfig;
    use crate::dictionary::lexicon::Lexicon;
    use mockito::Server;
    use url::Url;

    const BRISK_BODY: &str = r#"[{"meanings": [{"partOfSpeech": "adjective",
        "definitions": [{"definition": "adjective Quick and energetic.", "example": "We took a brisk walk."}]}]}]"#;

    fn api_for(base: &str) -> DictionaryApi {
        let cfg = DictionaryConfig {
            api_base_url: Url::parse(base).unwrap(),
            requests_per_second: 1000,
            retry_times: 0,
            ..DictionaryConfig::default()
        };
        DictionaryApi::new(&cfg, None).unwrap()
    }

    fn lexicon_with_admire() -> LexiconSlot {
        LexiconSlot::ready(Lexicon::from_iter([(
            "admire".to_string(),
            LexiconEntry {
                definition: "To like and respect someone".to_string(),
                example: Some("I admire my teacher.".to_string()),
                part_of_speech: Some("verb".to_string()),
            },
        )]))
    }

    #[tokio::test]
    async fn lexicon_wins_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(DefinitionCache::empty(dir.path().join("dictionary.json")));
        let resolver =
            DictionaryResolver::new(lexicon_with_admire(), cache, api_for("http://127.0.0.1:9/"));

        let info = resolver.resolve("  Admire ").await;
        assert_eq!(info.source, Source::Lexicon);
        assert_eq!(info.word, "Admire");
        assert_eq!(info.example, "I _____ my teacher.");
        assert_eq!(resolver.status().breaker.failures, 0);
    }

    #[tokio::test]
    async fn api_result_is_cached_and_reused() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/brisk")
            .with_status(200)
            .with_body(BRISK_BODY)
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("dictionary.json");
        let cache = Arc::new(DefinitionCache::empty(&cache_path));
        let resolver = DictionaryResolver::new(LexiconSlot::new(), cache, api_for(&server.url()));

        let first = resolver.resolve("brisk").await;
        assert_eq!(first.source, Source::Api);
        assert_eq!(first.definition, "Quick and energetic");
        assert_eq!(first.example, "We took a _____ walk.");

        let second = resolver.resolve("BRISK").await;
        assert_eq!(second.source, Source::Cache);
        assert_eq!(second.definition, first.definition);
        mock.assert_async().await;

        let on_disk = DefinitionCache::open(&cache_path).unwrap();
        assert!(on_disk.get("brisk").is_some());
    }

    #[tokio::test]
    async fn not_found_falls_back() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/flibbering")
            .with_status(404)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(DefinitionCache::empty(dir.path().join("dictionary.json")));
        let resolver = DictionaryResolver::new(LexiconSlot::new(), cache, api_for(&server.url()));

        let info = resolver.resolve("flibbering").await;
        assert_eq!(info.source, Source::Fallback);
        assert!(info.definition.contains("-ing"));
        assert_eq!(info.example, "The children are _____ at the playground");
        assert!(resolver.cache().is_empty());
    }

    #[tokio::test]
    async fn unreachable_api_still_answers() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(DefinitionCache::empty(dir.path().join("dictionary.json")));
        let resolver =
            DictionaryResolver::new(LexiconSlot::new(), cache, api_for("http://127.0.0.1:9/"));

        for word in ["", "apple", "42", "über"] {
            let info = resolver.resolve(word).await;
            assert!(!info.definition.is_empty(), "empty definition for {word:?}");
            assert_eq!(info.source, Source::Fallback);
        }
        assert_eq!(resolver.status().breaker.failures, 2);
    }

    #[tokio::test]
    async fn reset_breaker_closes_it() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/apple")
            .with_status(500)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(DefinitionCache::empty(dir.path().join("dictionary.json")));
        let resolver = DictionaryResolver::new(LexiconSlot::new(), cache, api_for(&server.url()));

        for _ in 0..5 {
            resolver.resolve("apple").await;
        }
        assert_eq!(
            resolver.status().breaker.state,
            crate::dictionary::CircuitState::Open
        );
        resolver.reset_breaker();
        assert_eq!(
            resolver.status().breaker.state,
            crate::dictionary::CircuitState::Closed
        );
    }
}
