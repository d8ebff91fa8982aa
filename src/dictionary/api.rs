use super::breaker::CircuitBreaker;
use super::kid;
use crate::config::DictionaryConfig;
use crate::error::LexiconError;
use backon::{ExponentialBuilder, Retryable};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::StatusCode;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Normalized result of a successful API lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiDefinition {
    pub definition: String,
    pub example: String,
    pub phonetic: Option<String>,
    pub part_of_speech: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiEntry {
    #[serde(default)]
    phonetics: Vec<ApiPhonetic>,
    #[serde(default)]
    meanings: Vec<ApiMeaning>,
}

#[derive(Debug, Deserialize)]
struct ApiPhonetic {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiMeaning {
    #[serde(default)]
    part_of_speech: Option<String>,
    #[serde(default)]
    definitions: Vec<ApiSense>,
}

#[derive(Debug, Deserialize)]
struct ApiSense {
    #[serde(default)]
    definition: String,
    #[serde(default)]
    example: Option<String>,
}

enum FetchOutcome {
    Found(Vec<ApiEntry>),
    NotFound,
}

/// Remote dictionary client: rate limited and guarded by a circuit breaker.
pub struct DictionaryApi {
    client: reqwest::Client,
    base_url: Url,
    limiter: Arc<DefaultDirectRateLimiter>,
    breaker: Arc<CircuitBreaker>,
    retry_policy: ExponentialBuilder,
}

impl DictionaryApi {
    pub fn new(cfg: &DictionaryConfig, proxy: Option<&Url>) -> Result<Self, LexiconError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .timeout(Duration::from_secs(cfg.timeout_secs));
        if let Some(proxy_url) = proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
        }
        let client = builder.build()?;

        let per_second = NonZeroU32::new(cfg.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::direct(
            Quota::per_second(per_second).allow_burst(NonZeroU32::MIN),
        ));
        let breaker = Arc::new(CircuitBreaker::new(
            cfg.breaker_threshold,
            Duration::from_secs(cfg.breaker_cooldown_secs),
        ));
        let retry_policy = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(250))
            .with_max_delay(Duration::from_secs(2))
            .with_max_times(cfg.retry_times)
            .with_jitter();

        Ok(Self {
            client,
            base_url: with_trailing_slash(cfg.api_base_url.clone()),
            limiter,
            breaker,
            retry_policy,
        })
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Look up `word`. `Ok(None)` means the dictionary has no usable entry.
    ///
    /// Network errors and non-404 error statuses count against the breaker;
    /// a 404 is a plain miss.
    pub async fn lookup(&self, word: &str) -> Result<Option<ApiDefinition>, LexiconError> {
        if self.breaker.is_open() {
            debug!(
                word,
                failures = self.breaker.failures(),
                "circuit breaker open; skipping API lookup"
            );
            return Err(LexiconError::BreakerOpen);
        }

        let clean = clean_word(word);
        if clean.is_empty() {
            return Err(LexiconError::InvalidWord(word.to_string()));
        }
        let url = self.base_url.join(&clean)?;
        debug!(%url, "dictionary API lookup");

        let result = (|| async {
            self.limiter.until_ready().await;
            self.fetch(url.clone()).await
        })
        .retry(self.retry_policy)
        .when(|e: &LexiconError| e.is_retryable())
        .notify(|err, dur: Duration| {
            warn!("dictionary API retrying after error {}, sleeping {:?}", err, dur);
        })
        .await;

        match result {
            Ok(FetchOutcome::Found(entries)) => {
                self.breaker.record_success();
                let found = extract_definition(word, entries);
                match &found {
                    Some(_) => info!(word, "dictionary API hit"),
                    None => debug!(word, "dictionary API returned no usable definition"),
                }
                Ok(found)
            }
            Ok(FetchOutcome::NotFound) => {
                debug!(word, "word not found in dictionary (404)");
                Ok(None)
            }
            Err(e) => {
                if e.trips_breaker() {
                    self.breaker.record_failure();
                }
                warn!(word, error = %e, failures = self.breaker.failures(), "dictionary API lookup failed");
                Err(e)
            }
        }
    }

    async fn fetch(&self, url: Url) -> Result<FetchOutcome, LexiconError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(FetchOutcome::NotFound);
        }
        if !status.is_success() {
            return Err(LexiconError::UpstreamStatus(status));
        }
        let body = resp.bytes().await?;
        let entries: Vec<ApiEntry> = serde_json::from_slice(&body)?;
        Ok(FetchOutcome::Found(entries))
    }
}

/// Keep ASCII letters, apostrophes and hyphens of the lowercased word.
pub fn clean_word(word: &str) -> String {
    word.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || *c == '\'' || *c == '-')
        .collect()
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn extract_definition(word: &str, entries: Vec<ApiEntry>) -> Option<ApiDefinition> {
    let entry = entries.into_iter().next()?;
    let phonetic = entry
        .phonetics
        .into_iter()
        .filter_map(|p| p.text)
        .find(|text| !text.trim().is_empty());
    let meaning = entry.meanings.into_iter().next()?;
    let sense = meaning.definitions.into_iter().next()?;

    let raw = sense.definition.trim();
    if raw.is_empty() {
        return None;
    }
    let mut definition = kid::normalize_for_kids(raw);
    if definition.is_empty() {
        definition = raw.to_string();
    }
    let example = kid::example_sentence(word, sense.example.as_deref());

    Some(ApiDefinition {
        definition,
        example,
        phonetic,
        part_of_speech: meaning.part_of_speech.filter(|p| !p.is_empty()),
    })
}
