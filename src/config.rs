use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::LazyLock;
use url::Url;

/// Process-wide configuration, resolved once on first access.
pub static CONFIG: LazyLock<Config> =
    LazyLock::new(|| Config::load().expect("FATAL: invalid beesmart configuration"));

pub const DEFAULT_DICTIONARY_API: &str = "https://api.dictionaryapi.dev/api/v2/entries/en/";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub loglevel: String,
    pub listen_addr: String,
    /// Key required for administrative endpoints (breaker reset).
    pub admin_key: String,
    pub database_url: String,
    pub proxy: Option<Url>,
    pub dictionary: DictionaryConfig,
    pub filter: FilterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictionaryConfig {
    pub api_base_url: Url,
    pub user_agent: String,
    pub requests_per_second: u32,
    pub breaker_threshold: u32,
    pub breaker_cooldown_secs: u64,
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
    /// Extra attempts for transient network errors; 0 disables retrying.
    pub retry_times: usize,
    pub lexicon_path: PathBuf,
    pub cache_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub window_hours: i64,
    pub report_threshold: usize,
    /// Number of violation rows retained in the persistent log.
    pub log_capacity: usize,
    pub report_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            loglevel: "info".to_string(),
            listen_addr: "0.0.0.0:8000".to_string(),
            admin_key: "beesmart".to_string(),
            database_url: "sqlite:data/beesmart.db".to_string(),
            proxy: None,
            dictionary: DictionaryConfig::default(),
            filter: FilterConfig::default(),
        }
    }
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            api_base_url: Url::parse(DEFAULT_DICTIONARY_API)
                .expect("default dictionary API url is valid"),
            user_agent: "BeeSmart-Spelling-App/1.6".to_string(),
            requests_per_second: 2,
            breaker_threshold: 5,
            breaker_cooldown_secs: 300,
            connect_timeout_secs: 5,
            timeout_secs: 10,
            retry_times: 1,
            lexicon_path: PathBuf::from("data/simple-wiktionary.jsonl"),
            cache_path: PathBuf::from("data/dictionary.json"),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            window_hours: 24,
            report_threshold: 3,
            log_capacity: 1000,
            report_dir: PathBuf::from("data/guardian_reports"),
        }
    }
}

impl Config {
    /// Defaults, then `beesmart.toml`, then `BEESMART_*` env vars (`__` for nesting).
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("beesmart.toml"))
            .merge(Env::prefixed("BEESMART_").split("__"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dictionary_policy() {
        let cfg = Config::default();
        assert_eq!(cfg.dictionary.breaker_threshold, 5);
        assert_eq!(cfg.dictionary.breaker_cooldown_secs, 300);
        assert_eq!(cfg.dictionary.requests_per_second, 2);
        assert_eq!(cfg.filter.window_hours, 24);
        assert_eq!(cfg.filter.report_threshold, 3);
        assert!(cfg.dictionary.api_base_url.path().ends_with('/'));
    }

    #[test]
    fn env_overrides_nested_keys() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("BEESMART_LOGLEVEL", "debug");
            jail.set_env("BEESMART_DICTIONARY__BREAKER_THRESHOLD", "7");
            jail.set_env("BEESMART_FILTER__REPORT_THRESHOLD", "4");

            let cfg: Config = Config::figment().extract()?;
            assert_eq!(cfg.loglevel, "debug");
            assert_eq!(cfg.dictionary.breaker_threshold, 7);
            assert_eq!(cfg.filter.report_threshold, 4);
            Ok(())
        });
    }

    #[test]
    fn toml_file_is_merged_under_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "beesmart.toml",
                r#"
                listen_addr = "127.0.0.1:9000"
                [dictionary]
                requests_per_second = 10
                "#,
            )?;
            jail.set_env("BEESMART_DICTIONARY__REQUESTS_PER_SECOND", "3");

            let cfg: Config = Config::figment().extract()?;
            assert_eq!(cfg.listen_addr, "127.0.0.1:9000");
            assert_eq!(cfg.dictionary.requests_per_second, 3);
            Ok(())
        });
    }
}
