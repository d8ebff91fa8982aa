use crate::error::LexiconError;
use chrono::{DateTime, NaiveDateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub definition: String,
    pub example: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
    #[serde(default, rename = "pos", skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created: Option<DateTime<Utc>>,
}

/// RFC 3339, or a naive ISO timestamp taken as UTC; anything else is `None`.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(Value::as_str).and_then(parse_timestamp))
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Definitions fetched from the remote API, persisted as one JSON object
/// keyed by lowercased word.
#[derive(Debug)]
pub struct DefinitionCache {
    path: PathBuf,
    entries: RwLock<HashMap<String, CacheEntry>>,
    // Serializes file writes; the map lock is never held across an await.
    write_lock: Mutex<()>,
}

impl DefinitionCache {
    /// Open the cache file, starting empty when it does not exist yet.
    ///
    /// Entries that fail to decode are skipped; only a file that is not a JSON
    /// object at all is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LexiconError> {
        let path = path.into();
        let raw: HashMap<String, Value> = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            if contents.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&contents)?
            }
        } else {
            HashMap::new()
        };

        let mut entries = HashMap::with_capacity(raw.len());
        for (word, value) in raw {
            match serde_json::from_value::<CacheEntry>(value) {
                Ok(entry) if !entry.definition.trim().is_empty() => {
                    entries.insert(word.to_lowercase(), entry);
                }
                Ok(_) => {}
                Err(e) => warn!(word, error = %e, "skipping unreadable cache entry"),
            }
        }
        info!(path = %path.display(), count = entries.len(), "definition cache opened");
        Ok(Self::with_entries(path, entries))
    }

    /// Like [`DefinitionCache::open`], but an unreadable file is moved aside
    /// to `<name>.bak` and the cache starts empty, so it is never overwritten.
    pub fn open_or_recover(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::open(&path) {
            Ok(cache) => cache,
            Err(e) => {
                let backup = backup_path(&path);
                match std::fs::rename(&path, &backup) {
                    Ok(()) => warn!(
                        path = %path.display(),
                        backup = %backup.display(),
                        error = %e,
                        "definition cache unreadable; moved aside and starting empty"
                    ),
                    Err(rename_err) => warn!(
                        path = %path.display(),
                        error = %e,
                        rename_error = %rename_err,
                        "definition cache unreadable and could not be moved aside"
                    ),
                }
                Self::empty(path)
            }
        }
    }

    /// An empty cache that will be written to `path` on first insert.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self::with_entries(path.into(), HashMap::new())
    }

    fn with_entries(path: PathBuf, entries: HashMap<String, CacheEntry>) -> Self {
        Self {
            path,
            entries: RwLock::new(entries),
            write_lock: Mutex::new(()),
        }
    }

    pub fn get(&self, word: &str) -> Option<CacheEntry> {
        self.entries.read().get(&word.to_lowercase()).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Insert in memory, then rewrite the cache file.
    pub async fn insert(&self, word: &str, entry: CacheEntry) -> Result<(), LexiconError> {
        self.entries.write().insert(word.to_lowercase(), entry);
        self.persist().await
    }

    async fn persist(&self) -> Result<(), LexiconError> {
        let _guard = self.write_lock.lock().await;
        let payload = {
            let entries = self.entries.read();
            let sorted: BTreeMap<&String, &CacheEntry> = entries.iter().collect();
            serde_json::to_vec_pretty(&sorted)?
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &payload).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), bytes = payload.len(), "definition cache written");
        Ok(())
    }
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".bak");
    path.with_file_name(name)
}
