use crate::error::LexiconError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub definition: String,
    /// First example sentence that actually uses the word.
    pub example: Option<String>,
    pub part_of_speech: Option<String>,
}

/// In-memory dictionary keyed by lowercased word.
#[derive(Debug, Default)]
pub struct Lexicon {
    entries: HashMap<String, LexiconEntry>,
}

/// One line of the Simple English Wiktionary JSONL dump.
#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    word: String,
    #[serde(default)]
    pos: String,
    #[serde(default)]
    senses: Vec<RawSense>,
}

#[derive(Debug, Deserialize)]
struct RawSense {
    #[serde(default)]
    glosses: Vec<String>,
    #[serde(default)]
    examples: Vec<Value>,
}

impl Lexicon {
    /// Load a JSONL dump. A missing file yields an empty lexicon.
    pub fn load(path: &Path) -> Result<Self, LexiconError> {
        if !path.exists() {
            info!(path = %path.display(), "lexicon file not found; skipping load");
            return Ok(Self::default());
        }
        let file = File::open(path)?;
        let lexicon = Self::from_reader(BufReader::new(file));
        info!(path = %path.display(), count = lexicon.len(), "lexicon loaded");
        Ok(lexicon)
    }

    /// Parse JSONL lines, keeping the first usable definition per word.
    pub fn from_reader<R: BufRead>(reader: R) -> Self {
        let mut entries = HashMap::new();
        let mut skipped = 0usize;

        for (line_no, line) in reader.lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!(line = line_no + 1, error = %e, "failed to read lexicon line");
                    skipped += 1;
                    continue;
                }
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Ok(raw) = serde_json::from_str::<RawEntry>(line) else {
                skipped += 1;
                continue;
            };
            let word = raw.word.trim().to_lowercase();
            if word.is_empty() {
                skipped += 1;
                continue;
            }
            if entries.contains_key(&word) {
                continue;
            }
            let Some(entry) = raw.into_entry(&word) else {
                skipped += 1;
                continue;
            };
            entries.insert(word, entry);
            if entries.len() % 10_000 == 0 {
                debug!(count = entries.len(), "lexicon load progress");
            }
        }

        if skipped > 0 {
            debug!(skipped, "lexicon entries skipped (no definition or malformed)");
        }
        Self { entries }
    }

    pub fn get(&self, word: &str) -> Option<&LexiconEntry> {
        self.entries.get(word)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, LexiconEntry)> for Lexicon {
    fn from_iter<I: IntoIterator<Item = (String, LexiconEntry)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(word, entry)| (word.to_lowercase(), entry))
                .collect(),
        }
    }
}

impl RawEntry {
    fn into_entry(self, word: &str) -> Option<LexiconEntry> {
        let first = self.senses.into_iter().next()?;
        let definition = first.glosses.first()?.trim().to_string();
        if definition.is_empty() {
            return None;
        }
        let example = first
            .examples
            .iter()
            .filter_map(|ex| ex.get("text").and_then(Value::as_str))
            .map(str::trim)
            .find(|text| !text.is_empty() && text.to_lowercase().contains(word))
            .map(str::to_string);
        let pos = self.pos.trim();
        Some(LexiconEntry {
            definition,
            example,
            part_of_speech: (!pos.is_empty()).then(|| pos.to_string()),
        })
    }
}

/// Shared slot filled once the background load finishes.
#[derive(Debug, Clone, Default)]
pub struct LexiconSlot(Arc<OnceLock<Lexicon>>);

impl LexiconSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot that is already filled.
    pub fn ready(lexicon: Lexicon) -> Self {
        let slot = Self::default();
        slot.install(lexicon);
        slot
    }

    pub fn get(&self) -> Option<&Lexicon> {
        self.0.get()
    }

    pub fn is_loaded(&self) -> bool {
        self.0.get().is_some()
    }

    /// Returns false if a lexicon was already installed.
    pub fn install(&self, lexicon: Lexicon) -> bool {
        self.0.set(lexicon).is_ok()
    }

    /// Load the dump on the blocking pool so startup is not held up.
    pub fn spawn_load(&self, path: PathBuf) -> JoinHandle<()> {
        let slot = self.clone();
        tokio::task::spawn_blocking(move || match Lexicon::load(&path) {
            Ok(lexicon) => {
                if !slot.install(lexicon) {
                    warn!(path = %path.display(), "lexicon already installed; discarding reload");
                }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load lexicon");
            }
        })
    }
}
