use super::category::Category;
use super::detect::ContentClassifier;
use super::ledger::{Violation, ViolationLedger, WarningLevel};
use super::messages::{guardian_report, violation_message};
use crate::config::FilterConfig;
use crate::db::ViolationStorage;
use crate::error::LexiconError;

use chrono::{TimeDelta, Utc};
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct TrackerSettings {
    pub window: TimeDelta,
    pub report_threshold: usize,
    pub log_capacity: usize,
    pub report_dir: PathBuf,
}

impl From<&FilterConfig> for TrackerSettings {
    fn from(cfg: &FilterConfig) -> Self {
        Self {
            window: TimeDelta::hours(cfg.window_hours.max(1)),
            report_threshold: cfg.report_threshold,
            log_capacity: cfg.log_capacity,
            report_dir: cfg.report_dir.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordOutcome {
    pub violation_count: usize,
    pub should_report: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterStatus {
    pub session_id: String,
    pub violation_count_24h: usize,
    pub warning_level: WarningLevel,
    pub guardian_notification_triggered: bool,
}

/// Warning shown for one blocked word.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViolationNotice {
    pub word: String,
    pub category: Category,
    pub reason: String,
    pub message: String,
    pub violation_count: usize,
    pub should_report: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOutcome {
    pub filtered: Vec<String>,
    pub blocked: Vec<String>,
    pub messages: Vec<ViolationNotice>,
}

/// An uploaded spelling word with its optional sentence and hint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordEntry {
    pub word: String,
    #[serde(default)]
    pub sentence: String,
    #[serde(default)]
    pub hint: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntryFilterOutcome {
    pub accepted: Vec<WordEntry>,
    pub blocked: Vec<String>,
    pub messages: Vec<ViolationNotice>,
}

/// Messages handled by the violation tracker actor.
#[derive(Debug)]
pub enum TrackerMessage {
    /// Record a violation; replies with the session's updated standing.
    Record(Violation, RpcReplyPort<RecordOutcome>),
    /// Current standing of a session.
    Status(String, RpcReplyPort<FilterStatus>),
    /// Violations of a session inside the window, oldest first.
    Recent(String, RpcReplyPort<Vec<Violation>>),
}

/// Handle for interacting with the tracker actor.
#[derive(Clone)]
pub struct TrackerHandle {
    actor: ActorRef<TrackerMessage>,
    classifier: Arc<dyn ContentClassifier>,
}

impl TrackerHandle {
    pub async fn record(
        &self,
        session_id: &str,
        word: &str,
        category: Category,
    ) -> Result<RecordOutcome, LexiconError> {
        let violation = Violation::new(session_id, word, category, Utc::now());
        ractor::call!(self.actor, TrackerMessage::Record, violation)
            .map_err(|e| LexiconError::RactorError(format!("Record RPC failed: {e}")))
    }

    pub async fn status(&self, session_id: &str) -> Result<FilterStatus, LexiconError> {
        ractor::call!(self.actor, TrackerMessage::Status, session_id.to_string())
            .map_err(|e| LexiconError::RactorError(format!("Status RPC failed: {e}")))
    }

    pub async fn recent(&self, session_id: &str) -> Result<Vec<Violation>, LexiconError> {
        ractor::call!(self.actor, TrackerMessage::Recent, session_id.to_string())
            .map_err(|e| LexiconError::RactorError(format!("Recent RPC failed: {e}")))
    }

    /// Split `words` into allowed and blocked, recording each blocked word.
    /// Words are returned exactly as given, including blank ones.
    pub async fn filter_words(
        &self,
        session_id: &str,
        words: Vec<String>,
    ) -> Result<FilterOutcome, LexiconError> {
        let mut outcome = FilterOutcome::default();
        for word in words {
            match self.classifier.classify(&word) {
                Some(detection) => {
                    let notice = self
                        .notice(session_id, &word, detection.category, detection.reason)
                        .await?;
                    outcome.blocked.push(word);
                    outcome.messages.push(notice);
                }
                None => outcome.filtered.push(word),
            }
        }
        Ok(outcome)
    }

    /// Reject entries whose word, sentence or hint is inappropriate.
    pub async fn filter_entries(
        &self,
        session_id: &str,
        entries: Vec<WordEntry>,
    ) -> Result<EntryFilterOutcome, LexiconError> {
        let mut outcome = EntryFilterOutcome::default();
        for mut entry in entries {
            entry.word = entry.word.trim().to_string();
            if entry.word.is_empty() {
                continue;
            }
            let hit = self
                .classifier
                .classify(&entry.word)
                .map(|detection| (entry.word.clone(), detection))
                .or_else(|| self.classifier.scan(&entry.sentence))
                .or_else(|| self.classifier.scan(&entry.hint));

            match hit {
                Some((token, detection)) => {
                    let notice = self
                        .notice(session_id, &token, detection.category, detection.reason)
                        .await?;
                    outcome.blocked.push(entry.word);
                    outcome.messages.push(notice);
                }
                None => outcome.accepted.push(entry),
            }
        }
        Ok(outcome)
    }

    async fn notice(
        &self,
        session_id: &str,
        word: &str,
        category: Category,
        reason: String,
    ) -> Result<ViolationNotice, LexiconError> {
        let recorded = self.record(session_id, word, category).await?;
        Ok(ViolationNotice {
            word: word.to_string(),
            category,
            reason,
            message: violation_message(word, category, recorded.violation_count),
            violation_count: recorded.violation_count,
            should_report: recorded.should_report,
        })
    }
}

pub struct TrackerArgs {
    pub settings: TrackerSettings,
    pub storage: Option<ViolationStorage>,
}

struct TrackerState {
    ledger: ViolationLedger,
    storage: Option<ViolationStorage>,
    settings: TrackerSettings,
}

/// ractor-based violation tracker
struct ViolationTracker;

#[ractor::async_trait]
impl Actor for ViolationTracker {
    type Msg = TrackerMessage;
    type State = TrackerState;
    type Arguments = TrackerArgs;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let TrackerArgs { settings, storage } = args;
        let mut ledger = ViolationLedger::new(settings.window, settings.report_threshold);

        if let Some(storage) = storage.as_ref() {
            let cutoff = Utc::now() - ledger.window();
            let rows = match storage.list_since(cutoff).await {
                Ok(rows) => rows,
                Err(e) => {
                    warn!(error = %e, "failed to load recent violations; starting empty");
                    Vec::new()
                }
            };
            let mut restored = 0usize;
            for row in rows {
                match Violation::try_from(row) {
                    Ok(violation) => {
                        ledger.record(violation);
                        restored += 1;
                    }
                    Err(e) => warn!(error = %e, "skipping unreadable violation row"),
                }
            }
            info!(
                restored,
                sessions = ledger.session_count(),
                "ViolationTracker restored recent violations"
            );
        }

        Ok(TrackerState {
            ledger,
            storage,
            settings,
        })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            TrackerMessage::Record(violation, rp) => {
                let outcome = self.handle_record(state, violation).await;
                let _ = rp.send(outcome);
            }
            TrackerMessage::Status(session_id, rp) => {
                let now = Utc::now();
                let count = state.ledger.count_at(&session_id, now);
                let status = FilterStatus {
                    violation_count_24h: count,
                    warning_level: state.ledger.warning_level_at(&session_id, now),
                    guardian_notification_triggered: state.ledger.should_report_at(&session_id, now),
                    session_id,
                };
                let _ = rp.send(status);
            }
            TrackerMessage::Recent(session_id, rp) => {
                let _ = rp.send(state.ledger.recent_at(&session_id, Utc::now()));
            }
        }
        Ok(())
    }
}

impl ViolationTracker {
    async fn handle_record(&self, state: &mut TrackerState, violation: Violation) -> RecordOutcome {
        let now = Utc::now();
        let session_id = violation.session_id.clone();

        if let Some(storage) = state.storage.as_ref() {
            if let Err(e) = storage.insert(&violation).await {
                warn!(session_id, error = %e, "failed to persist violation");
            } else if let Err(e) = storage.retain_latest(state.settings.log_capacity).await {
                warn!(error = %e, "failed to trim violation log");
            }
        }

        info!(
            session_id,
            word = %violation.word,
            category = %violation.category,
            severity = %violation.severity,
            "content violation recorded"
        );
        state.ledger.record(violation);
        let pruned = state.ledger.prune_at(now);
        if pruned > 0 {
            debug!(pruned, "expired violations pruned");
        }

        let violation_count = state.ledger.count_at(&session_id, now);
        let should_report = state.ledger.should_report_at(&session_id, now);
        let report_path = if should_report {
            let recent = state.ledger.recent_at(&session_id, now);
            let report = guardian_report(&session_id, &recent, now);
            match write_report(&state.settings.report_dir, &session_id, &report).await {
                Ok(path) => {
                    info!(session_id, path = %path.display(), "guardian report generated");
                    Some(path)
                }
                Err(e) => {
                    warn!(session_id, error = %e, "failed to write guardian report");
                    None
                }
            }
        } else {
            None
        };

        RecordOutcome {
            violation_count,
            should_report,
            report_path,
        }
    }
}

async fn write_report(dir: &Path, session_id: &str, report: &str) -> Result<PathBuf, LexiconError> {
    tokio::fs::create_dir_all(dir).await?;
    let safe_session: String = session_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stamp = Utc::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("report_{safe_session}_{stamp}.txt"));
    tokio::fs::write(&path, report).await?;
    Ok(path)
}

/// Spawn the tracker actor and return a handle.
pub async fn spawn(
    settings: TrackerSettings,
    storage: Option<ViolationStorage>,
    classifier: Arc<dyn ContentClassifier>,
) -> Result<TrackerHandle, LexiconError> {
    let (actor, _jh) = Actor::spawn(None, ViolationTracker, TrackerArgs { settings, storage })
        .await
        .map_err(|e| LexiconError::RactorError(format!("failed to spawn ViolationTracker: {e}")))?;
    Ok(TrackerHandle { actor, classifier })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::detect::BlockListClassifier;

    fn settings(report_dir: &Path) -> TrackerSettings {
        TrackerSettings {
            window: TimeDelta::hours(24),
            report_threshold: 3,
            log_capacity: 1000,
            report_dir: report_dir.to_path_buf(),
        }
    }

    async fn tracker(
        report_dir: &Path,
        storage: Option<ViolationStorage>,
    ) -> TrackerHandle {
        spawn(settings(report_dir), storage, Arc::new(BlockListClassifier))
            .await
            .unwrap()
    }

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|w| w.to_string()).collect()
    }

    #[tokio::test]
    async fn filter_words_escalates_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let handle = tracker(dir.path(), None).await;

        let outcome = handle
            .filter_words(
                "test_session_001",
                words(&["apple", "damn", "hello", "sh1t", "education", "kill", "  "]),
            )
            .await
            .unwrap();

        assert_eq!(
            outcome.filtered,
            words(&["apple", "hello", "education", "  "])
        );
        assert_eq!(outcome.blocked, words(&["damn", "sh1t", "kill"]));
        let counts: Vec<usize> = outcome.messages.iter().map(|m| m.violation_count).collect();
        assert_eq!(counts, vec![1, 2, 3]);
        assert!(outcome.messages[0].message.contains("Oops"));
        assert!(outcome.messages[1].message.contains("second attempt"));
        assert!(outcome.messages[2].message.contains("FINAL WARNING"));
        assert!(outcome.messages[2].should_report);

        let reports: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(reports.len(), 1);

        let status = handle.status("test_session_001").await.unwrap();
        assert_eq!(status.violation_count_24h, 3);
        assert_eq!(status.warning_level, WarningLevel::Red);
        assert!(status.guardian_notification_triggered);

        let other = handle.status("someone_else").await.unwrap();
        assert_eq!(other.warning_level, WarningLevel::Green);
    }

    #[tokio::test]
    async fn filter_entries_checks_sentence_and_hint() {
        let dir = tempfile::tempdir().unwrap();
        let handle = tracker(dir.path(), None).await;

        let entries = vec![
            WordEntry {
                word: "apple".into(),
                sentence: "Apples are tasty and healthy.".into(),
                hint: String::new(),
            },
            WordEntry {
                word: "river".into(),
                sentence: "This river is full of shit.".into(),
                hint: String::new(),
            },
            WordEntry {
                word: "chair".into(),
                sentence: "A chair is for sitting.".into(),
                hint: "Don't be a bitch.".into(),
            },
        ];
        let outcome = handle.filter_entries("s-entries", entries).await.unwrap();

        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.accepted[0].word, "apple");
        assert_eq!(outcome.blocked, words(&["river", "chair"]));
        assert_eq!(outcome.messages[0].word, "shit");
        assert_eq!(outcome.messages[1].word, "bitch");

        let recent = handle.recent("s-entries").await.unwrap();
        assert_eq!(recent.len(), 2);
    }

    #[tokio::test]
    async fn violations_persist_and_restore() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ViolationStorage::in_memory().await.unwrap();

        let first = tracker(dir.path(), Some(storage.clone())).await;
        first
            .record("session_x", "nazi", Category::HateSpeech)
            .await
            .unwrap();
        first
            .record("session_x", "damn", Category::Profanity)
            .await
            .unwrap();
        assert_eq!(storage.count().await.unwrap(), 2);

        let second = tracker(dir.path(), Some(storage)).await;
        let status = second.status("session_x").await.unwrap();
        assert_eq!(status.violation_count_24h, 2);
        assert_eq!(status.warning_level, WarningLevel::Yellow);
    }

    #[tokio::test]
    async fn unreadable_rows_do_not_block_startup() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ViolationStorage::in_memory().await.unwrap();
        sqlx::query(
            r#"INSERT INTO violations (session_id, word, category, severity, created_at)
               VALUES ('session_y', 'damn', 'profanity', 'medium', '2025-10-01T12:34:56')"#,
        )
        .execute(storage.pool())
        .await
        .unwrap();
        sqlx::query(
            r#"INSERT INTO violations (session_id, word, category, severity, created_at)
               VALUES ('session_y', 'gloop', 'no_such_category', 'medium', ?)"#,
        )
        .bind(Utc::now().to_rfc3339())
        .execute(storage.pool())
        .await
        .unwrap();
        storage
            .insert(&Violation::new("session_y", "crap", Category::Profanity, Utc::now()))
            .await
            .unwrap();

        let handle = spawn(settings(dir.path()), Some(storage), Arc::new(BlockListClassifier))
            .await
            .expect("tracker should start despite bad rows");
        let status = handle.status("session_y").await.unwrap();
        assert_eq!(status.violation_count_24h, 1);
    }

    #[tokio::test]
    async fn missing_table_starts_with_empty_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ViolationStorage::in_memory().await.unwrap();
        sqlx::query("DROP TABLE violations")
            .execute(storage.pool())
            .await
            .unwrap();

        let handle = tracker(dir.path(), Some(storage)).await;
        let outcome = handle
            .record("session_z", "damn", Category::Profanity)
            .await
            .unwrap();
        assert_eq!(outcome.violation_count, 1);
    }
}
