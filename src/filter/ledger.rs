use super::category::{Category, Severity};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub session_id: String,
    pub word: String,
    pub category: Category,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
}

impl Violation {
    pub fn new(
        session_id: impl Into<String>,
        word: impl Into<String>,
        category: Category,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            word: word.into(),
            category,
            severity: category.severity(),
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningLevel {
    Green,
    Yellow,
    Red,
}

impl WarningLevel {
    pub fn from_count(count: usize, report_threshold: usize) -> Self {
        match count {
            0 => WarningLevel::Green,
            n if n < report_threshold => WarningLevel::Yellow,
            _ => WarningLevel::Red,
        }
    }
}

/// Per-session violation history with a sliding time window.
///
/// Pure bookkeeping; the caller supplies `now` so window behavior is testable.
#[derive(Debug)]
pub struct ViolationLedger {
    sessions: HashMap<String, Vec<Violation>>,
    window: TimeDelta,
    report_threshold: usize,
}

impl ViolationLedger {
    pub fn new(window: TimeDelta, report_threshold: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            window,
            report_threshold: report_threshold.max(1),
        }
    }

    pub fn window(&self) -> TimeDelta {
        self.window
    }

    pub fn record(&mut self, violation: Violation) {
        self.sessions
            .entry(violation.session_id.clone())
            .or_default()
            .push(violation);
    }

    /// Violations strictly newer than `now - window`.
    pub fn recent_at(&self, session_id: &str, now: DateTime<Utc>) -> Vec<Violation> {
        let cutoff = now - self.window;
        self.sessions
            .get(session_id)
            .map(|items| {
                items
                    .iter()
                    .filter(|v| v.timestamp > cutoff)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn count_at(&self, session_id: &str, now: DateTime<Utc>) -> usize {
        let cutoff = now - self.window;
        self.sessions.get(session_id).map_or(0, |items| {
            items.iter().filter(|v| v.timestamp > cutoff).count()
        })
    }

    pub fn should_report_at(&self, session_id: &str, now: DateTime<Utc>) -> bool {
        self.count_at(session_id, now) >= self.report_threshold
    }

    pub fn warning_level_at(&self, session_id: &str, now: DateTime<Utc>) -> WarningLevel {
        WarningLevel::from_count(self.count_at(session_id, now), self.report_threshold)
    }

    /// Drop expired violations and sessions left empty. Returns how many
    /// violations were removed.
    pub fn prune_at(&mut self, now: DateTime<Utc>) -> usize {
        let cutoff = now - self.window;
        let mut removed = 0;
        self.sessions.retain(|_, items| {
            let before = items.len();
            items.retain(|v| v.timestamp > cutoff);
            removed += before - items.len();
            !items.is_empty()
        });
        removed
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
