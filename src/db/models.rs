use crate::error::LexiconError;
use crate::filter::ledger::Violation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DbViolation {
    pub id: i64,
    pub session_id: String,
    pub word: String,
    pub category: String,
    pub severity: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Violation> for DbViolation {
    fn from(v: &Violation) -> Self {
        Self {
            id: 0,
            session_id: v.session_id.clone(),
            word: v.word.clone(),
            category: v.category.as_str().to_string(),
            severity: v.severity.as_str().to_string(),
            created_at: v.timestamp,
        }
    }
}

impl TryFrom<DbViolation> for Violation {
    type Error = LexiconError;

    fn try_from(d: DbViolation) -> Result<Self, Self::Error> {
        Ok(Violation {
            session_id: d.session_id,
            word: d.word,
            category: d.category.parse()?,
            severity: d.severity.parse()?,
            timestamp: d.created_at,
        })
    }
}
