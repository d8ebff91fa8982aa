use crate::db::models::DbViolation;
use crate::db::schema::SQLITE_INIT;
use crate::error::LexiconError;
use crate::filter::ledger::Violation;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use tracing::warn;

pub type SqlitePool = Pool<Sqlite>;

#[derive(Clone)]
pub struct ViolationStorage {
    pool: SqlitePool,
}

impl ViolationStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect (creating the database file if needed) and initialize the schema.
    pub async fn connect(database_url: &str) -> Result<Self, LexiconError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        if let Some(parent) = connect_opts.get_filename().parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
        let storage = Self::new(pool);
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Single-connection in-memory database, mostly for tests.
    pub async fn in_memory() -> Result<Self, LexiconError> {
        let connect_opts = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_opts)
            .await?;
        let storage = Self::new(pool);
        storage.init_schema().await?;
        Ok(storage)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), LexiconError> {
        // sqlx::query runs one statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Append a violation. Returns the row id.
    pub async fn insert(&self, violation: &Violation) -> Result<i64, LexiconError> {
        let row = DbViolation::from(violation);
        let result = sqlx::query(
            r#"INSERT INTO violations (session_id, word, category, severity, created_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(row.session_id)
        .bind(row.word)
        .bind(row.category)
        .bind(row.severity)
        .bind(row.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Keep only the newest `capacity` rows. Returns the number deleted.
    pub async fn retain_latest(&self, capacity: usize) -> Result<u64, LexiconError> {
        let capacity = i64::try_from(capacity).unwrap_or(i64::MAX);
        let result = sqlx::query(
            r#"DELETE FROM violations WHERE id NOT IN (
                   SELECT id FROM violations ORDER BY id DESC LIMIT ?
               )"#,
        )
        .bind(capacity)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn count(&self) -> Result<i64, LexiconError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM violations")
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }

    /// Every violation newer than `cutoff`, oldest first. Rows that cannot be
    /// decoded are skipped.
    pub async fn list_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<DbViolation>, LexiconError> {
        let rows = sqlx::query(
            r#"SELECT id, session_id, word, category, severity, created_at
               FROM violations ORDER BY id"#,
        )
        .fetch_all(&self.pool)
        .await?;
        // RFC3339 offsets vary, so the cutoff is applied after parsing.
        Ok(rows
            .into_iter()
            .filter_map(|row| match Self::row_to_model(row) {
                Ok(model) => Some(model),
                Err(e) => {
                    warn!(error = %e, "skipping undecodable violation row");
                    None
                }
            })
            .filter(|row| row.created_at > cutoff)
            .collect())
    }

    fn row_to_model(row: SqliteRow) -> Result<DbViolation, LexiconError> {
        let id: i64 = row.try_get("id")?;
        let session_id: String = row.try_get("session_id")?;
        let word: String = row.try_get("word")?;
        let category: String = row.try_get("category")?;
        let severity: String = row.try_get("severity")?;
        let created_str: String = row.try_get("created_at")?;

        let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
            .with_timezone(&Utc);

        Ok(DbViolation {
            id,
            session_id,
            word,
            category,
            severity,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::category::{Category, Severity};
    use chrono::TimeDelta;

    fn epoch() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH
    }

    #[tokio::test]
    async fn insert_and_read_back() {
        let storage = ViolationStorage::in_memory().await.unwrap();
        let now = Utc::now();
        storage
            .insert(&Violation::new("s1", "damn", Category::Profanity, now))
            .await
            .unwrap();
        storage
            .insert(&Violation::new("s2", "nazi", Category::HateSpeech, now))
            .await
            .unwrap();

        let rows = storage.list_since(epoch()).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].session_id, "s2");
        let violation = Violation::try_from(rows[1].clone()).unwrap();
        assert_eq!(violation.category, Category::HateSpeech);
        assert_eq!(violation.severity, Severity::High);
        assert_eq!(violation.timestamp.timestamp(), now.timestamp());
    }

    #[tokio::test]
    async fn retain_latest_trims_oldest_rows() {
        let storage = ViolationStorage::in_memory().await.unwrap();
        let now = Utc::now();
        for i in 0..5 {
            storage
                .insert(&Violation::new("s1", format!("w{i}"), Category::SpamPatterns, now))
                .await
                .unwrap();
        }
        assert_eq!(storage.retain_latest(3).await.unwrap(), 2);
        assert_eq!(storage.count().await.unwrap(), 3);

        let words: Vec<String> = storage
            .list_since(epoch())
            .await
            .unwrap()
            .into_iter()
            .map(|row| row.word)
            .collect();
        assert_eq!(words, vec!["w2", "w3", "w4"]);
    }

    #[tokio::test]
    async fn list_since_applies_cutoff() {
        let storage = ViolationStorage::in_memory().await.unwrap();
        let now = Utc::now();
        storage
            .insert(&Violation::new(
                "s1",
                "old",
                Category::Profanity,
                now - TimeDelta::hours(30),
            ))
            .await
            .unwrap();
        storage
            .insert(&Violation::new("s1", "new", Category::Profanity, now))
            .await
            .unwrap();

        let rows = storage.list_since(now - TimeDelta::hours(24)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].word, "new");
    }

    #[tokio::test]
    async fn list_since_skips_undecodable_rows() {
        let storage = ViolationStorage::in_memory().await.unwrap();
        sqlx::query(
            r#"INSERT INTO violations (session_id, word, category, severity, created_at)
               VALUES ('s1', 'damn', 'profanity', 'medium', '2025-10-01T12:34:56')"#,
        )
        .execute(storage.pool())
        .await
        .unwrap();
        storage
            .insert(&Violation::new("s1", "crap", Category::Profanity, Utc::now()))
            .await
            .unwrap();

        let rows = storage.list_since(epoch()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].word, "crap");
    }
}
