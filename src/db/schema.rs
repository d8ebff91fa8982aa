//! SQL DDL for initializing the violation log.

/// SQLite schema with:
/// - `id` INTEGER PRIMARY KEY AUTOINCREMENT, also the retention order
/// - `category` / `severity` stored as their snake_case names
/// - `created_at` RFC3339 text
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS violations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL,
    word TEXT NOT NULL,
    category TEXT NOT NULL,
    severity TEXT NOT NULL,
    created_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_violations_session ON violations(session_id, created_at);
"#;
