//! Database module: persistent violation log.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and conversions
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: storage operations

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::DbViolation;
pub use schema::SQLITE_INIT;
pub use sqlite::{SqlitePool, ViolationStorage};
