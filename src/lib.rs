pub mod config;
pub mod db;
pub mod dictionary;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use dictionary::{DictionaryResolver, WordInfo};
pub use error::LexiconError;
pub use filter::TrackerHandle;
