//! Content filtering for uploaded spelling words.
//!
//! Layout:
//! - `category.rs`: categorized block-lists and severities
//! - `detect.rs`: exact, substring, leetspeak and spam detection
//! - `ledger.rs`: per-session sliding-window violation history
//! - `messages.rs`: progressive warnings and guardian reports
//! - `tracker.rs`: actor that records violations and files reports

pub mod category;
pub mod detect;
pub mod ledger;
pub mod messages;
pub mod tracker;

pub use category::{Category, Severity};
pub use detect::{BlockListClassifier, ContentClassifier, Detection, detect, scan_text};
pub use ledger::{Violation, ViolationLedger, WarningLevel};
pub use tracker::{
    EntryFilterOutcome, FilterOutcome, FilterStatus, RecordOutcome, TrackerHandle,
    TrackerSettings, ViolationNotice, WordEntry,
};
