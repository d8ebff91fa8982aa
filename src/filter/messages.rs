//! Progressive warnings shown to the child and the guardian report text.

use super::category::Category;
use super::ledger::Violation;
use chrono::{DateTime, Utc};
use std::fmt::Write;

const REPORT_STAMP: &str = "%B %d, %Y at %I:%M %p UTC";

/// Warning for the `count`-th violation in the current window.
pub fn violation_message(word: &str, category: Category, count: usize) -> String {
    let explanation = category.explanation();
    match count {
        0 | 1 => format!(
            "🐝 Oops! Our bee scouts noticed that \"{word}\" {explanation}.\n\n\
             📚 BeeSmart is a safe learning space for kids! Let's choose educational words \
             that help everyone learn and have fun.\n\n\
             💡 Try using words from school subjects like science, nature, or your favorite \
             books instead!"
        ),
        2 => format!(
            "🚨 Warning from the Queen Bee!\n\n\
             This is your second attempt to use inappropriate content (\"{word}\" {explanation}).\n\n\
             📖 BeeSmart is designed to be a safe, educational space for young learners. \
             Continued attempts to use inappropriate words may result in a report being sent \
             to your parent or guardian.\n\n\
             🌟 Let's focus on learning awesome vocabulary words that will help you become a \
             spelling champion!"
        ),
        _ => format!(
            "🚫 FINAL WARNING from the Hive!\n\n\
             You have repeatedly tried to use inappropriate words (\"{word}\" {explanation}).\n\n\
             📧 A report about these attempts has been sent to your parent or guardian.\n\n\
             🐝 BeeSmart is committed to providing a safe, educational environment. Please use \
             appropriate vocabulary words for learning.\n\n\
             ⭐ Let's get back to learning amazing words that will make you a better speller!"
        ),
    }
}

/// Plain-text notification for a parent or guardian.
pub fn guardian_report(session_id: &str, violations: &[Violation], now: DateTime<Utc>) -> String {
    let stamp = now.format(REPORT_STAMP);
    let mut report = format!(
        "🐝 BeeSmart Spelling Bee - Guardian Notification Report\n\n\
         📅 Date: {stamp}\n\
         👤 Session ID: {session_id}\n\
         🚨 Violation Count: {count}\n\n\
         📋 INCIDENT SUMMARY:\n\
         Your child attempted to use inappropriate content multiple times while using the \
         BeeSmart Spelling Bee educational app. Our content filter blocked these attempts to \
         keep the learning environment safe.\n\n\
         📝 VIOLATION DETAILS:\n",
        count = violations.len(),
    );

    for (i, violation) in violations.iter().enumerate() {
        // Writing into a String cannot fail.
        let _ = write!(
            report,
            "\n{n}. Time: {time}\n   Word Attempted: \"{word}\"\n   Issue: {issue}\n   Severity: {severity}\n",
            n = i + 1,
            time = violation.timestamp.format("%I:%M %p UTC"),
            word = violation.word,
            issue = title_case(&violation.category.label()),
            severity = violation.severity,
        );
    }

    let _ = write!(
        report,
        "\n\n🛡️ SAFETY MEASURES TAKEN:\n\
         • All inappropriate content was automatically blocked\n\
         • No inappropriate words were added to spelling lists\n\
         • Progressive warnings were displayed to encourage better choices\n\n\
         💡 RECOMMENDATIONS:\n\
         • Discuss appropriate online behavior and language with your child\n\
         • Encourage focus on educational vocabulary from school subjects\n\
         • Consider supervised usage if inappropriate attempts continue\n\n\
         ---\n\
         This is an automated safety report from BeeSmart Spelling Bee\n\
         Generated: {stamp}\n"
    );
    report
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
