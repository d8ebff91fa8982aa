//! Synthetic definitions for words no dictionary layer knows.

use super::{Source, WordInfo, kid};

/// Suffix hints, checked in order; longer suffixes come before their tails.
const SUFFIX_HINTS: &[(&str, &str)] = &[
    (
        "ing",
        "An action word ending in -ing that tells what someone is doing right now",
    ),
    (
        "tion",
        "A naming word ending in -tion for an action or an idea",
    ),
    (
        "sion",
        "A naming word ending in -sion for an action or an idea",
    ),
    (
        "able",
        "A describing word ending in -able that means something can be done",
    ),
    (
        "ible",
        "A describing word ending in -ible that means something can be done",
    ),
    (
        "ness",
        "A naming word ending in -ness for a feeling or a way of being",
    ),
    (
        "ment",
        "A naming word ending in -ment for an action or its result",
    ),
    ("ful", "A describing word ending in -ful that means full of something"),
    ("less", "A describing word ending in -less that means without something"),
    ("ly", "A word ending in -ly that tells how something is done"),
    ("ed", "An action word ending in -ed that tells what already happened"),
    ("est", "A describing word ending in -est that means the most"),
    ("er", "A word ending in -er that can name a person who does something or mean more"),
];

const GENERIC_PROMPT: &str = "A spelling word to practice. Listen carefully and spell it letter by letter";

/// Definition text from suffix heuristics; never empty.
pub fn synthetic_definition(word: &str) -> String {
    let lower = word.trim().to_lowercase();
    let letters = lower.chars().filter(|c| c.is_alphabetic()).count();
    SUFFIX_HINTS
        .iter()
        .find(|(suffix, _)| lower.len() > suffix.len() && lower.ends_with(suffix))
        .map(|(_, hint)| hint.to_string())
        .unwrap_or_else(|| match letters {
            0 => GENERIC_PROMPT.to_string(),
            n => format!("{GENERIC_PROMPT}. It has {n} letters"),
        })
}

/// Full fallback record for `word`.
pub fn synthesize(word: &str) -> WordInfo {
    let word = word.trim();
    WordInfo {
        word: word.to_string(),
        definition: synthetic_definition(word),
        example: kid::pattern_sentence(&word.to_lowercase()).to_string(),
        source: Source::Fallback,
        phonetic: None,
        part_of_speech: None,
    }
}
