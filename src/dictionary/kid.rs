//! Kid-friendly wording for definitions and fill-in-the-blank examples.

use regex::Regex;
use std::sync::LazyLock;

pub const BLANK: &str = "_____";

/// Longest API example (in chars) still used as a quiz sentence.
const MAX_EXAMPLE_CHARS: usize = 100;

static KID_REPLACEMENTS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (
            r"(?i)\b(noun|verb|adjective|adverb|pronoun|preposition|conjunction|interjection)\b",
            "",
        ),
        (r"(?i)\b(etymology|etymology from)\b.*?\.", ""),
        (r"(?i)\barchaic\b", "old-fashioned"),
        (r"(?i)\bformal\b", ""),
        (r"(?i)\binformal\b", ""),
        (r"(?i)\btechnical\b", ""),
        (r"(?i)\bliterary\b", "in stories"),
        (r"(?i)\bcolloq\w*\b", ""),
        (r"(?i)\bslang\b", "casual word"),
        (r"(?i)\beuphemism\b", "nice way to say"),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| Regex::new(pattern).ok().map(|re| (re, replacement)))
    .collect()
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

static QUOTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[\"\u{201C}\u{201D}]").expect("quote pattern is valid"));

/// Strip grammar jargon and register labels, then tidy the sentence.
pub fn normalize_for_kids(definition: &str) -> String {
    let mut result = definition.to_string();
    for (re, replacement) in KID_REPLACEMENTS.iter() {
        result = re.replace_all(&result, *replacement).into_owned();
    }
    let result = WHITESPACE.replace_all(&result, " ");
    let result = result
        .trim()
        .trim_end_matches(['.', ',', ';', ':'])
        .trim_end();
    capitalize_first(result)
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Build a quiz sentence with the word blanked out.
///
/// A short source example that contains the word is preferred; otherwise a
/// template sentence is picked from the word's suffix.
pub fn example_sentence(word: &str, source_example: Option<&str>) -> String {
    let word = word.trim();
    let word_lower = word.to_lowercase();
    if let Some(blanked) = source_example.and_then(|ex| blank_out(word, &word_lower, ex)) {
        return blanked;
    }
    pattern_sentence(&word_lower).to_string()
}

fn blank_out(word: &str, word_lower: &str, example: &str) -> Option<String> {
    if word.is_empty() {
        return None;
    }
    let clean = QUOTES.replace_all(example, "");
    let clean = clean.trim();
    if clean.chars().count() >= MAX_EXAMPLE_CHARS || !clean.to_lowercase().contains(word_lower) {
        return None;
    }
    let re = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(word))).ok()?;
    let blanked = re.replace_all(clean, BLANK);
    blanked.contains(BLANK).then(|| blanked.into_owned())
}

/// Template sentence chosen by suffix.
pub fn pattern_sentence(word_lower: &str) -> &'static str {
    if word_lower.ends_with("ing") {
        "The children are _____ at the playground"
    } else if word_lower.ends_with("ed") {
        "Yesterday, she _____ her homework carefully"
    } else if word_lower.ends_with("ly") {
        "The student worked very _____ on the project"
    } else if word_lower.ends_with("tion") || word_lower.ends_with("sion") {
        "The _____ was announced at the school assembly"
    } else if word_lower.ends_with("able") || word_lower.ends_with("ible") {
        "The puzzle was _____ for the smart student"
    } else {
        "The teacher explained what _____ means to the class"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_jargon_and_tidies() {
        assert_eq!(
            normalize_for_kids("noun   an archaic word for a  castle."),
            "An old-fashioned word for a castle"
        );
        assert_eq!(
            normalize_for_kids("(slang) a friend;"),
            "(casual word) a friend"
        );
        assert_eq!(normalize_for_kids("formal"), "");
    }

    #[test]
    fn removes_etymology_clause() {
        assert_eq!(
            normalize_for_kids("Etymology from Latin. A large boat"),
            "A large boat"
        );
    }

    #[test]
    fn blanks_word_in_short_example() {
        assert_eq!(
            example_sentence("Apple", Some("\u{201C}An apple a day keeps the doctor away.\u{201D}")),
            "An _____ a day keeps the doctor away."
        );
        assert_eq!(
            example_sentence("run", Some("Run, run as fast as you can")),
            "_____, _____ as fast as you can"
        );
    }

    #[test]
    fn falls_back_to_suffix_template() {
        // Word appears only inside another word, so no whole-word blank.
        assert_eq!(
            example_sentence("run", Some("The runner was tired")),
            "The teacher explained what _____ means to the class"
        );
        let long = format!("jumping {}", "x".repeat(120));
        assert_eq!(
            example_sentence("jumping", Some(&long)),
            "The children are _____ at the playground"
        );
        assert_eq!(
            example_sentence("station", None),
            "The _____ was announced at the school assembly"
        );
        assert_eq!(
            example_sentence("visible", None),
            "The puzzle was _____ for the smart student"
        );
        assert_eq!(
            example_sentence("quickly", None),
            "The student worked very _____ on the project"
        );
        assert_eq!(
            example_sentence("walked", None),
            "Yesterday, she _____ her homework carefully"
        );
    }
}
