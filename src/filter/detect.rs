use super::category::Category;
use serde::Serialize;

/// Block terms longer than this are also matched as substrings.
const SUBSTRING_MIN_LEN: usize = 5;
/// A character repeated this many times in a row is spam.
const REPEAT_RUN: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detection {
    pub category: Category,
    pub reason: String,
}

/// Decides whether a word or phrase is unsuitable for the spelling bee.
pub trait ContentClassifier: Send + Sync {
    /// Classify a single candidate word.
    fn classify(&self, word: &str) -> Option<Detection>;

    /// Classify free text such as example sentences and hints, returning the
    /// offending token.
    fn scan(&self, text: &str) -> Option<(String, Detection)>;
}

/// Classifier backed by the built-in categorized block-lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockListClassifier;

impl ContentClassifier for BlockListClassifier {
    fn classify(&self, word: &str) -> Option<Detection> {
        detect(word)
    }

    fn scan(&self, text: &str) -> Option<(String, Detection)> {
        scan_text(text)
    }
}

/// Classify one candidate word, including the spam heuristics.
pub fn detect(word: &str) -> Option<Detection> {
    classify_token(&word.trim().to_lowercase(), true)
}

/// Classify free text token by token.
///
/// The spam heuristics (repeated characters, mixed digits and letters) are
/// skipped here so ordinary sentences like "Chapter 10b" are not flagged.
pub fn scan_text(text: &str) -> Option<(String, Detection)> {
    tokens(text).find_map(|token| {
        classify_token(&token.to_lowercase(), false).map(|detection| (token.to_string(), detection))
    })
}

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_alphanumeric() || matches!(c, '\'' | '-' | '@' | '$' | '*' | '#')))
        .map(|token| token.trim_matches(|c| matches!(c, '\'' | '-')))
        .filter(|token| !token.is_empty())
}

fn classify_token(word: &str, spam_heuristics: bool) -> Option<Detection> {
    if word.is_empty() {
        return None;
    }

    if let Some(category) = Category::ALL.into_iter().find(|c| c.contains(word)) {
        return Some(contains(category));
    }

    let substring_hit = Category::ALL.into_iter().find(|c| {
        c.terms()
            .iter()
            .any(|term| term.len() >= SUBSTRING_MIN_LEN && word.contains(term))
    });
    if let Some(category) = substring_hit {
        return Some(contains(category));
    }

    let converted = normalize_leetspeak(word);
    if let Some(category) = Category::ALL.into_iter().find(|c| c.contains(&converted)) {
        return Some(Detection {
            category,
            reason: format!("uses inappropriate characters to spell {}", category.label()),
        });
    }

    if !spam_heuristics {
        return None;
    }

    if has_repeated_run(word, REPEAT_RUN) {
        return Some(Detection {
            category: Category::SpamPatterns,
            reason: "uses excessive repeated characters".to_string(),
        });
    }

    let has_digit = word.chars().any(|c| c.is_ascii_digit());
    let has_letter = word.chars().any(|c| c.is_ascii_lowercase());
    if has_digit && has_letter && word.chars().count() > 3 {
        return Some(Detection {
            category: Category::SpamPatterns,
            reason: "mixes numbers and letters inappropriately".to_string(),
        });
    }

    None
}

fn contains(category: Category) -> Detection {
    Detection {
        category,
        reason: format!("contains inappropriate {}", category.label()),
    }
}

/// Undo common digit/symbol substitutions ("sh1t" -> "shit").
pub fn normalize_leetspeak(word: &str) -> String {
    word.chars()
        .filter_map(|c| match c {
            '1' => Some('i'),
            '3' => Some('e'),
            '4' | '@' => Some('a'),
            '5' | '$' => Some('s'),
            '7' => Some('t'),
            '0' => Some('o'),
            '*' | '#' => None,
            other => Some(other),
        })
        .collect()
}

fn has_repeated_run(word: &str, run: usize) -> bool {
    let mut chars = word.chars();
    let Some(mut previous) = chars.next() else {
        return false;
    };
    let mut count = 1;
    for c in chars {
        if c == previous {
            count += 1;
            if count >= run {
                return true;
            }
        } else {
            previous = c;
            count = 1;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category_of(word: &str) -> Option<Category> {
        detect(word).map(|d| d.category)
    }

    #[test]
    fn clean_words_pass() {
        for word in [
            "apple",
            "banana",
            "hello",
            "education",
            "learning",
            "sunshine",
            "mathematics",
            "skillful",
            "",
        ] {
            assert_eq!(detect(word), None, "{word} should be clean");
        }
    }

    #[test]
    fn exact_matches_use_category_order() {
        assert_eq!(category_of("Damn"), Some(Category::Profanity));
        assert_eq!(category_of(" kill "), Some(Category::Violence));
        // Listed under violence and disturbing content; violence is checked first.
        assert_eq!(category_of("suicide"), Some(Category::Violence));
        assert_eq!(category_of("racist"), Some(Category::HateSpeech));
        assert_eq!(category_of("lol"), Some(Category::SpamPatterns));
        let detection = detect("marijuana").unwrap();
        assert_eq!(detection.reason, "contains inappropriate drugs alcohol");
    }

    #[test]
    fn long_terms_match_as_substrings() {
        assert_eq!(category_of("terrorists"), Some(Category::Violence));
        assert_eq!(category_of("bloodbath"), Some(Category::DisturbingContent));
        // Four-letter terms only match exactly.
        assert_eq!(category_of("painting"), None);
        assert_eq!(category_of("shootings"), Some(Category::Violence));
    }

    #[test]
    fn leetspeak_variants_are_blocked() {
        let detection = detect("sh1t").unwrap();
        assert_eq!(detection.category, Category::Profanity);
        assert_eq!(
            detection.reason,
            "uses inappropriate characters to spell profanity"
        );
        assert_eq!(category_of("$ex"), Some(Category::SexualContent));
        assert_eq!(category_of("k#ill"), Some(Category::Violence));
    }

    #[test]
    fn spam_heuristics() {
        assert_eq!(
            detect("zzzzzz").unwrap().reason,
            "uses excessive repeated characters"
        );
        assert_eq!(
            detect("wtf123").unwrap().reason,
            "mixes numbers and letters inappropriately"
        );
        assert_eq!(detect("4th"), None);
        assert_eq!(detect("zzzz"), None);
    }

    #[test]
    fn detection_is_idempotent() {
        for word in ["sh1t", "apple", "terrorists", "wtf123", "Kill"] {
            assert_eq!(detect(word), detect(word));
        }
    }

    #[test]
    fn scan_finds_offending_token_in_sentence() {
        let (token, detection) = scan_text("This river is full of shit.").unwrap();
        assert_eq!(token, "shit");
        assert_eq!(detection.category, Category::Profanity);

        let (token, _) = scan_text("The hero will kill the dragon.").unwrap();
        assert_eq!(token, "kill");
        assert_eq!(
            scan_text("Don't be racist.").unwrap().1.category,
            Category::HateSpeech
        );
        assert!(scan_text("The story describes a lot of blood.").is_some());
    }

    #[test]
    fn scan_allows_ordinary_sentences() {
        for text in [
            "Apples are tasty and healthy.",
            "A chair is for sitting.",
            "Peace means no conflict.",
            "Read chapter 10b before class.",
            "Hello, friends!",
        ] {
            assert_eq!(scan_text(text), None, "{text} should be clean");
        }
    }
}
