use crate::error::LexiconError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of inappropriate content a word was flagged for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Profanity,
    SexualContent,
    Violence,
    DrugsAlcohol,
    HateSpeech,
    DisturbingContent,
    SpamPatterns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Medium,
}

const PROFANITY: &[&str] = &[
    "damn", "damned", "hell", "hells", "crap", "sucks", "piss", "pissed", "shit", "fuck", "bitch",
    "asshole", "bastard", "dumbass",
];

const SEXUAL_CONTENT: &[&str] = &[
    "sex",
    "sexy",
    "porn",
    "orgasm",
    "penis",
    "vagina",
    "breast",
    "breasts",
    "ejaculation",
    "ejaculations",
    "erection",
    "masturbate",
    "prostitute",
    "nude",
    "naked",
    "horny",
    "arousal",
    "climax",
    "intercourse",
];

const VIOLENCE: &[&str] = &[
    "kill",
    "killing",
    "killer",
    "murder",
    "murderer",
    "suicide",
    "weapon",
    "gun",
    "shoot",
    "shooting",
    "bomb",
    "explosive",
    "stab",
    "stabbing",
    "violence",
    "violent",
    "assault",
    "attack",
    "terroris",
];

const DRUGS_ALCOHOL: &[&str] = &[
    "drug",
    "drugs",
    "cocaine",
    "marijuana",
    "heroin",
    "meth",
    "drunk",
    "alcohol",
    "weed",
    "pot",
    "high",
    "stoned",
    "overdose",
    "addiction",
];

const HATE_SPEECH: &[&str] = &[
    "racist",
    "sexist",
    "nazi",
    "hate",
    "terrorism",
    "terrorist",
    "extremist",
];

const DISTURBING_CONTENT: &[&str] = &[
    "death",
    "die",
    "dying",
    "blood",
    "bloody",
    "torture",
    "pain",
    "suffering",
    "corpse",
    "suicide",
    "self-harm",
];

const SPAM_PATTERNS: &[&str] = &["wtf", "omg", "lol", "rofl", "stfu", "gtfo", "af", "thot"];

impl Category {
    /// Checking order; the first category that matches wins.
    pub const ALL: [Category; 7] = [
        Category::Profanity,
        Category::SexualContent,
        Category::Violence,
        Category::DrugsAlcohol,
        Category::HateSpeech,
        Category::DisturbingContent,
        Category::SpamPatterns,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Profanity => "profanity",
            Category::SexualContent => "sexual_content",
            Category::Violence => "violence",
            Category::DrugsAlcohol => "drugs_alcohol",
            Category::HateSpeech => "hate_speech",
            Category::DisturbingContent => "disturbing_content",
            Category::SpamPatterns => "spam_patterns",
        }
    }

    /// Human readable name, e.g. "sexual content".
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }

    pub fn terms(&self) -> &'static [&'static str] {
        match self {
            Category::Profanity => PROFANITY,
            Category::SexualContent => SEXUAL_CONTENT,
            Category::Violence => VIOLENCE,
            Category::DrugsAlcohol => DRUGS_ALCOHOL,
            Category::HateSpeech => HATE_SPEECH,
            Category::DisturbingContent => DISTURBING_CONTENT,
            Category::SpamPatterns => SPAM_PATTERNS,
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.terms().contains(&word)
    }

    pub fn severity(&self) -> Severity {
        match self {
            Category::SexualContent | Category::HateSpeech => Severity::High,
            _ => Severity::Medium,
        }
    }

    /// Why the category is not allowed, phrased for children.
    pub fn explanation(&self) -> &'static str {
        match self {
            Category::Profanity => "uses words that aren't polite or respectful",
            Category::SexualContent => "includes grown-up topics not suitable for kids",
            Category::Violence => "describes harmful or scary things",
            Category::DrugsAlcohol => "mentions substances that aren't healthy for children",
            Category::HateSpeech => "contains mean or hurtful language",
            Category::DisturbingContent => "includes topics that might be scary or upsetting",
            Category::SpamPatterns => "looks like random letters or spam",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = LexiconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| LexiconError::UnknownVariant {
                kind: "category",
                value: s.to_string(),
            })
    }
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = LexiconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            other => Err(LexiconError::UnknownVariant {
                kind: "severity",
                value: other.to_string(),
            }),
        }
    }
}
