//! Policy text cleaner
//!
//! Prepares extracted bulletin text for rule analysis:
//! - Whitespace normalization
//! - Isolation of the PURPOSE..Policy Applicable Codes section
//! - Fixed-length fallback when the section headers are missing
//! - Removal of boilerplate noise phrases

use regex::Regex;
use std::sync::LazyLock;

use crate::error::Result;
use crate::utils::truncate_chars;

/// Characters kept when the PURPOSE/Codes headers are not found
pub const DEFAULT_FALLBACK_CHARS: usize = 6000;

/// Boilerplate printed on every bulletin
pub const NOISE_PHRASES: &[&str] = &[
    "Highmark Reimbursement Policy Bulletin",
    "Application is based on how the provider is contracted",
    "This Policy supersedes direction provided in Bulletins prior",
    "A checked box indicates the policy is applicable",
];

/// Unicode whitespace plus the ASCII file/group/record/unit separators (U+001C..U+001F)
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s\x1C-\x1F]+").unwrap());

/// From the first "PURPOSE:" through the first following "Policy Applicable Codes:"
static SECTION_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)PURPOSE:.*?Policy Applicable Codes:").unwrap()
});

static SECTION_STOP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)RELATED HIGHMARK POLICIES").unwrap()
});

static DEFAULT_CLEANER: LazyLock<PolicyCleaner> = LazyLock::new(PolicyCleaner::default);

/// Tunables for [`PolicyCleaner`]
#[derive(Debug, Clone, PartialEq)]
pub struct CleanerConfig {
    pub fallback_chars: usize,
    /// Removed after the built-in phrases; matched literally, ignoring case
    pub extra_noise_phrases: Vec<String>,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            fallback_chars: DEFAULT_FALLBACK_CHARS,
            extra_noise_phrases: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PolicyCleaner {
    fallback_chars: usize,
    noise: Vec<Regex>,
}

impl Default for PolicyCleaner {
    fn default() -> Self {
        Self {
            fallback_chars: DEFAULT_FALLBACK_CHARS,
            noise: NOISE_PHRASES.iter().map(|p| noise_regex(p).unwrap()).collect(),
        }
    }
}

fn noise_regex(phrase: &str) -> std::result::Result<Regex, regex::Error> {
    Regex::new(&format!("(?i){}", regex::escape(phrase)))
}

impl PolicyCleaner {
    pub fn new(config: &CleanerConfig) -> Result<Self> {
        let noise = NOISE_PHRASES.iter()
            .map(|p| p.to_string())
            .chain(config.extra_noise_phrases.iter().cloned())
            .filter(|p| !p.trim().is_empty())
            .map(|p| noise_regex(&p))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            fallback_chars: config.fallback_chars,
            noise,
        })
    }

    /// Locate the policy section in whitespace-normalized text.
    ///
    /// Runs from "PURPOSE:" through "Policy Applicable Codes:" and on up to
    /// "RELATED HIGHMARK POLICIES" (exclusive) or the end of the text.
    pub fn section<'a>(&self, text: &'a str) -> Option<&'a str> {
        let start = SECTION_START.find(text)?;
        let end = SECTION_STOP.find_at(text, start.end())
            .map(|stop| stop.start())
            .unwrap_or(text.len());
        Some(&text[start.start()..end])
    }

    pub fn clean(&self, raw_text: &str) -> String {
        let text = normalize_whitespace(raw_text);

        let mut interesting = match self.section(&text) {
            Some(section) => section.to_string(),
            None => truncate_chars(&text, self.fallback_chars).to_string(),
        };

        for phrase in &self.noise {
            interesting = phrase.replace_all(&interesting, "").into_owned();
        }

        interesting.trim().to_string()
    }
}

/// Collapse every whitespace run to a single space
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").into_owned()
}

/// Clean raw bulletin text with the default settings
pub fn clean_policy_text(raw_text: &str) -> String {
    DEFAULT_CLEANER.clean(raw_text)
}
