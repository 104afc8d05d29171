//! Frequency-ranked keyword extraction.
//!
//! The title is counted twice so that title terms outrank body terms of
//! equal frequency. Tokens are lowercased, stripped of punctuation, and
//! filtered against a fixed stop-word list and a minimum length.
//!
//! # Example
//!
//! ```rust
//! use orphan_links_core::keywords::extract_keywords;
//!
//! let kws = extract_keywords("Espresso Grinder", "A grinder for espresso at home.");
//! assert_eq!(kws[0], "espresso");
//! assert_eq!(kws[1], "grinder");
//! ```

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum number of keywords returned per document.
pub const MAX_KEYWORDS: usize = 20;

/// Tokens shorter than this (in characters) are discarded.
pub const MIN_KEYWORD_CHARS: usize = 3;

/// Articles, conjunctions, prepositions, auxiliaries, pronouns and wh-words.
pub const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "as", "is", "was", "are", "been", "be", "have", "has", "had", "do", "does", "did",
    "will", "would", "should", "could", "may", "might", "must", "can", "this", "that", "these",
    "those", "i", "you", "he", "she", "it", "we", "they", "what", "which", "who", "when",
    "where", "why", "how",
];

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

/// Lowercase `text`, blank out punctuation, and split on whitespace.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    NON_WORD
        .replace_all(&lowered, " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

/// Extract up to [`MAX_KEYWORDS`] keywords from a document.
///
/// Ordering is descending frequency; equal frequencies keep the order in
/// which the tokens first appeared (title first). Returns an empty list when
/// nothing survives filtering.
pub fn extract_keywords(title: &str, body: &str) -> Vec<String> {
    let text = format!("{} {} {}", title, title, body);

    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();

    for token in tokenize(&text) {
        if token.chars().count() < MIN_KEYWORD_CHARS || is_stop_word(&token) {
            continue;
        }
        let count = counts.entry(token.clone()).or_insert(0);
        if *count == 0 {
            first_seen.push(token);
        }
        *count += 1;
    }

    // Stable sort keeps first-seen order among ties.
    first_seen.sort_by(|a, b| counts[b].cmp(&counts[a]));
    first_seen.truncate(MAX_KEYWORDS);
    first_seen
}
