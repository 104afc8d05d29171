//! Sentence relevance scoring.
//!
//! Scores how well a single sentence justifies a link to a target document
//! and picks the anchor text for that link.
//!
//! # Tiers
//!
//! Evaluated in order; the first tier that applies decides the result.
//!
//! | Tier | Condition | Score | Anchor |
//! |------|-----------|-------|--------|
//! | 1 | sentence contains the full title | 100 | the title |
//! | 2 | sentence contains a 2–5 word title phrase | `min(95, 70 + 8 × words)` | the phrase |
//! | 3 | sentence contains target keywords | weighted sum, see below | context phrase |
//! | 4 | nothing matched | 0 | empty |
//!
//! Tier 3 walks the keywords in rank order, adding `max(15, 60 − 3 × rank)`
//! for each one found and stopping after the second hit. Two hits earn a
//! ×1.3 boost. The total is clamped to `[0, 100]`.
//!
//! Scoring is total: any input produces a result, and no input panics.

use serde::Serialize;

use crate::phrase::{extract_contextual_phrase, find_title_phrase};

pub const EXACT_TITLE_SCORE: u8 = 100;
const TITLE_PHRASE_BASE: u32 = 70;
const TITLE_PHRASE_PER_WORD: u32 = 8;
const TITLE_PHRASE_CAP: u32 = 95;
const KEYWORD_BASE_WEIGHT: u32 = 60;
const KEYWORD_RANK_DECAY: u32 = 3;
const KEYWORD_MIN_WEIGHT: u32 = 15;
const MAX_MATCHED_KEYWORDS: usize = 2;
const MULTI_KEYWORD_BOOST: f64 = 1.3;

/// Score and anchor text for one sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relevance {
    pub score: u8,
    pub anchor_text: String,
}

impl Relevance {
    fn none() -> Self {
        Self {
            score: 0,
            anchor_text: String::new(),
        }
    }
}

/// Weight of a keyword at `rank` (0-based) in the target's keyword list.
pub fn keyword_weight(rank: usize) -> u32 {
    let decay = KEYWORD_RANK_DECAY.saturating_mul(rank.min(u32::MAX as usize) as u32);
    KEYWORD_BASE_WEIGHT
        .saturating_sub(decay)
        .max(KEYWORD_MIN_WEIGHT)
}

/// Score `sentence` against a target's keywords and title.
pub fn score_sentence(sentence: &str, keywords: &[String], target_title: &str) -> Relevance {
    let sentence_lower = sentence.to_lowercase();
    let title = target_title.trim();

    if !title.is_empty() {
        if sentence_lower.contains(&target_title.to_lowercase()) {
            return Relevance {
                score: EXACT_TITLE_SCORE,
                anchor_text: target_title.to_string(),
            };
        }

        if let Some(phrase) = find_title_phrase(title, sentence) {
            let words = phrase.split_whitespace().count() as u32;
            let score = (TITLE_PHRASE_BASE + TITLE_PHRASE_PER_WORD * words).min(TITLE_PHRASE_CAP);
            return Relevance {
                score: score as u8,
                anchor_text: phrase,
            };
        }
    }

    let mut score: u32 = 0;
    let mut matched: Vec<&str> = Vec::with_capacity(MAX_MATCHED_KEYWORDS);
    let mut anchor: Option<String> = None;

    for (rank, keyword) in keywords.iter().enumerate() {
        if keyword.is_empty() || !sentence_lower.contains(keyword.as_str()) {
            continue;
        }
        score += keyword_weight(rank);
        if matched.is_empty() {
            let phrase = extract_contextual_phrase(sentence, keyword);
            if !phrase.is_empty() {
                anchor = Some(phrase);
            }
        }
        matched.push(keyword);
        if matched.len() >= MAX_MATCHED_KEYWORDS {
            break;
        }
    }

    if matched.is_empty() {
        return Relevance::none();
    }

    if matched.len() >= MAX_MATCHED_KEYWORDS {
        score = (score as f64 * MULTI_KEYWORD_BOOST).round() as u32;
    }

    Relevance {
        score: score.min(100) as u8,
        anchor_text: anchor.unwrap_or_else(|| matched[0].to_string()),
    }
}
