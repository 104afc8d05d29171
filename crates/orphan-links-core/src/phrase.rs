//! Anchor-text phrase matching.
//!
//! Two strategies feed the relevance scorer:
//!
//! - [`find_title_phrase`] looks for the longest run of 2–5 consecutive
//!   title words that appears verbatim (case-insensitively) in a sentence.
//! - [`extract_contextual_phrase`] builds a short window of words around a
//!   keyword occurrence, for sentences that only share keywords with the
//!   target.

use crate::keywords::tokenize;

const MAX_TITLE_PHRASE_WORDS: usize = 5;
const MIN_TITLE_PHRASE_WORDS: usize = 2;
/// A phrase needs at least one word longer than this many characters.
const SIGNAL_WORD_CHARS: usize = 3;
const MAX_CONTEXT_WORDS: usize = 5;

/// Find the longest qualifying title phrase contained in `sentence`.
///
/// Phrase lengths are tried from 5 down to 2 words and, within a length,
/// left to right; the first hit wins. Phrases made only of short words
/// (three characters or fewer, e.g. "of the") are skipped.
pub fn find_title_phrase(title: &str, sentence: &str) -> Option<String> {
    let words = tokenize(title);
    if words.len() < MIN_TITLE_PHRASE_WORDS {
        return None;
    }
    let sentence_lower = sentence.to_lowercase();

    for len in (MIN_TITLE_PHRASE_WORDS..=MAX_TITLE_PHRASE_WORDS).rev() {
        if len > words.len() {
            continue;
        }
        for window in words.windows(len) {
            if !window
                .iter()
                .any(|w| w.chars().count() > SIGNAL_WORD_CHARS)
            {
                continue;
            }
            let phrase = window.join(" ");
            if sentence_lower.contains(&phrase) {
                return Some(phrase);
            }
        }
    }
    None
}

/// A whitespace-delimited word of the original sentence with its byte span.
struct WordSpan<'a> {
    start: usize,
    end: usize,
    text: &'a str,
}

fn word_spans(sentence: &str) -> Vec<WordSpan<'_>> {
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;
    for (i, c) in sentence.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                spans.push(WordSpan {
                    start: s,
                    end: i,
                    text: &sentence[s..i],
                });
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push(WordSpan {
            start: s,
            end: sentence.len(),
            text: &sentence[s..],
        });
    }
    spans
}

/// Byte offset in `haystack` of the first case-insensitive occurrence of
/// `needle`.
///
/// Lowercasing can change byte lengths, so matching happens on a lowered
/// copy that remembers the original offset of every byte.
fn find_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.to_lowercase();
    if needle.is_empty() {
        return None;
    }
    let mut lowered = String::with_capacity(haystack.len());
    let mut origin = Vec::with_capacity(haystack.len());
    for (i, c) in haystack.char_indices() {
        for lc in c.to_lowercase() {
            lowered.push(lc);
            origin.extend(std::iter::repeat(i).take(lc.len_utf8()));
        }
    }
    lowered.find(&needle).map(|pos| origin[pos])
}

/// Keep word characters plus internal hyphens and apostrophes.
fn clean_word(word: &str) -> String {
    let kept: String = word
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '\''))
        .collect();
    kept.trim_matches(|c| c == '-' || c == '\'').to_string()
}

/// Build an anchor phrase from the words around `keyword` in `sentence`.
///
/// Takes one word before and two words after the word containing the
/// keyword, strips punctuation, and caps the result at five words. Falls
/// back to the keyword itself when no window can be formed.
pub fn extract_contextual_phrase(sentence: &str, keyword: &str) -> String {
    let spans = word_spans(sentence);
    let hit = find_case_insensitive(sentence, keyword)
        .and_then(|offset| spans.iter().position(|w| offset < w.end && offset >= w.start));

    let Some(pos) = hit else {
        return keyword.to_string();
    };

    let from = pos.saturating_sub(1);
    let to = (pos + 2).min(spans.len() - 1);
    let words: Vec<String> = spans[from..=to]
        .iter()
        .map(|w| clean_word(w.text))
        .filter(|w| !w.is_empty())
        .take(MAX_CONTEXT_WORDS)
        .collect();

    if words.is_empty() {
        keyword.to_string()
    } else {
        words.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_title_phrase_wins() {
        let phrase = find_title_phrase(
            "The Complete Guide to Espresso Grinders",
            "Any guide to espresso grinders should mention burrs.",
        );
        assert_eq!(phrase.as_deref(), Some("guide to espresso grinders"));
    }

    #[test]
    fn leftmost_phrase_wins_within_a_length() {
        let phrase = find_title_phrase(
            "Coffee Beans Roasting Notes",
            "Roasting notes and coffee beans, side by side.",
        );
        assert_eq!(phrase.as_deref(), Some("coffee beans"));
    }

    #[test]
    fn low_signal_phrases_are_skipped() {
        assert_eq!(
            find_title_phrase("Out of the Box", "Think out of the way."),
            None
        );
    }

    #[test]
    fn single_word_title_has_no_phrase() {
        assert_eq!(find_title_phrase("Espresso", "espresso espresso"), None);
    }

    #[test]
    fn title_punctuation_is_ignored() {
        let phrase = find_title_phrase("Grinders: Burr vs. Blade", "A burr vs blade debate.");
        assert_eq!(phrase.as_deref(), Some("burr vs blade"));
    }

    #[test]
    fn context_window_around_keyword() {
        let phrase = extract_contextual_phrase(
            "Learning proper roasting techniques improves espresso flavor.",
            "roasting",
        );
        assert_eq!(phrase, "proper roasting techniques improves");
    }

    #[test]
    fn context_window_clamps_at_sentence_start() {
        let phrase = extract_contextual_phrase("Roasting at home, safely.", "roasting");
        assert_eq!(phrase, "Roasting at home");
    }

    #[test]
    fn context_window_clamps_at_sentence_end() {
        let phrase = extract_contextual_phrase("We love dark roasting!", "roasting");
        assert_eq!(phrase, "dark roasting");
    }

    #[test]
    fn keyword_inside_a_longer_word() {
        let phrase = extract_contextual_phrase("Try the pre-roasting step now.", "roasting");
        assert_eq!(phrase, "the pre-roasting step now");
    }

    #[test]
    fn apostrophes_survive_inside_words() {
        let phrase = extract_contextual_phrase("It's the barista's grinder, really.", "grinder");
        assert_eq!(phrase, "barista's grinder really");
    }

    #[test]
    fn missing_keyword_falls_back() {
        assert_eq!(extract_contextual_phrase("Nothing here.", "espresso"), "espresso");
        assert_eq!(extract_contextual_phrase("", "espresso"), "espresso");
    }

    #[test]
    fn case_insensitive_offset_with_multibyte_prefix() {
        let phrase = extract_contextual_phrase("Ünïcode heavy ESPRESSO shots here", "espresso");
        assert_eq!(phrase, "heavy ESPRESSO shots here");
    }
}
