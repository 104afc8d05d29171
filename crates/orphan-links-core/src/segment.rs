//! Paragraph and sentence segmentation.
//!
//! Candidate documents are cut into paragraphs and sentences before each
//! sentence is scored against a target.
//!
//! # Contract
//!
//! - A **paragraph boundary** is a line break, an optional whitespace-only
//!   line, and another line break (`\n\s*\n`). Runs of blank lines collapse
//!   into one boundary.
//! - A **sentence boundary** is a `.`, `!` or `?` immediately followed by
//!   whitespace. The punctuation stays with the sentence; the whitespace is
//!   dropped.
//!
//! Paragraph indices count every piece produced by the split, including
//! pieces that turn out to be empty, so an index always points at the same
//! block of the original body.

use once_cell::sync::Lazy;
use regex::Regex;

static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// A non-empty paragraph with its position in the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph<'a> {
    pub index: usize,
    pub text: &'a str,
}

/// Split `body` on blank lines, dropping whitespace-only pieces but keeping
/// their index slots.
pub fn split_paragraphs(body: &str) -> Vec<Paragraph<'_>> {
    PARAGRAPH_BREAK
        .split(body)
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(index, text)| Paragraph { index, text })
        .collect()
}

fn ends_sentence(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Split a paragraph into sentences. Returned slices are untrimmed except
/// for the separating whitespace; empty pieces are omitted.
pub fn split_sentences(paragraph: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;
    let mut chars = paragraph.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c.is_whitespace() && prev.is_some_and(ends_sentence) {
            let mut end = i + c.len_utf8();
            while let Some(&(j, next)) = chars.peek() {
                if !next.is_whitespace() {
                    break;
                }
                end = j + next.len_utf8();
                chars.next();
            }
            push_piece(&mut sentences, &paragraph[start..i]);
            start = end;
            prev = None;
            continue;
        }
        prev = Some(c);
    }
    push_piece(&mut sentences, &paragraph[start..]);

    sentences
}

fn push_piece<'a>(out: &mut Vec<&'a str>, piece: &'a str) {
    if !piece.trim().is_empty() {
        out.push(piece);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_split_on_blank_lines() {
        let paras = split_paragraphs("One.\n\nTwo.\n\n\n\nThree.");
        let texts: Vec<&str> = paras.iter().map(|p| p.text).collect();
        assert_eq!(texts, vec!["One.", "Two.", "Three."]);
        assert_eq!(paras[2].index, 2);
    }

    #[test]
    fn whitespace_only_line_is_a_boundary() {
        let paras = split_paragraphs("One.\n   \nTwo.");
        assert_eq!(paras.len(), 2);
        assert_eq!(paras[1].text, "Two.");
    }

    #[test]
    fn single_newline_is_not_a_boundary() {
        let paras = split_paragraphs("Line one\nline two");
        assert_eq!(paras.len(), 1);
    }

    #[test]
    fn empty_leading_piece_keeps_its_index() {
        let paras = split_paragraphs("\n\nFirst real.\n\nSecond real.");
        assert_eq!(paras[0].index, 1);
        assert_eq!(paras[1].index, 2);
    }

    #[test]
    fn sentences_split_after_terminal_punctuation() {
        let s = split_sentences("Is it hot? Yes!  It is.\tDone");
        assert_eq!(s, vec!["Is it hot?", "Yes!", "It is.", "Done"]);
    }

    #[test]
    fn punctuation_without_whitespace_does_not_split() {
        let s = split_sentences("Version 1.2 ships today. See example.com for more.");
        assert_eq!(
            s,
            vec!["Version 1.2 ships today.", "See example.com for more."]
        );
    }

    #[test]
    fn trailing_whitespace_yields_no_empty_sentence() {
        assert_eq!(split_sentences("Only one.  "), vec!["Only one."]);
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn multibyte_text() {
        let s = split_sentences("Café au lait. Crème brûlée!");
        assert_eq!(s, vec!["Café au lait.", "Crème brûlée!"]);
    }
}
