//! Deterministic utterance normalization: whitespace collapse, first
//! sentence only, one emoji, word cap, terminal punctuation. Total and
//! idempotent, so it can be reapplied after a repair without drift.
//!
//! Emoji handling walks grapheme clusters, not chars, so a ZWJ sequence
//! is kept or dropped as a unit instead of being half-stripped.

use crate::llm::FinishReason;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

static EMOJI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{Emoji_Presentation}\p{Extended_Pictographic}]").expect("emoji class")
});

const TERMINAL: &[char] = &['.', '!', '?'];
const TRAILING_QUOTES: &[char] = &['"', '\'', '\u{201d}', '\u{2019}'];

/// Full normalization pass. `Tighten(Tighten(s)) == Tighten(s)` for all `s`.
pub fn tighten(s: &str, word_limit: usize) -> String {
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    let sentence = first_sentence(&collapsed);
    let single_emoji = cap_emoji(sentence);

    let words: Vec<&str> = single_emoji.split_whitespace().collect();
    if words.len() > word_limit {
        let mut capped = words[..word_limit].join(" ");
        if !ends_with_terminal_punctuation(&capped) {
            capped.push('.');
        }
        capped
    } else {
        words.join(" ")
    }
}

/// Keep everything up to and including the first sentence-ending
/// punctuation mark that is followed by whitespace. No boundary means
/// the whole string is one sentence.
fn first_sentence(s: &str) -> &str {
    let mut chars = s.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if TERMINAL.contains(&c) {
            if let Some((_, next)) = chars.peek() {
                if next.is_whitespace() {
                    return &s[..i + c.len_utf8()];
                }
            }
        }
    }
    s
}

/// Keep the first emoji grapheme, drop every later one.
fn cap_emoji(s: &str) -> String {
    let mut seen = false;
    let mut out = String::with_capacity(s.len());
    for g in s.graphemes(true) {
        if is_emoji_grapheme(g) {
            if seen {
                continue;
            }
            seen = true;
        }
        out.push_str(g);
    }
    out
}

fn is_emoji_grapheme(g: &str) -> bool {
    EMOJI.is_match(g)
}

/// Terminal-punctuation check, ignoring trailing whitespace and quotes.
pub fn ends_with_terminal_punctuation(s: &str) -> bool {
    s.trim_end()
        .trim_end_matches(TRAILING_QUOTES)
        .ends_with(TERMINAL)
}

/// A completion is truncated when the server says it hit the token
/// limit, or when the text just stops without terminal punctuation.
/// Servers misreport the finish reason often enough that either signal
/// alone triggers the continuation.
pub fn is_truncated(text: &str, finish: FinishReason) -> bool {
    finish == FinishReason::Length || !ends_with_terminal_punctuation(text)
}

/// Speech-safe projection: all emoji dropped, whitespace collapsed,
/// capped at `char_cap` characters.
pub fn speakable(s: &str, char_cap: usize) -> String {
    let stripped: String = s
        .graphemes(true)
        .filter(|g| !is_emoji_grapheme(g))
        .collect();
    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(char_cap)
        .collect()
}

pub fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}
