//! Text normalization helpers shared by statistics and scoring.

use std::collections::HashSet;

use crate::constants::leads::PREVIEW_ELLIPSIS;
use crate::types::Token;

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_inline_whitespace<T: AsRef<str>>(text: T) -> String {
    let mut normalized = String::new();
    let mut seen_space = false;
    for ch in text.as_ref().chars() {
        if ch.is_whitespace() {
            if !seen_space {
                normalized.push(' ');
                seen_space = true;
            }
        } else {
            normalized.push(ch);
            seen_space = false;
        }
    }
    normalized.trim().to_string()
}

/// Iterate lowercase word tokens (runs of alphanumerics or `_`).
pub fn word_tokens(text: &str) -> impl Iterator<Item = Token> + '_ {
    text.split(|c: char| !is_word_char(c))
        .filter(|token| !token.is_empty())
        .map(|token| token.to_lowercase())
}

/// Deduplicated lowercase word set for a document.
pub fn word_set(text: &str) -> HashSet<Token> {
    word_tokens(text).collect()
}

/// True for tokens made only of digits (`1987`, `42`).
pub fn is_numeric_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_numeric())
}

/// First `max_chars` characters of the whitespace-normalized text, with an
/// ellipsis when anything was cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let normalized = normalize_inline_whitespace(text);
    match normalized.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{PREVIEW_ELLIPSIS}", normalized[..cut].trim_end()),
        None => normalized,
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
