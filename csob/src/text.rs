//! Text normalization for length-limited gateway fields.
//!
//! Lengths are counted in characters, never bytes, so multi-byte text such as
//! Czech diacritics is never split inside a code point.

use std::sync::LazyLock;

use regex::Regex;

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid HTML tag pattern"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Marker appended to text that [`shorten_with_ellipsis`] had to cut.
pub const ELLIPSIS: &str = "...";

/// Strips HTML tags, collapses whitespace runs into single spaces and trims.
#[must_use]
pub fn normalize(text: &str) -> String {
    let stripped = HTML_TAG.replace_all(text, " ");
    WHITESPACE.replace_all(&stripped, " ").trim().to_owned()
}

/// Normalizes `text` and hard-cuts it to at most `max` characters.
#[must_use]
pub fn shorten(text: &str, max: usize) -> String {
    let text = normalize(text);
    if text.chars().count() <= max {
        return text;
    }
    let cut: String = text.chars().take(max).collect();
    cut.trim_end().to_owned()
}

/// Normalizes `text` and, if it is longer than `max` characters, cuts it at
/// a word boundary and appends [`ELLIPSIS`]. The result, marker included,
/// never exceeds `max` characters.
#[must_use]
pub fn shorten_with_ellipsis(text: &str, max: usize) -> String {
    let text = normalize(text);
    if text.chars().count() <= max {
        return text;
    }

    let budget = max.saturating_sub(ELLIPSIS.len());
    let cut: String = text.chars().take(budget).collect();
    let cuts_word = text.chars().nth(budget).is_some_and(|c| !is_word_break(c));

    let kept = match cut.rfind(is_word_break) {
        Some(idx) if cuts_word => &cut[..idx],
        _ => cut.as_str(),
    };
    format!("{}{ELLIPSIS}", kept.trim_end())
}

fn is_word_break(c: char) -> bool {
    c.is_whitespace() || matches!(c, '.' | ',' | '/' | '-')
}
