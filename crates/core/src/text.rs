//! Text shaping helpers shared by the analyzers.
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// Maximum number of characters sent to the model for analysis.
pub const CONTENT_LIMIT: usize = 4000;
/// Maximum number of characters printed for any one block of text.
pub const DISPLAY_LIMIT: usize = 1000;
pub const ELLIPSIS: &str = "...";

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static SPECIAL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s.,!?-]").expect("valid regex"));

/// Returns at most `limit` characters from the start of `text`.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Shortens `text` for display, appending an ellipsis only when something was cut.
pub fn preview(text: &str, limit: usize) -> Cow<'_, str> {
    let head = truncate_chars(text, limit);
    if head.len() == text.len() {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(format!("{head}{ELLIPSIS}"))
    }
}

/// Drops everything except word characters and basic punctuation, then collapses whitespace.
pub fn clean_text(text: &str) -> String {
    let stripped = SPECIAL_CHARS.replace_all(text, "");
    let collapsed = WHITESPACE.replace_all(&stripped, " ");
    collapsed.trim().to_string()
}
