//! Small text utilities used around the editor: counters for the host's
//! status line, label truncation, and cleanup of user-typed variable names.

pub use crate::markup::extract_text;

/// Number of non-whitespace chars in the text content of `markup`.
pub fn count_chars(markup: &str) -> usize {
    extract_text(markup)
        .chars()
        .filter(|c| !c.is_whitespace())
        .count()
}

/// Cut `text` to at most `max_chars` chars, appending `suffix` if anything
/// was cut. Counts chars, not bytes, so multi-byte text is never split.
pub fn truncate(text: &str, max_chars: usize, suffix: &str) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], suffix),
        None => text.to_string(),
    }
}

/// Turn arbitrary input into a usable variable name.
///
/// Drops everything but ASCII word chars and prefixes `var` unless the
/// result starts with an ASCII letter.
pub fn format_variable_name(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if cleaned.starts_with(|c: char| c.is_ascii_alphabetic()) {
        cleaned
    } else {
        format!("var{cleaned}")
    }
}
