//! Allow-list check for raw template text.
//!
//! This is not a sanitizer. It rejects text that clearly didn't come out of
//! the editing surface (pasted markup, control characters, unsupported
//! scripts) so the host can ask for new input.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{InvalidContentKind, InvalidTemplateText};

/// Anything shaped like a markup tag.
static MARKUP_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Punctuation accepted besides letters, digits and whitespace.
const ALLOWED_PUNCTUATION: &[char] = &[
    ',', '.', '?', '!', ';', ':', '\'', '"', '(', ')', '[', ']', '{', '}', '-', '_', '$', '。',
    '，', '、', '；', '：', '‘', '’', '“', '”', '《', '》', '【', '】',
];

fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c.is_whitespace()
        || ('\u{4e00}'..='\u{9fa5}').contains(&c)
        || ALLOWED_PUNCTUATION.contains(&c)
}

/// Check raw text, reporting the first problem found.
///
/// Markup is reported before disallowed characters. Empty text is valid.
pub fn validate(text: &str) -> Result<(), InvalidTemplateText> {
    if let Some(tag) = MARKUP_TAG.find(text) {
        return Err(InvalidTemplateText {
            kind: InvalidContentKind::Markup,
            src: text.to_string(),
            span: (tag.start(), tag.len()).into(),
        });
    }
    if let Some((offset, c)) = text.char_indices().find(|(_, c)| !is_allowed_char(*c)) {
        return Err(InvalidTemplateText {
            kind: InvalidContentKind::DisallowedChar(c),
            src: text.to_string(),
            span: (offset, c.len_utf8()).into(),
        });
    }
    Ok(())
}

/// True if the text contains markup or characters outside the allow-list.
pub fn is_invalid(text: &str) -> bool {
    validate(text).is_err()
}
