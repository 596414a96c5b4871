//! Markup cleanup after edits.
//!
//! Browsers leave debris behind in contenteditable regions: empty blocks,
//! runs of `<br>`, `&nbsp;`, inline styles from pasted content, empty spans.
//! `normalize` rewrites it away with a fixed sequence of rules. Order matters:
//! style stripping runs before empty-wrapper removal so styled empty spans go
//! too.
//!
//! Variable token spans are cut out before the rules run and spliced back
//! untouched.

use std::sync::LazyLock;

use regex::Regex;

use crate::document::Document;
use crate::markup;

static VARIABLE_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<span\b[^>]*\bclass\s*=\s*"(?:[^"]*\s)?variable-tag(?:\s[^"]*)?"[^>]*>[^<]*</span>"#)
        .unwrap()
});

static EMPTY_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(div|p)>(<br\s*/?>)?</(div|p)>").unwrap());

static BREAK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(<br\s*/?>){3,}").unwrap());

static NBSP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)&nbsp;").unwrap());

static STYLE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+style\s*=\s*("[^"]*"|'[^']*')"#).unwrap()
});

static EMPTY_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<span\b[^>]*>(\s*)</span>").unwrap());

static SPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());

/// Upper bound on cleanup passes. Every rule shrinks its input, so this is
/// never reached on real markup.
const MAX_PASSES: usize = 32;

/// Normalize serialized document markup.
///
/// Idempotent: the rule sequence is repeated until the markup stops changing.
pub fn normalize(markup: &str) -> String {
    let mut current = normalize_pass(markup);
    for _ in 0..MAX_PASSES {
        let next = normalize_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
    tracing::warn!(
        target: "stencil::normalize",
        passes = MAX_PASSES,
        "markup did not settle"
    );
    current
}

/// Normalize a document, returning the cleaned copy.
pub fn normalize_document(doc: &Document) -> Document {
    markup::parse(&normalize(&markup::serialize(doc)))
}

/// Normalize a document in place. Every node is replaced.
pub fn normalize_in_place(doc: &mut Document) {
    let cleaned = normalize(&markup::serialize(doc));
    markup::replace_contents(doc, &cleaned);
}

fn normalize_pass(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut last = 0;
    for token in VARIABLE_SPAN.find_iter(markup) {
        out.push_str(&clean_segment(&markup[last..token.start()]));
        out.push_str(token.as_str());
        last = token.end();
    }
    out.push_str(&clean_segment(&markup[last..]));
    out.trim().to_string()
}

fn clean_segment(segment: &str) -> String {
    let s = EMPTY_BLOCK.replace_all(segment, "<br>");
    let s = BREAK_RUN.replace_all(&s, "<br><br>");
    let s = NBSP.replace_all(&s, " ");
    let s = STYLE_ATTR.replace_all(&s, "");
    let s = EMPTY_SPAN.replace_all(&s, "$1");
    let s = SPACE_RUN.replace_all(&s, " ");
    s.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = r#"<span class="variable-tag" contenteditable="false" data-variable="userName" data-description="a  b" draggable="true">用户姓名</span>"#;

    #[test]
    fn test_empty_blocks_become_breaks() {
        assert_eq!(normalize("a<div><br></div>b"), "a<br>b");
        assert_eq!(normalize("a<p></p>b"), "a<br>b");
    }

    #[test]
    fn test_break_runs_collapse_to_two() {
        assert_eq!(normalize("a<br><br><br><br/>b"), "a<br><br>b");
        assert_eq!(normalize("a<br><br>b"), "a<br><br>b");
    }

    #[test]
    fn test_nbsp_and_spaces() {
        assert_eq!(normalize("  a&nbsp;&nbsp;b   c  "), "a b c");
    }

    #[test]
    fn test_only_plain_space_runs_collapse() {
        assert_eq!(normalize("a\t\tb"), "a\t\tb");
        assert_eq!(normalize("a\n\nb  c"), "a\n\nb c");
    }

    #[test]
    fn test_lookalike_classes_are_not_protected() {
        assert_eq!(
            normalize(r#"<span class="variable-tag-x" style="color: red">a  b</span>"#),
            r#"<span class="variable-tag-x">a b</span>"#
        );
        assert_eq!(normalize(r#"a<span data-note="variable-tag"> </span>b"#), "a b");
    }

    #[test]
    fn test_styles_and_empty_spans() {
        assert_eq!(
            normalize(r#"<span style="color: red">x</span><span style="font-weight: bold"> </span>y"#),
            "<span>x</span> y"
        );
    }

    #[test]
    fn test_tokens_are_untouched() {
        let markup = format!("Hi&nbsp;{TOKEN}  there");
        assert_eq!(normalize(&markup), format!("Hi {TOKEN} there"));
    }

    #[test]
    fn test_token_with_empty_label_survives() {
        let token = r#"<span class="variable-tag" data-variable="" draggable="true"></span>"#;
        assert_eq!(normalize(&format!("a{token}b")), format!("a{token}b"));
    }

    #[test]
    fn test_drop_indicator_is_removed() {
        let markup = r#"a<span class="drop-indicator" contenteditable="false"></span>b"#;
        assert_eq!(normalize(markup), "ab");
    }

    #[test]
    fn test_idempotent_on_cascading_input() {
        // Removing the empty span leaves an empty div, which a later pass
        // turns into a break, which then joins the run of breaks.
        let inputs = [
            "<div><span> </span></div>",
            "<div><span></span></div><br><br>",
            "x<div><span style='a'></span></div><div></div><br>y",
            "plain",
            "",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "{input:?}");
        }
        assert_eq!(normalize("x<div><span style='a'></span></div><div></div><br>y"), "x<br><br>y");
    }

    #[test]
    fn test_normalize_document_keeps_tokens() {
        let doc = crate::convert::to_document(
            "Dear ${userName},  ${orderNo}",
            &crate::variable::VariableRegistry::defaults(),
        );
        let cleaned = normalize_document(&doc);
        assert_eq!(cleaned.variable_names(), vec!["userName", "orderNo"]);
        assert_eq!(crate::convert::to_raw_text(&cleaned), "Dear ${userName}, ${orderNo}");
    }

    #[test]
    fn test_normalize_in_place_kills_old_ids() {
        let mut doc = crate::markup::parse("a&nbsp;&nbsp;b<div></div>");
        let old = doc.children(doc.root()).to_vec();
        normalize_in_place(&mut doc);
        assert!(old.iter().all(|id| !doc.is_live(*id)));
        assert_eq!(crate::markup::serialize(&doc), "a b<br>");
    }
}
