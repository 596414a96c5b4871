//! Conversion between raw template text and the editable document.
//!
//! Raw text uses `${name}` placeholders. In the document each placeholder is
//! an atomic variable token; only its name round-trips; labels are looked up
//! from the registry on the way in and dropped on the way out.
//!
//! There is no escape for a literal `${` in user text. An unterminated `${`
//! (or `${}`) is not a placeholder and stays literal text.

use std::ops::Range;

use pulldown_cmark_escape::{FmtWriter, escape_html_body_text};
use smol_str::SmolStr;

use crate::document::{Document, NodeId, NodeKind, VariableToken};
use crate::markup::{self, write_text};
use crate::variable::{VariableDescriptor, VariableRegistry};

/// A `${name}` span inside raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// Byte range of the whole `${name}`.
    pub range: Range<usize>,
    pub name: &'a str,
}

/// Iterator over non-overlapping placeholders, left to right.
pub struct Placeholders<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Iterator for Placeholders<'a> {
    type Item = Placeholder<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let start = self.pos + self.src[self.pos..].find("${")?;
            let name_start = start + 2;
            let Some(close) = self.src[name_start..].find('}') else {
                self.pos = self.src.len();
                return None;
            };
            let name_end = name_start + close;
            if name_end == name_start {
                // `${}` isn't a placeholder; keep scanning after it.
                self.pos = name_end + 1;
                continue;
            }
            self.pos = name_end + 1;
            return Some(Placeholder {
                range: start..name_end + 1,
                name: &self.src[name_start..name_end],
            });
        }
    }
}

/// Scan raw text for placeholders.
pub fn placeholders(raw: &str) -> Placeholders<'_> {
    Placeholders { src: raw, pos: 0 }
}

/// Convert raw template text to editable-document markup.
///
/// Literal text is escaped only as far as the markup requires and line
/// breaks become `<br>`. Unknown variable names are kept, labelled with the
/// name itself.
pub fn to_document_markup(raw: &str, variables: &VariableRegistry) -> String {
    let mut out = String::with_capacity(raw.len() * 2);
    let mut last = 0;
    for placeholder in placeholders(raw) {
        write_lines(&mut out, &raw[last..placeholder.range.start]);
        let descriptor = variables.get(placeholder.name).cloned().unwrap_or_else(|| {
            VariableDescriptor::new(placeholder.name, placeholder.name, "", "")
        });
        out.push_str(&markup::variable_markup(&descriptor));
        last = placeholder.range.end;
    }
    write_lines(&mut out, &raw[last..]);
    out
}

/// Literal text with each line break (`\n` or `\r\n`) written as `<br>`.
fn write_lines(out: &mut String, text: &str) {
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push_str("<br>");
        }
        write_text(out, line.strip_suffix('\r').unwrap_or(line));
    }
}

/// Convert raw template text straight to a document.
pub fn to_document(raw: &str, variables: &VariableRegistry) -> Document {
    markup::parse(&to_document_markup(raw, variables))
}

/// Convert a document back to raw template text.
///
/// Reads the document without touching it. Every token becomes
/// `${name}`; malformed names become `${}` (see `malformed_tokens`).
/// Line breaks and block boundaries become `\n`.
pub fn to_raw_text(doc: &Document) -> String {
    let mut out = String::new();
    for child in doc.children(doc.root()) {
        write_raw(doc, *child, &mut out);
    }
    out
}

fn write_raw(doc: &Document, id: NodeId, out: &mut String) {
    match doc.kind(id) {
        Some(NodeKind::Text(text)) => out.push_str(text),
        Some(NodeKind::Variable(token)) => {
            out.push_str("${");
            if token.has_valid_name() {
                out.push_str(&token.name);
            }
            out.push('}');
        }
        Some(NodeKind::DropIndicator) | None => {}
        Some(NodeKind::Element(element)) => {
            if element.is_line_break() {
                out.push('\n');
                return;
            }
            if element.is_block() && !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            for child in doc.children(id) {
                write_raw(doc, *child, out);
            }
        }
    }
}

/// Tokens whose names are empty or contain `}`. These export as `${}`.
pub fn malformed_tokens(doc: &Document) -> Vec<NodeId> {
    doc.variable_tokens()
        .into_iter()
        .filter(|id| match doc.kind(*id) {
            Some(NodeKind::Variable(token)) => !token.has_valid_name(),
            _ => false,
        })
        .collect()
}

/// Build a token node for a descriptor, ready to insert.
pub fn create_token(doc: &mut Document, descriptor: &VariableDescriptor) -> NodeId {
    doc.create_variable(VariableToken::from_descriptor(descriptor))
}

/// Relabel every token from the registry, leaving names untouched.
///
/// Used after the host edits labels in its variable list.
pub fn relabel_tokens(doc: &mut Document, variables: &VariableRegistry) {
    for id in doc.variable_tokens() {
        if let Some(NodeKind::Variable(token)) = doc.kind_mut(id) {
            let label = SmolStr::new(variables.label_for(&token.name));
            token.label = label;
        }
    }
}

/// Syntax-highlighted raw text: `${`, the name and `}` in separate colored spans.
pub fn highlight_placeholders(raw: &str) -> String {
    const DELIMITER: &str = "<span style=\"color:#409EFF\">";
    const NAME: &str = "<span style=\"color:#67C23A\">";

    let mut out = String::with_capacity(raw.len() * 3);
    let mut last = 0;
    for placeholder in placeholders(raw) {
        let _ = escape_html_body_text(FmtWriter(&mut out), &raw[last..placeholder.range.start]);
        out.push_str(DELIMITER);
        out.push_str("${</span>");
        out.push_str(NAME);
        let _ = escape_html_body_text(FmtWriter(&mut out), placeholder.name);
        out.push_str("</span>");
        out.push_str(DELIMITER);
        out.push_str("}</span>");
        last = placeholder.range.end;
    }
    let _ = escape_html_body_text(FmtWriter(&mut out), &raw[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Element;

    fn registry() -> VariableRegistry {
        VariableRegistry::defaults()
    }

    #[test]
    fn test_placeholder_scan() {
        let found: Vec<_> = placeholders("a ${x} b ${} ${y}${z} ${open")
            .map(|p| p.name)
            .collect();
        assert_eq!(found, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_placeholder_names_may_contain_anything_but_brace() {
        let found: Vec<_> = placeholders("${a b$c{d}").map(|p| p.name).collect();
        assert_eq!(found, vec!["a b$c{d"]);
    }

    #[test]
    fn test_to_markup_uses_labels() {
        insta::assert_snapshot!(
            to_document_markup("Dear ${userName}!", &registry()),
            @r#"Dear <span class="variable-tag" contenteditable="false" data-variable="userName" data-description="用户的真实姓名" draggable="true">用户姓名</span>!"#
        );
    }

    #[test]
    fn test_unknown_name_falls_back_to_name() {
        let doc = to_document("${mystery}", &registry());
        let token = doc.variable_tokens()[0];
        match doc.kind(token) {
            Some(NodeKind::Variable(t)) => {
                assert_eq!(t.name, "mystery");
                assert_eq!(t.label, "mystery");
                assert_eq!(t.description, "");
            }
            other => panic!("expected token, got {other:?}"),
        }
    }

    #[test]
    fn test_literal_text_is_escaped_for_markup() {
        let markup = to_document_markup("a < b & c", &registry());
        assert_eq!(markup, "a &lt; b &amp; c");
        assert_eq!(to_raw_text(&markup::parse(&markup)), "a < b & c");
    }

    #[test]
    fn test_line_breaks_become_br() {
        let markup = to_document_markup("a\n\nb\r\n${date}", &registry());
        assert!(markup.starts_with("a<br><br>b<br><span"), "{markup}");
        let doc = markup::parse(&markup);
        assert_eq!(to_raw_text(&doc), "a\n\nb\n${date}");
    }

    #[test]
    fn test_round_trip_names() {
        let samples = [
            "",
            "plain text only",
            "Dear ${userName}, your order ${orderNo} is ready.",
            "${userName}${orderNo}",
            "unknown ${notInRegistry} stays",
            "line one\nline two ${date}",
            "para one\n\n${userName} para two\n",
            "dangling ${ is literal",
            "empty ${} is literal",
            "中文 ${amount} 元",
        ];
        let empty = VariableRegistry::new();
        for raw in samples {
            assert_eq!(to_raw_text(&to_document(raw, &registry())), raw, "{raw:?}");
            assert_eq!(to_raw_text(&to_document(raw, &empty)), raw, "{raw:?}");
        }
    }

    #[test]
    fn test_adjacent_tokens_have_no_separator() {
        let doc = to_document("${userName}${orderNo}", &registry());
        assert_eq!(doc.children(doc.root()).len(), 2);
        assert_eq!(to_raw_text(&doc), "${userName}${orderNo}");
    }

    #[test]
    fn test_empty_document_is_empty_text() {
        assert_eq!(to_raw_text(&Document::new()), "");
    }

    #[test]
    fn test_malformed_token_names_export_as_empty_placeholder() {
        let mut doc = Document::new();
        let empty = doc.create_variable(VariableToken::new("", "x"));
        let braces = doc.create_variable(VariableToken::new("a}b", "y"));
        let good = doc.create_variable(VariableToken::new("ok", "z"));
        doc.append_child(doc.root(), empty);
        doc.append_child(doc.root(), braces);
        doc.append_child(doc.root(), good);
        assert_eq!(to_raw_text(&doc), "${}${}${ok}");
        assert_eq!(malformed_tokens(&doc), vec![empty, braces]);
    }

    #[test]
    fn test_document_to_text_and_back_keeps_token_order() {
        let doc = markup::parse(concat!(
            r#"<div>Hi <span class="variable-tag" data-variable="orderNo">x</span></div>"#,
            r#"<div><b><span class="variable-tag" data-variable="userName">y</span></b></div>"#,
        ));
        let names = doc.variable_names();
        let raw = to_raw_text(&doc);
        assert_eq!(raw, "Hi ${orderNo}\n${userName}");
        assert_eq!(to_document(&raw, &registry()).variable_names(), names);
    }

    #[test]
    fn test_raw_text_is_stable_after_second_round() {
        let doc = markup::parse("<div>a</div><div>b<br>c</div><p>d</p>");
        let once = to_raw_text(&doc);
        let twice = to_raw_text(&to_document(&once, &registry()));
        assert_eq!(once, "a\nb\nc\nd");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_drop_indicator_is_invisible_to_export() {
        let mut doc = to_document("ab", &registry());
        let text = doc.children(doc.root())[0];
        let indicator = doc.create_drop_indicator();
        doc.insert_at(crate::document::Position::new(text, 1), indicator);
        assert_eq!(to_raw_text(&doc), "ab");
    }

    #[test]
    fn test_relabel_tokens() {
        let mut doc = Document::new();
        let token = doc.create_variable(VariableToken::new("date", "old"));
        doc.append_child(doc.root(), token);
        let wrapper = doc.create_element(Element::new("b"));
        doc.append_child(doc.root(), wrapper);
        relabel_tokens(&mut doc, &registry());
        assert_eq!(doc.text_content(doc.root()), "日期");
    }

    #[test]
    fn test_highlight() {
        insta::assert_snapshot!(
            highlight_placeholders("a<${x}"),
            @r#"a&lt;<span style="color:#409EFF">${</span><span style="color:#67C23A">x</span><span style="color:#409EFF">}</span>"#
        );
    }
}
