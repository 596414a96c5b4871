//! Markup parsing and serialization for the editable document.
//!
//! Parsing goes through `html5ever` with a `div` as fragment context, so
//! the document matches what a browser builds from the same `innerHTML`:
//! stray closing tags are ignored, unclosed elements close at the end and
//! character references decode the same way. Token and drop-indicator spans
//! are recognised by class while the parsed tree is copied over.

use html5ever::tendril::TendrilSink;
use html5ever::{LocalName, Namespace, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use pulldown_cmark_escape::{FmtWriter, escape_html, escape_html_body_text};
use smol_str::SmolStr;

use crate::document::{Document, Element, NodeId, NodeKind, VariableToken};
use crate::variable::VariableDescriptor;

/// Class marking a variable token span.
pub const VARIABLE_CLASS: &str = "variable-tag";
/// Class marking the drop indicator span.
pub const DROP_INDICATOR_CLASS: &str = "drop-indicator";

/// Markup for a single variable token.
pub fn variable_markup(descriptor: &VariableDescriptor) -> String {
    let mut out = String::new();
    write_variable(&mut out, &VariableToken::from_descriptor(descriptor));
    out
}

/// Serialize the content of a document (the root's inner markup).
pub fn serialize(doc: &Document) -> String {
    let mut out = String::new();
    for child in doc.children(doc.root()) {
        write_node(doc, *child, &mut out);
    }
    out
}

/// Serialize a single node and its subtree.
pub fn serialize_node(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, id, &mut out);
    out
}

fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    match doc.kind(id) {
        Some(NodeKind::Text(text)) => write_text(out, text),
        Some(NodeKind::Variable(token)) => write_variable(out, token),
        Some(NodeKind::DropIndicator) => {
            out.push_str("<span class=\"");
            out.push_str(DROP_INDICATOR_CLASS);
            out.push_str("\" contenteditable=\"false\"></span>");
        }
        Some(NodeKind::Element(element)) => {
            out.push('<');
            out.push_str(&element.tag);
            for (name, value) in &element.attrs {
                write_attr(out, name, value);
            }
            out.push('>');
            if element.is_void() {
                return;
            }
            for child in doc.children(id) {
                write_node(doc, *child, out);
            }
            out.push_str("</");
            out.push_str(&element.tag);
            out.push('>');
        }
        None => {}
    }
}

fn write_variable(out: &mut String, token: &VariableToken) {
    out.push_str("<span class=\"");
    out.push_str(VARIABLE_CLASS);
    out.push_str("\" contenteditable=\"false\"");
    write_attr(out, "data-variable", &token.name);
    write_attr(out, "data-description", &token.description);
    out.push_str(" draggable=\"true\">");
    write_text(out, &token.label);
    out.push_str("</span>");
}

fn write_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    // Writing into a String can't fail.
    let _ = escape_html(FmtWriter(&mut *out), value);
    out.push('"');
}

/// Escape body text the way browsers serialize it, including `&nbsp;`.
pub(crate) fn write_text(out: &mut String, text: &str) {
    for (i, part) in text.split('\u{a0}').enumerate() {
        if i > 0 {
            out.push_str("&nbsp;");
        }
        let _ = escape_html_body_text(FmtWriter(&mut *out), part);
    }
}

/// Parse a markup fragment into a new document.
pub fn parse(markup: &str) -> Document {
    let mut doc = Document::new();
    let root = doc.root();
    parse_into(&mut doc, root, markup);
    doc
}

/// Replace the whole document body with parsed `markup`.
///
/// Old node ids die rather than being reused, so anything still holding
/// them (a captured selection, a drop indicator) sees them as stale.
pub fn replace_contents(doc: &mut Document, markup: &str) {
    let root = doc.root();
    doc.clear_children(root);
    parse_into(doc, root, markup);
}

/// Parse a markup fragment and append the result under `parent`.
///
/// The fragment is parsed the way a browser parses `innerHTML` of a `div`.
pub fn parse_into(doc: &mut Document, parent: NodeId, markup: &str) {
    let dom = parse_fragment_dom(markup);
    // A fragment parse puts everything under a synthetic `<html>` element.
    for html in dom.document.children.borrow().iter() {
        for child in html.children.borrow().iter() {
            walk(doc, parent, child);
        }
    }
}

fn parse_fragment_dom(markup: &str) -> RcDom {
    let context = QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from("div"));
    html5ever::parse_fragment(RcDom::default(), ParseOpts::default(), context, Vec::new())
        .one(markup)
}

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

fn walk(doc: &mut Document, parent: NodeId, handle: &Handle) {
    match &handle.data {
        NodeData::Text { contents } => {
            // Adjacent text is already merged by the tree builder.
            let contents = contents.borrow();
            let text: &str = &contents;
            let id = doc.create_text(text);
            doc.append_child(parent, id);
        }
        NodeData::Element { name, attrs, .. } => {
            let element = Element {
                tag: SmolStr::new(&*name.local),
                attrs: attrs
                    .borrow()
                    .iter()
                    .map(|attr| {
                        let value: &str = &attr.value;
                        (SmolStr::new(&*attr.name.local), value.to_string())
                    })
                    .collect(),
            };
            let is_span = element.tag == "span";
            let id = if is_span && element.has_class(VARIABLE_CLASS) {
                doc.create_variable(variable_token(&element, handle))
            } else if is_span && element.has_class(DROP_INDICATOR_CLASS) {
                doc.create_drop_indicator()
            } else {
                let id = doc.create_element(element);
                for child in handle.children.borrow().iter() {
                    walk(doc, id, child);
                }
                id
            };
            doc.append_child(parent, id);
        }
        // Comments, doctypes and processing instructions are dropped.
        _ => {}
    }
}

/// Token for a `variable-tag` span; its label is the span's text.
fn variable_token(element: &Element, handle: &Handle) -> VariableToken {
    let mut label = String::new();
    collect_text(handle, &mut label);
    VariableToken {
        name: SmolStr::new(element.attr("data-variable").unwrap_or_default()),
        label: SmolStr::new(label),
        description: element.attr("data-description").unwrap_or_default().to_string(),
    }
}

fn collect_text(handle: &Handle, out: &mut String) {
    for child in handle.children.borrow().iter() {
        match &child.data {
            NodeData::Text { contents } => out.push_str(&contents.borrow()),
            NodeData::Element { .. } => collect_text(child, out),
            _ => {}
        }
    }
}

/// Plain text content of a markup fragment, token labels included.
pub fn extract_text(markup: &str) -> String {
    let doc = parse(markup);
    doc.text_content(doc.root())
}
