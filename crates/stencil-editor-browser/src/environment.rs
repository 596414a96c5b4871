//! Browser implementation of the selection and drop platforms.
//!
//! DOM positions are translated through flat caret offsets: each char of a
//! text node is one stop (the DOM counts UTF-16 units, the document counts
//! chars), a variable token or `<br>` is one stop and the drop indicator is
//! zero. The same offset means the same place in the DOM and in the
//! document even while they differ by a drop indicator, which is the case
//! during a drag before the DOM is re-rendered.

use smol_str::SmolStr;
use stencil_editor_core::markup::{DROP_INDICATOR_CLASS, VARIABLE_CLASS};
use stencil_editor_core::{
    Document, DropPlatform, EditorConfig, Element, PlatformError, Point, Position, Rect, SelectionPlatform,
    SelectionState,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

// === Hit-testing bindings ===
//
// web-sys doesn't expose `caretRangeFromPoint` at all and gates
// `caretPositionFromPoint` behind a binding that throws where the method is
// missing. Both are bound here with `catch` on a local view of `Document`.

#[wasm_bindgen]
extern "C" {
    type HitTestDocument;

    #[wasm_bindgen(method, catch, js_name = caretPositionFromPoint)]
    fn caret_position_from_point(
        this: &HitTestDocument,
        x: f64,
        y: f64,
    ) -> Result<Option<CaretPosition>, JsValue>;

    #[wasm_bindgen(method, catch, js_name = caretRangeFromPoint)]
    fn caret_range_from_point(
        this: &HitTestDocument,
        x: f64,
        y: f64,
    ) -> Result<Option<web_sys::Range>, JsValue>;

    /// Result of `caretPositionFromPoint`.
    type CaretPosition;

    #[wasm_bindgen(method, getter, structural, js_name = offsetNode)]
    fn offset_node(this: &CaretPosition) -> Option<web_sys::Node>;

    #[wasm_bindgen(method, getter, structural)]
    fn offset(this: &CaretPosition) -> u32;
}

/// Browser-backed selection and drop handling for one editor element.
pub struct BrowserEnvironment {
    editor_id: String,
    drop_target_class: SmolStr,
}

impl BrowserEnvironment {
    /// Create a new environment for the given editor element.
    pub fn new(editor_id: impl Into<String>) -> Self {
        Self::with_config(editor_id, &EditorConfig::default())
    }

    pub fn with_config(editor_id: impl Into<String>, config: &EditorConfig) -> Self {
        Self {
            editor_id: editor_id.into(),
            drop_target_class: config.drop_target_class.clone(),
        }
    }

    /// Get the editor element ID.
    pub fn editor_id(&self) -> &str {
        &self.editor_id
    }

    pub fn editor_element(&self) -> Option<web_sys::Element> {
        web_sys::window()?
            .document()?
            .get_element_by_id(&self.editor_id)
    }
}

impl SelectionPlatform for BrowserEnvironment {
    fn get_selection(&self, doc: &Document) -> Option<SelectionState> {
        let editor = self.editor_element()?;
        let selection = web_sys::window()?.get_selection().ok()??;
        if selection.range_count() == 0 {
            return None;
        }

        let anchor = caret_offset_in_dom(
            &editor,
            &selection.anchor_node()?,
            selection.anchor_offset(),
        )?;
        let focus = caret_offset_in_dom(&editor, &selection.focus_node()?, selection.focus_offset())?;

        tracing::trace!(
            target: "stencil::browser",
            anchor,
            focus,
            "read DOM selection"
        );

        Some(SelectionState::new(
            doc.position_at_caret_offset(anchor)?,
            doc.position_at_caret_offset(focus)?,
        ))
    }

    fn set_selection(
        &self,
        doc: &Document,
        state: &SelectionState,
    ) -> Result<(), PlatformError> {
        let editor = self.editor_element().ok_or("editor element not found")?;
        let anchor = doc
            .caret_offset_of(state.anchor)
            .ok_or("anchor does not resolve in document")?;
        let focus = doc
            .caret_offset_of(state.focus)
            .ok_or("focus does not resolve in document")?;

        let (anchor_node, anchor_offset) = dom_point_at_caret_offset(&editor, anchor)
            .ok_or_else(|| format!("no DOM position for caret offset {}", anchor))?;
        let (focus_node, focus_offset) = dom_point_at_caret_offset(&editor, focus)
            .ok_or_else(|| format!("no DOM position for caret offset {}", focus))?;

        let selection = web_sys::window()
            .ok_or("no window")?
            .get_selection()
            .map_err(|e| format!("get_selection failed: {:?}", e))?
            .ok_or("no selection object")?;
        selection
            .set_base_and_extent(&anchor_node, anchor_offset, &focus_node, focus_offset)
            .map_err(|e| format!("set_base_and_extent failed: {:?}", e))?;
        Ok(())
    }
}

impl DropPlatform for BrowserEnvironment {
    fn resolve_point(&self, doc: &Document, point: Point) -> Option<Position> {
        let editor = self.editor_element()?;
        let (node, offset) = hit_test(point)?;
        let caret = caret_offset_in_dom(&editor, &node, offset)?;
        tracing::trace!(target: "stencil::browser", ?point, caret, "resolved drop point");
        doc.position_at_caret_offset(caret)
    }

    fn editor_bounds(&self) -> Option<Rect> {
        let rect = self.editor_element()?.get_bounding_client_rect();
        Some(Rect::new(rect.left(), rect.top(), rect.right(), rect.bottom()))
    }

    fn set_drop_target_active(&self, active: bool) {
        let Some(editor) = self.editor_element() else {
            return;
        };
        let classes = editor.class_list();
        let result = if active {
            classes.add_1(&self.drop_target_class)
        } else {
            classes.remove_1(&self.drop_target_class)
        };
        if let Err(e) = result {
            tracing::debug!(target: "stencil::browser", "toggling drop target class failed: {:?}", e);
        }
    }
}

/// DOM node and offset under a viewport point.
fn hit_test(point: Point) -> Option<(web_sys::Node, u32)> {
    let document = web_sys::window()?.document()?;
    let document: &HitTestDocument = document.unchecked_ref();

    if let Ok(Some(position)) = document.caret_position_from_point(point.x, point.y) {
        return Some((position.offset_node()?, position.offset()));
    }
    match document.caret_range_from_point(point.x, point.y) {
        Ok(Some(range)) => Some((range.start_container().ok()?, range.start_offset().ok()?)),
        Ok(None) => None,
        Err(e) => {
            tracing::debug!(target: "stencil::browser", "no caret hit-testing available: {:?}", e);
            None
        }
    }
}

// === DOM caret offsets ===

enum DomKind {
    Text(String),
    /// Variable tokens and void elements such as `<br>`.
    Atomic,
    Indicator,
    Container,
    Other,
}

fn classify(node: &web_sys::Node) -> DomKind {
    match node.node_type() {
        web_sys::Node::TEXT_NODE => DomKind::Text(node.text_content().unwrap_or_default()),
        web_sys::Node::ELEMENT_NODE => {
            let element = node.unchecked_ref::<web_sys::Element>();
            let classes = element.class_list();
            if classes.contains(VARIABLE_CLASS) || Element::new(element.tag_name()).is_void() {
                DomKind::Atomic
            } else if classes.contains(DROP_INDICATOR_CLASS) {
                DomKind::Indicator
            } else {
                DomKind::Container
            }
        }
        _ => DomKind::Other,
    }
}

fn children(node: &web_sys::Node) -> impl Iterator<Item = web_sys::Node> {
    let list = node.child_nodes();
    (0..list.length()).filter_map(move |i| list.item(i))
}

/// Chars in the first `utf16_offset` code units of `text`.
pub fn utf16_to_chars(text: &str, utf16_offset: u32) -> usize {
    let mut units = 0;
    let mut chars = 0;
    for c in text.chars() {
        if units >= utf16_offset as usize {
            break;
        }
        units += c.len_utf16();
        chars += 1;
    }
    chars
}

/// UTF-16 code units in the first `chars` chars of `text`.
pub fn chars_to_utf16(text: &str, chars: usize) -> u32 {
    text.chars().take(chars).map(char::len_utf16).sum::<usize>() as u32
}

fn width(node: &web_sys::Node) -> usize {
    match classify(node) {
        DomKind::Text(text) => text.chars().count(),
        DomKind::Atomic => 1,
        DomKind::Container => children(node).map(|child| width(&child)).sum(),
        DomKind::Indicator | DomKind::Other => 0,
    }
}

/// Caret offset just before `target`, if it is under `root`.
fn offset_before(root: &web_sys::Node, target: &web_sys::Node) -> Option<usize> {
    if root.is_same_node(Some(target)) {
        return Some(0);
    }
    let mut acc = 0;
    find_before(root, target, &mut acc).then_some(acc)
}

fn find_before(parent: &web_sys::Node, target: &web_sys::Node, acc: &mut usize) -> bool {
    for child in children(parent) {
        if child.is_same_node(Some(target)) {
            return true;
        }
        match classify(&child) {
            DomKind::Text(text) => *acc += text.chars().count(),
            DomKind::Atomic => *acc += 1,
            DomKind::Container => {
                if find_before(&child, target, acc) {
                    return true;
                }
            }
            DomKind::Indicator | DomKind::Other => {}
        }
    }
    false
}

/// The atomic element containing `node`, if any, below `root`.
fn enclosing_token(root: &web_sys::Node, node: &web_sys::Node) -> Option<web_sys::Node> {
    let mut current = Some(node.clone());
    while let Some(candidate) = current {
        if candidate.is_same_node(Some(root)) {
            return None;
        }
        if matches!(classify(&candidate), DomKind::Atomic) {
            return Some(candidate);
        }
        current = candidate.parent_node();
    }
    None
}

/// Flat caret offset of a DOM position below `root`.
///
/// Positions inside a variable token land just after it.
pub fn caret_offset_in_dom(
    root: &web_sys::Node,
    node: &web_sys::Node,
    offset: u32,
) -> Option<usize> {
    if let Some(token) = enclosing_token(root, node) {
        return offset_before(root, &token).map(|before| before + 1);
    }
    match classify(node) {
        DomKind::Text(text) => Some(offset_before(root, node)? + utf16_to_chars(&text, offset)),
        _ => match node.child_nodes().item(offset) {
            Some(child) => offset_before(root, &child),
            None => Some(offset_before(root, node)? + width(node)),
        },
    }
}

/// DOM position for a flat caret offset below `root`.
///
/// Offsets on a text boundary resolve into the earlier text node.
pub fn dom_point_at_caret_offset(root: &web_sys::Node, target: usize) -> Option<(web_sys::Node, u32)> {
    let mut acc = 0;
    find_point(root, target, &mut acc)
        .or_else(|| (target == acc).then(|| (root.clone(), root.child_nodes().length())))
}

fn find_point(parent: &web_sys::Node, target: usize, acc: &mut usize) -> Option<(web_sys::Node, u32)> {
    for (index, child) in children(parent).enumerate() {
        match classify(&child) {
            DomKind::Text(text) => {
                let len = text.chars().count();
                if target <= *acc + len {
                    let units = chars_to_utf16(&text, target - *acc);
                    return Some((child, units));
                }
                *acc += len;
            }
            DomKind::Atomic => {
                if target == *acc {
                    return Some((parent.clone(), index as u32));
                }
                *acc += 1;
            }
            DomKind::Container => {
                if let Some(found) = find_point(&child, target, acc) {
                    return Some(found);
                }
            }
            DomKind::Indicator | DomKind::Other => {}
        }
    }
    None
}
