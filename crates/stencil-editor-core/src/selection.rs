//! Selection capture and restore across document mutations.
//!
//! A `SelectionState` holds node handles plus offsets. Restoring only works
//! while those nodes are still attached; when a mutation replaced them the
//! restore is a logged no-op and the caller carries on without a cursor.

use crate::document::{Document, NodeId, Position};
use crate::error::EditorError;
use crate::platform::SelectionPlatform;

/// Anchor and focus of a selection, in tree coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionState {
    pub anchor: Position,
    pub focus: Position,
}

impl SelectionState {
    pub fn new(anchor: Position, focus: Position) -> Self {
        Self { anchor, focus }
    }

    /// An empty selection (caret) at `position`.
    pub fn collapsed(position: Position) -> Self {
        Self {
            anchor: position,
            focus: position,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

/// Read the current selection. None means there's nothing to restore later.
pub fn capture<P: SelectionPlatform + ?Sized>(platform: &P, doc: &Document) -> Option<SelectionState> {
    let state = platform.get_selection(doc);
    if state.is_none() {
        tracing::trace!(target: "stencil::selection", "no active selection to capture");
    }
    state
}

/// Re-establish a captured selection, failing if its nodes went away.
pub fn try_restore<P: SelectionPlatform + ?Sized>(
    platform: &P,
    doc: &Document,
    state: &SelectionState,
) -> Result<(), EditorError> {
    for (which, position) in [("anchor", state.anchor), ("focus", state.focus)] {
        if !doc.is_attached(position.node) {
            return Err(EditorError::SelectionUnavailable(format!(
                "{which} node {} is no longer attached",
                position.node
            )));
        }
        if position.offset > doc.max_offset(position.node) {
            return Err(EditorError::SelectionUnavailable(format!(
                "{which} offset {} out of range for {}",
                position.offset, position.node
            )));
        }
    }
    platform
        .set_selection(doc, state)
        .map_err(|e| EditorError::SelectionUnavailable(e.to_string()))
}

/// Re-establish a captured selection. Failures are logged, never raised.
pub fn restore<P: SelectionPlatform + ?Sized>(platform: &P, doc: &Document, state: &SelectionState) {
    if let Err(e) = try_restore(platform, doc, state) {
        tracing::debug!(target: "stencil::selection", error = %e, "selection restore skipped");
    }
}

/// Collapse the selection to just after `node`.
pub fn place_caret_after<P: SelectionPlatform + ?Sized>(platform: &P, doc: &Document, node: NodeId) {
    let Some(position) = doc.position_after(node) else {
        tracing::debug!(target: "stencil::selection", %node, "node has no parent, caret not placed");
        return;
    };
    restore(platform, doc, &SelectionState::collapsed(position));
}

/// Capture the selection, run `mutate`, then restore.
///
/// `mutate` holds the only mutable borrow of the document for the whole
/// capture/restore pair, so nothing else can reshape the tree in between.
pub fn with_preserved_selection<P, F, R>(platform: &P, doc: &mut Document, mutate: F) -> R
where
    P: SelectionPlatform + ?Sized,
    F: FnOnce(&mut Document) -> R,
{
    let saved = capture(platform, doc);
    let result = mutate(doc);
    if let Some(saved) = saved {
        restore(platform, doc, &saved);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::VariableToken;
    use crate::memory::MemoryPlatform;

    fn doc_with_text(text: &str) -> (Document, NodeId) {
        let mut doc = Document::new();
        let id = doc.create_text(text);
        doc.append_child(doc.root(), id);
        (doc, id)
    }

    #[test]
    fn test_capture_without_selection_is_none() {
        let (doc, _) = doc_with_text("abc");
        let platform = MemoryPlatform::new();
        assert_eq!(capture(&platform, &doc), None);
    }

    #[test]
    fn test_capture_restore_round_trip() {
        let (doc, text) = doc_with_text("abcdef");
        let platform = MemoryPlatform::new();
        let state = SelectionState::new(Position::new(text, 1), Position::new(text, 4));
        platform.set_selection(&doc, &state).unwrap();

        let saved = capture(&platform, &doc).unwrap();
        platform.clear_selection();
        restore(&platform, &doc, &saved);
        assert_eq!(platform.selection(), Some(state));
    }

    #[test]
    fn test_restore_with_detached_node_is_silent_noop() {
        let (mut doc, text) = doc_with_text("abcdef");
        let platform = MemoryPlatform::new();
        let state = SelectionState::collapsed(Position::new(text, 2));
        platform.set_selection(&doc, &state).unwrap();
        let saved = capture(&platform, &doc).unwrap();

        doc.remove(text);
        platform.clear_selection();
        restore(&platform, &doc, &saved);
        assert_eq!(platform.selection(), None);
        assert!(matches!(
            try_restore(&platform, &doc, &saved),
            Err(EditorError::SelectionUnavailable(_))
        ));
    }

    #[test]
    fn test_restore_rejects_offset_past_end() {
        let (mut doc, text) = doc_with_text("abcdef");
        let platform = MemoryPlatform::new();
        let saved = SelectionState::collapsed(Position::new(text, 6));
        if let Some(crate::document::NodeKind::Text(t)) = doc.kind_mut(text) {
            t.truncate(2);
        }
        assert!(try_restore(&platform, &doc, &saved).is_err());
    }

    #[test]
    fn test_place_caret_after_token() {
        let (mut doc, text) = doc_with_text("ab");
        let token = doc.create_variable(VariableToken::new("date", "日期"));
        doc.insert_at(Position::new(text, 1), token);
        let platform = MemoryPlatform::new();
        place_caret_after(&platform, &doc, token);
        let sel = platform.selection().unwrap();
        assert!(sel.is_collapsed());
        assert_eq!(sel.anchor, Position::new(doc.root(), 2));
    }

    #[test]
    fn test_preserved_selection_survives_unrelated_mutation() {
        let (mut doc, text) = doc_with_text("abc");
        let platform = MemoryPlatform::new();
        let state = SelectionState::collapsed(Position::new(text, 3));
        platform.set_selection(&doc, &state).unwrap();

        let appended = with_preserved_selection(&platform, &mut doc, |doc| {
            let extra = doc.create_text("!");
            doc.append_child(doc.root(), extra);
            platform.clear_selection();
            extra
        });
        assert!(doc.is_attached(appended));
        assert_eq!(platform.selection(), Some(state));
    }
}
