//! In-memory platform for running the editor without a rendering environment.
//!
//! Pointer hits are resolved through a table of `Point -> caret offset`
//! entries registered up front, so a test can say "a drop at (40, 10) lands
//! after the sixth character" without any layout engine.

use std::cell::{Cell, RefCell};

use crate::document::{Document, Position};
use crate::platform::{ClipboardPlatform, DropPlatform, PlatformError, Point, Rect, SelectionPlatform};
use crate::selection::SelectionState;

#[derive(Debug, Default)]
pub struct MemoryPlatform {
    selection: RefCell<Option<SelectionState>>,
    clipboard: RefCell<Option<String>>,
    clipboard_denied: Cell<bool>,
    hit_table: RefCell<Vec<(Point, usize)>>,
    bounds: Cell<Option<Rect>>,
    drop_target_active: Cell<bool>,
}

impl MemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the editor bounding box used for drag-leave checks.
    pub fn with_bounds(self, bounds: Rect) -> Self {
        self.bounds.set(Some(bounds));
        self
    }

    /// Make `point` resolve to the given flat caret offset.
    pub fn map_point(&self, point: Point, caret_offset: usize) {
        let mut table = self.hit_table.borrow_mut();
        table.retain(|(p, _)| *p != point);
        table.push((point, caret_offset));
    }

    /// Make clipboard writes fail, as when the page lacks permission.
    pub fn deny_clipboard(&self) {
        self.clipboard_denied.set(true);
    }

    pub fn selection(&self) -> Option<SelectionState> {
        *self.selection.borrow()
    }

    pub fn clear_selection(&self) {
        self.selection.replace(None);
    }

    pub fn clipboard(&self) -> Option<String> {
        self.clipboard.borrow().clone()
    }

    pub fn is_drop_target_active(&self) -> bool {
        self.drop_target_active.get()
    }
}

impl SelectionPlatform for MemoryPlatform {
    fn get_selection(&self, doc: &Document) -> Option<SelectionState> {
        let selection = (*self.selection.borrow())?;
        // Like a live selection, it disappears with its nodes.
        (doc.is_attached(selection.anchor.node) && doc.is_attached(selection.focus.node))
            .then_some(selection)
    }

    fn set_selection(
        &self,
        doc: &Document,
        selection: &SelectionState,
    ) -> Result<(), PlatformError> {
        for position in [selection.anchor, selection.focus] {
            if doc.resolve_position(position) != Some(position) {
                return Err(format!("invalid selection endpoint {:?}", position).into());
            }
        }
        self.selection.replace(Some(*selection));
        Ok(())
    }
}

impl ClipboardPlatform for MemoryPlatform {
    fn set_clipboard_text(&self, text: &str) -> Result<(), PlatformError> {
        if self.clipboard_denied.get() {
            return Err("clipboard access denied".into());
        }
        self.clipboard.replace(Some(text.to_string()));
        Ok(())
    }
}

impl DropPlatform for MemoryPlatform {
    fn resolve_point(&self, doc: &Document, point: Point) -> Option<Position> {
        let offset = self
            .hit_table
            .borrow()
            .iter()
            .find(|(p, _)| *p == point)
            .map(|(_, offset)| *offset)?;
        doc.position_at_caret_offset(offset)
    }

    fn editor_bounds(&self) -> Option<Rect> {
        self.bounds.get()
    }

    fn set_drop_target_active(&self, active: bool) {
        self.drop_target_active.set(active);
    }
}
