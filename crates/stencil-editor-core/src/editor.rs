//! The editing session a host drives.
//!
//! `TemplateEditor` owns one document, the variable registry it was built
//! against, and the drag controller for that document. Platform handles are
//! passed per call; the editor never holds on to them.

use crate::config::EditorConfig;
use crate::convert;
use crate::document::{Document, NodeId, Position};
use crate::drag::{DragController, DragResponse, DragState};
use crate::error::EditorError;
use crate::markup;
use crate::normalize;
use crate::platform::{ClipboardPlatform, DropPlatform, Point, SelectionPlatform};
use crate::preview::{self, Preview};
use crate::selection::{self, SelectionState};
use crate::validate;
use crate::variable::VariableRegistry;

#[derive(Debug)]
pub struct TemplateEditor {
    doc: Document,
    variables: VariableRegistry,
    config: EditorConfig,
    drag: DragController,
}

impl Default for TemplateEditor {
    fn default() -> Self {
        Self::new(VariableRegistry::defaults(), EditorConfig::default())
    }
}

impl TemplateEditor {
    pub fn new(variables: VariableRegistry, config: EditorConfig) -> Self {
        Self {
            doc: Document::new(),
            variables,
            config,
            drag: DragController::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn variables(&self) -> &VariableRegistry {
        &self.variables
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn drag_state(&self) -> DragState {
        self.drag.state()
    }

    /// Swap the registry and relabel the tokens already in the document.
    pub fn set_variables(&mut self, variables: VariableRegistry) {
        self.variables = variables;
        convert::relabel_tokens(&mut self.doc, &self.variables);
    }

    /// Replace the document with raw template text.
    pub fn load(&mut self, raw: &str) {
        let markup = convert::to_document_markup(raw, &self.variables);
        self.sync_from_markup(&markup);
    }

    /// Current document as markup.
    pub fn markup(&self) -> String {
        markup::serialize(&self.doc)
    }

    /// Take over markup edited outside the core (typed text in the surface).
    pub fn sync_from_markup(&mut self, markup: &str) {
        self.drag = DragController::new();
        markup::replace_contents(&mut self.doc, markup);
    }

    /// Raw text of the document as it stands, without normalizing.
    pub fn raw_text(&self) -> String {
        convert::to_raw_text(&self.doc)
    }

    /// Normalize the document in place, keeping the caret where possible.
    ///
    /// Normalization rebuilds every node, so a captured selection would no
    /// longer resolve. As a best effort it is carried over as flat caret
    /// offsets instead: cleanup that removes text before the caret (collapsed
    /// spaces, dropped breaks) shifts it, and offsets past the new end are
    /// clamped. Returns the selection as restored, for hosts that re-render
    /// and need to apply it again.
    pub fn normalize<P: SelectionPlatform + ?Sized>(&mut self, platform: &P) -> Option<SelectionState> {
        let saved = selection::capture(platform, &self.doc).and_then(|state| {
            Some((
                self.doc.caret_offset_of(state.anchor)?,
                self.doc.caret_offset_of(state.focus)?,
            ))
        });
        normalize::normalize_in_place(&mut self.doc);

        let (anchor, focus) = saved?;
        let len = self.doc.caret_len();
        let restored = self
            .doc
            .position_at_caret_offset(anchor.min(len))
            .zip(self.doc.position_at_caret_offset(focus.min(len)));
        match restored {
            Some((anchor, focus)) => {
                let state = SelectionState::new(anchor, focus);
                selection::restore(platform, &self.doc, &state);
                Some(state)
            }
            None => {
                tracing::debug!(
                    target: "stencil::selection",
                    anchor,
                    focus,
                    "selection lost in normalization"
                );
                None
            }
        }
    }

    /// Normalize, convert, validate.
    ///
    /// Works on a copy; the live document is left alone.
    pub fn export(&self) -> Result<String, EditorError> {
        let raw = convert::to_raw_text(&normalize::normalize_document(&self.doc));
        let malformed = convert::malformed_tokens(&self.doc);
        if !malformed.is_empty() {
            tracing::warn!(
                target: "stencil::convert",
                count = malformed.len(),
                "exporting variable tokens without a usable name as ${{}}"
            );
        }
        validate::validate(&raw)?;
        Ok(raw)
    }

    /// Insert a token for `name` at the caret, or at the end of the document
    /// when nothing is selected. The caret ends up right after the token.
    ///
    /// Names missing from the registry get a token labelled with the name.
    pub fn insert_variable<P: SelectionPlatform + ?Sized>(
        &mut self,
        platform: &P,
        name: &str,
    ) -> NodeId {
        let descriptor = self
            .variables
            .get(name)
            .cloned()
            .unwrap_or_else(|| crate::variable::VariableDescriptor::new(name, name, "", ""));
        let token = convert::create_token(&mut self.doc, &descriptor);

        let root = self.doc.root();
        let end = Position::new(root, self.doc.children(root).len());
        let at = selection::capture(platform, &self.doc)
            .map(|state| state.focus)
            .unwrap_or(end);
        if !self.doc.insert_at(at, token) {
            self.doc.insert_at(end, token);
        }
        selection::place_caret_after(platform, &self.doc, token);
        token
    }

    /// Put the raw text on the clipboard. Returns whether that worked.
    pub fn copy_raw_text<C: ClipboardPlatform + ?Sized>(&self, clipboard: &C) -> bool {
        match clipboard.set_clipboard_text(&self.raw_text()) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(target: "stencil::editor", error = %e, "copy to clipboard failed");
                false
            }
        }
    }

    /// Preview of the normalized raw text.
    pub fn preview(&self) -> Preview {
        let raw = convert::to_raw_text(&normalize::normalize_document(&self.doc));
        preview::render_preview_with_rng(&raw, &self.variables, &self.config, &mut rand::rng())
    }

    // === Drag forwarding ===

    pub fn drag_enter<P: DropPlatform + ?Sized>(&mut self, platform: &P) -> DragResponse {
        self.drag.drag_enter(platform)
    }

    pub fn drag_over<P: DropPlatform + ?Sized>(&mut self, platform: &P, point: Point) -> DragResponse {
        self.drag.drag_over(&mut self.doc, platform, point)
    }

    pub fn drag_leave<P: DropPlatform + ?Sized>(&mut self, platform: &P, point: Point) -> DragResponse {
        self.drag.drag_leave(&mut self.doc, platform, point)
    }

    pub fn drop<P: DropPlatform + SelectionPlatform + ?Sized>(
        &mut self,
        platform: &P,
        point: Point,
        payload: &str,
    ) -> Result<NodeId, EditorError> {
        self.drag.drop(&mut self.doc, platform, point, payload)
    }

    pub fn drag_cancel<P: DropPlatform + ?Sized>(&mut self, platform: &P) {
        self.drag.cancel(&mut self.doc, platform)
    }
}
