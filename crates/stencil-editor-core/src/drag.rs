//! Drag-and-drop insertion of variable tokens.
//!
//! One `DragController` per editable document. It owns the drop indicator
//! while a drag is over the document and guarantees there is never more than
//! one of them: every drag-over removes the old indicator before placing a
//! new one, and every way out of `DragActive` (drop, true leave, cancel)
//! removes it.
//!
//! Transitions:
//!
//! | state      | event          | next       |
//! |------------|----------------|------------|
//! | any        | enter / over   | DragActive |
//! | DragActive | leave (inside) | DragActive |
//! | Idle       | leave (inside) | Idle       |
//! | any        | leave (outside)| Idle       |
//! | any        | drop / cancel  | Idle       |

use serde::de::Error as _;

use crate::config::EditorConfig;
use crate::convert;
use crate::document::{Document, NodeId};
use crate::error::EditorError;
use crate::platform::{DropPlatform, Point, SelectionPlatform};
use crate::selection;
use crate::variable::VariableDescriptor;

/// MIME type of the drag payload.
pub const DRAG_MIME: &str = "text/plain";

/// Opacity of the translucent drag image.
pub const DRAG_IMAGE_OPACITY: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    DragActive,
}

/// Events driving the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEventKind {
    Enter,
    Over,
    /// Leave fired while the pointer is still inside the editor, i.e. it
    /// moved onto a descendant element.
    LeaveInside,
    LeaveOutside,
    Drop,
    Cancel,
}

impl DragState {
    pub fn next(self, event: DragEventKind) -> DragState {
        use DragEventKind::*;
        match (self, event) {
            (_, Enter | Over) => DragState::DragActive,
            (state, LeaveInside) => state,
            (_, LeaveOutside | Drop | Cancel) => DragState::Idle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropEffect {
    None,
    Copy,
}

impl DropEffect {
    pub fn as_str(self) -> &'static str {
        match self {
            DropEffect::None => "none",
            DropEffect::Copy => "copy",
        }
    }
}

/// What the host should do with the event it just forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragResponse {
    pub prevent_default: bool,
    pub drop_effect: Option<DropEffect>,
}

impl DragResponse {
    /// Suppress the browser default, leave the drop effect alone.
    pub const HANDLED: DragResponse = DragResponse {
        prevent_default: true,
        drop_effect: None,
    };

    /// Let the browser do its thing.
    pub const PASS_THROUGH: DragResponse = DragResponse {
        prevent_default: false,
        drop_effect: None,
    };

    /// Suppress the default and advertise a copy.
    pub const COPY: DragResponse = DragResponse {
        prevent_default: true,
        drop_effect: Some(DropEffect::Copy),
    };
}

/// Drag payload wire format: the descriptor as JSON.
pub struct DragPayload;

impl DragPayload {
    pub fn encode(descriptor: &VariableDescriptor) -> serde_json::Result<String> {
        serde_json::to_string(descriptor)
    }

    /// Parse a payload. Foreign payloads (plain text, other apps' JSON) fail here.
    pub fn decode(payload: &str) -> Result<VariableDescriptor, EditorError> {
        let descriptor: VariableDescriptor =
            serde_json::from_str(payload).map_err(EditorError::MalformedDragPayload)?;
        if descriptor.name.is_empty() {
            return Err(EditorError::MalformedDragPayload(serde_json::Error::custom(
                "variable name is empty",
            )));
        }
        Ok(descriptor)
    }
}

/// Producer-side setup for dragging a variable out of the host's list.
#[derive(Debug, Clone, PartialEq)]
pub struct DragStart {
    pub mime: &'static str,
    pub data: String,
    pub effect_allowed: DropEffect,
    pub image_opacity: f64,
}

pub fn drag_start(
    descriptor: &VariableDescriptor,
    config: &EditorConfig,
) -> serde_json::Result<DragStart> {
    Ok(DragStart {
        mime: DRAG_MIME,
        data: DragPayload::encode(descriptor)?,
        effect_allowed: DropEffect::Copy,
        image_opacity: config.drag_image_opacity,
    })
}

/// Drag lifecycle for a single document.
#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
    indicator: Option<NodeId>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    /// The live drop indicator, if one is placed.
    pub fn indicator(&self) -> Option<NodeId> {
        self.indicator
    }

    pub fn drag_enter<P: DropPlatform + ?Sized>(&mut self, platform: &P) -> DragResponse {
        self.state = self.state.next(DragEventKind::Enter);
        platform.set_drop_target_active(true);
        DragResponse::HANDLED
    }

    /// Move the drop indicator to the position under the pointer.
    ///
    /// If the pointer doesn't resolve to a position the old indicator is
    /// still removed and none is placed.
    pub fn drag_over<P: DropPlatform + ?Sized>(
        &mut self,
        doc: &mut Document,
        platform: &P,
        point: Point,
    ) -> DragResponse {
        if self.state == DragState::Idle {
            platform.set_drop_target_active(true);
        }
        self.state = self.state.next(DragEventKind::Over);
        self.clear_indicator(doc);

        let Some(position) = platform.resolve_point(doc, point) else {
            tracing::trace!(target: "stencil::drag", ?point, "drag-over outside any text position");
            return DragResponse::COPY;
        };
        let indicator = doc.create_drop_indicator();
        if doc.insert_at(position, indicator) {
            self.indicator = Some(indicator);
        } else {
            doc.remove(indicator);
        }
        DragResponse::COPY
    }

    /// Handle drag-leave. Only a pointer outside the editor bounds ends the drag;
    /// leave events from moving onto child elements are ignored.
    pub fn drag_leave<P: DropPlatform + ?Sized>(
        &mut self,
        doc: &mut Document,
        platform: &P,
        point: Point,
    ) -> DragResponse {
        let inside = platform
            .editor_bounds()
            .is_some_and(|bounds| bounds.contains(point));
        if inside {
            self.state = self.state.next(DragEventKind::LeaveInside);
        } else {
            self.reset(doc, platform, DragEventKind::LeaveOutside);
        }
        DragResponse::PASS_THROUGH
    }

    /// Insert the dragged variable at the drop point.
    ///
    /// On failure the document is left as it was before the drag started
    /// (the indicator is gone either way) and the error says why.
    pub fn drop<P: DropPlatform + SelectionPlatform + ?Sized>(
        &mut self,
        doc: &mut Document,
        platform: &P,
        point: Point,
        payload: &str,
    ) -> Result<NodeId, EditorError> {
        // The indicator goes first so the pointer resolves against the
        // document as it will be without it.
        self.reset(doc, platform, DragEventKind::Drop);

        let descriptor = DragPayload::decode(payload).inspect_err(|e| {
            tracing::debug!(target: "stencil::drag", error = %e, "ignoring foreign drop");
        })?;

        let unresolvable = EditorError::UnresolvableDropPosition {
            x: point.x,
            y: point.y,
        };
        let Some(position) = platform.resolve_point(doc, point) else {
            tracing::debug!(target: "stencil::drag", ?point, "drop outside any text position");
            return Err(unresolvable);
        };

        let token = convert::create_token(doc, &descriptor);
        if !doc.insert_at(position, token) {
            doc.remove(token);
            return Err(unresolvable);
        }
        selection::place_caret_after(platform, doc, token);
        tracing::debug!(target: "stencil::drag", name = %descriptor.name, "variable dropped");
        Ok(token)
    }

    /// The browser abandoned the gesture (escape, drop elsewhere).
    pub fn cancel<P: DropPlatform + ?Sized>(&mut self, doc: &mut Document, platform: &P) {
        self.reset(doc, platform, DragEventKind::Cancel);
    }

    fn reset<P: DropPlatform + ?Sized>(&mut self, doc: &mut Document, platform: &P, event: DragEventKind) {
        self.clear_indicator(doc);
        self.state = self.state.next(event);
        platform.set_drop_target_active(false);
    }

    /// Remove every drop indicator in the document, not just the tracked one,
    /// and re-join the text the indicator split.
    fn clear_indicator(&mut self, doc: &mut Document) {
        self.indicator = None;
        for indicator in doc.drop_indicators() {
            let parent = doc.parent(indicator);
            doc.remove(indicator);
            if let Some(parent) = parent {
                doc.merge_adjacent_text(parent);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{to_document, to_raw_text};
    use crate::document::Position;
    use crate::memory::MemoryPlatform;
    use crate::platform::Rect;
    use crate::variable::VariableRegistry;

    const OVER_WORLD: Point = Point { x: 60.0, y: 10.0 };
    const OVER_START: Point = Point { x: 1.0, y: 10.0 };
    const NOWHERE: Point = Point { x: 500.0, y: 10.0 };

    fn order_no_payload() -> String {
        DragPayload::encode(&VariableDescriptor::new(
            "orderNo",
            "订单编号",
            "ORD202312250001",
            "系统生成的订单唯一编号",
        ))
        .unwrap()
    }

    fn setup(raw: &str) -> (Document, MemoryPlatform) {
        let doc = to_document(raw, &VariableRegistry::defaults());
        let platform = MemoryPlatform::new().with_bounds(Rect::new(0.0, 0.0, 200.0, 50.0));
        // "Hello |world"
        platform.map_point(OVER_WORLD, 6);
        platform.map_point(OVER_START, 0);
        (doc, platform)
    }

    #[test]
    fn test_transition_table() {
        use DragEventKind::*;
        use DragState::*;
        assert_eq!(Idle.next(Enter), DragActive);
        assert_eq!(Idle.next(Over), DragActive);
        assert_eq!(DragActive.next(Over), DragActive);
        assert_eq!(DragActive.next(LeaveInside), DragActive);
        assert_eq!(Idle.next(LeaveInside), Idle);
        assert_eq!(DragActive.next(LeaveOutside), Idle);
        assert_eq!(DragActive.next(Drop), Idle);
        assert_eq!(DragActive.next(Cancel), Idle);
    }

    #[test]
    fn test_drop_inserts_token_and_places_caret() {
        let (mut doc, platform) = setup("Hello world");
        let mut drag = DragController::new();

        drag.drag_enter(&platform);
        assert!(platform.is_drop_target_active());
        let response = drag.drag_over(&mut doc, &platform, OVER_WORLD);
        assert_eq!(response, DragResponse::COPY);

        let token = drag
            .drop(&mut doc, &platform, OVER_WORLD, &order_no_payload())
            .unwrap();
        assert_eq!(to_raw_text(&doc), "Hello ${orderNo}world");
        assert_eq!(drag.state(), DragState::Idle);
        assert!(doc.drop_indicators().is_empty());
        assert!(!platform.is_drop_target_active());

        let caret = platform.selection().unwrap();
        assert!(caret.is_collapsed());
        assert_eq!(Some(caret.anchor), doc.position_after(token));
    }

    #[test]
    fn test_repeated_drag_over_keeps_one_indicator() {
        let (mut doc, platform) = setup("Hello world");
        let mut drag = DragController::new();
        drag.drag_enter(&platform);
        for _ in 0..5 {
            drag.drag_over(&mut doc, &platform, OVER_WORLD);
            assert_eq!(doc.drop_indicators().len(), 1);
        }
        drag.drag_over(&mut doc, &platform, OVER_START);
        assert_eq!(doc.drop_indicators().len(), 1);
        assert_eq!(doc.drop_indicators().first().copied(), drag.indicator());
        // The text was rejoined between moves.
        assert_eq!(doc.children(doc.root()).len(), 2);
    }

    #[test]
    fn test_drag_over_unresolvable_point_clears_indicator() {
        let (mut doc, platform) = setup("Hello world");
        let mut drag = DragController::new();
        drag.drag_over(&mut doc, &platform, OVER_WORLD);
        drag.drag_over(&mut doc, &platform, NOWHERE);
        assert!(doc.drop_indicators().is_empty());
        assert_eq!(drag.state(), DragState::DragActive);
    }

    #[test]
    fn test_leave_inside_bounds_keeps_state() {
        let (mut doc, platform) = setup("Hello world");
        let mut drag = DragController::new();
        drag.drag_enter(&platform);
        drag.drag_over(&mut doc, &platform, OVER_WORLD);

        drag.drag_leave(&mut doc, &platform, Point::new(100.0, 25.0));
        assert_eq!(drag.state(), DragState::DragActive);
        assert_eq!(doc.drop_indicators().len(), 1);
        assert!(platform.is_drop_target_active());

        drag.drag_leave(&mut doc, &platform, Point::new(250.0, 25.0));
        assert_eq!(drag.state(), DragState::Idle);
        assert!(doc.drop_indicators().is_empty());
        assert!(!platform.is_drop_target_active());
        assert_eq!(to_raw_text(&doc), "Hello world");
        assert_eq!(doc.children(doc.root()).len(), 1);
    }

    #[test]
    fn test_malformed_payload_leaves_document_unchanged() {
        let (mut doc, platform) = setup("Hello world");
        let mut drag = DragController::new();
        drag.drag_over(&mut doc, &platform, OVER_WORLD);

        let err = drag
            .drop(&mut doc, &platform, OVER_WORLD, "just some text")
            .unwrap_err();
        assert!(matches!(err, EditorError::MalformedDragPayload(_)));
        assert_eq!(crate::markup::serialize(&doc), "Hello world");
        assert_eq!(drag.state(), DragState::Idle);
        assert_eq!(platform.selection(), None);
    }

    #[test]
    fn test_payload_without_name_is_malformed() {
        assert!(matches!(
            DragPayload::decode(r#"{"name":"","label":"x"}"#),
            Err(EditorError::MalformedDragPayload(_))
        ));
        assert!(matches!(
            DragPayload::decode(r#"{"title":"not ours"}"#),
            Err(EditorError::MalformedDragPayload(_))
        ));
    }

    #[test]
    fn test_unresolvable_drop_is_reported() {
        let (mut doc, platform) = setup("Hello world");
        let mut drag = DragController::new();
        drag.drag_over(&mut doc, &platform, OVER_WORLD);
        let err = drag
            .drop(&mut doc, &platform, NOWHERE, &order_no_payload())
            .unwrap_err();
        assert!(matches!(err, EditorError::UnresolvableDropPosition { .. }));
        assert_eq!(to_raw_text(&doc), "Hello world");
        assert!(doc.drop_indicators().is_empty());
    }

    #[test]
    fn test_cancel_rolls_back_to_idle() {
        let (mut doc, platform) = setup("Hello world");
        let mut drag = DragController::new();
        drag.drag_enter(&platform);
        drag.drag_over(&mut doc, &platform, OVER_WORLD);
        drag.cancel(&mut doc, &platform);
        assert_eq!(drag.state(), DragState::Idle);
        assert!(doc.drop_indicators().is_empty());
        assert!(drag.indicator().is_none());
        assert!(!platform.is_drop_target_active());
    }

    #[test]
    fn test_drop_next_to_existing_token() {
        let (mut doc, platform) = setup("${userName}");
        // Caret offset 1 is just after the existing token.
        platform.map_point(OVER_WORLD, 1);
        let mut drag = DragController::new();
        drag.drop(&mut doc, &platform, OVER_WORLD, &order_no_payload())
            .unwrap();
        assert_eq!(to_raw_text(&doc), "${userName}${orderNo}");
        assert_eq!(
            platform.selection().map(|s| s.anchor),
            Some(Position::new(doc.root(), 2))
        );
    }

    #[test]
    fn test_drag_start() {
        let descriptor = VariableDescriptor::new("date", "日期", "2023-12-25", "");
        let start = drag_start(&descriptor, &EditorConfig::default()).unwrap();
        assert_eq!(start.mime, "text/plain");
        assert_eq!(start.effect_allowed, DropEffect::Copy);
        assert_eq!(start.image_opacity, DRAG_IMAGE_OPACITY);
        assert_eq!(DragPayload::decode(&start.data).unwrap(), descriptor);

        let faint = EditorConfig {
            drag_image_opacity: 0.3,
            ..EditorConfig::default()
        };
        assert_eq!(drag_start(&descriptor, &faint).unwrap().image_opacity, 0.3);
    }
}
