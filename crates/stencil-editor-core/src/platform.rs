//! Platform abstraction traits for editor operations.
//!
//! These traits define the interface between the editor logic and the
//! environment hosting the editable surface (browser DOM, test fakes). The
//! core never touches global selection or clipboard state directly; it asks
//! the platform, so the same logic runs against `MemoryPlatform` in tests.

use crate::document::{Document, Position};
use crate::selection::SelectionState;

/// Error type for platform operations.
#[derive(Debug, Clone)]
pub struct PlatformError(pub String);

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PlatformError {}

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// A pointer location in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Edges count as inside.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x <= self.right && point.y >= self.top && point.y <= self.bottom
    }
}

/// Platform-specific selection access.
///
/// Selection endpoints are document positions, not flat offsets. The
/// platform maps between its own node handles and the document tree.
pub trait SelectionPlatform {
    /// Read the active selection, if any.
    fn get_selection(&self, doc: &Document) -> Option<SelectionState>;

    /// Replace the active selection.
    fn set_selection(&self, doc: &Document, selection: &SelectionState)
    -> Result<(), PlatformError>;
}

/// Platform clipboard access.
pub trait ClipboardPlatform {
    fn set_clipboard_text(&self, text: &str) -> Result<(), PlatformError>;
}

/// Platform support for drop targeting.
pub trait DropPlatform {
    /// Map a pointer location to an insertion point in the document.
    fn resolve_point(&self, doc: &Document, point: Point) -> Option<Position>;

    /// Bounding box of the editable surface.
    fn editor_bounds(&self) -> Option<Rect>;

    /// Toggle the visual "drop target" marker on the editable surface.
    fn set_drop_target_active(&self, active: bool);
}
