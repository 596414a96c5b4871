//! stencil-editor-core: template editing logic without a rendering environment.
//!
//! This crate provides:
//! - `Document` - arena tree with atomic variable tokens and a drop indicator
//! - Conversion between `${name}` raw text and the document
//! - Validation and normalization of template content
//! - Selection capture/restore and drag-and-drop insertion, generic over
//!   the platform traits in [`platform`]
//! - `TemplateEditor` - a session tying it together for a host

pub mod config;
pub mod convert;
pub mod document;
pub mod drag;
pub mod editor;
pub mod error;
pub mod markup;
pub mod memory;
pub mod normalize;
pub mod platform;
pub mod preview;
pub mod selection;
pub mod text_helpers;
pub mod validate;
pub mod variable;

pub use config::EditorConfig;
pub use convert::{placeholders, to_document, to_document_markup, to_raw_text};
pub use document::{Document, Element, NodeId, NodeKind, Position, VariableToken};
pub use drag::{DragController, DragPayload, DragResponse, DragState, DropEffect};
pub use editor::TemplateEditor;
pub use error::{EditorError, InvalidContentKind, InvalidTemplateText};
pub use memory::MemoryPlatform;
pub use normalize::normalize;
pub use platform::{ClipboardPlatform, DropPlatform, PlatformError, Point, Rect, SelectionPlatform};
pub use preview::{Preview, render_preview};
pub use selection::SelectionState;
pub use smol_str::SmolStr;
pub use validate::{is_invalid, validate};
pub use variable::{VariableDescriptor, VariableRegistry};
