//! Browser DOM layer for the stencil template editor.
//!
//! This crate implements the core's platform traits against the live DOM
//! and wires drag events to the editor. It assumes a
//! `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `environment`: Selection API and pointer hit-testing
//! - `dom_sync`: document ↔ DOM markup synchronization
//! - `clipboard`: async Clipboard API writes
//! - `drag`: drag event handlers for the editable surface and variable list
//!
//! # Re-exports
//!
//! This crate re-exports `stencil-editor-core` for convenience, so consumers
//! only need to depend on `stencil-editor-browser`.

// Re-export core crate
pub use stencil_editor_core;
pub use stencil_editor_core::*;

pub mod clipboard;
pub mod dom_sync;
pub mod drag;
pub mod environment;

pub use clipboard::BrowserClipboard;
pub use drag::{DropTargetListeners, attach_drop_target, handle_variable_drag_start};
pub use environment::BrowserEnvironment;
