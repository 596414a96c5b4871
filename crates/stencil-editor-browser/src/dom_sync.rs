//! DOM synchronization for the template editor.
//!
//! The editable element's `innerHTML` is the rendered document. User typing
//! edits the DOM directly; `sync_from_dom` pulls those edits into the
//! editor before any core operation, `render` pushes the document back after
//! the core changed it.

use stencil_editor_core::{PlatformError, SelectionPlatform, TemplateEditor, selection};

/// Replace the editor element's contents with the document markup.
///
/// Returns false, leaving the DOM untouched, when it already matches.
pub fn render(editor_id: &str, editor: &TemplateEditor) -> Result<bool, PlatformError> {
    let element = editor_element(editor_id)?;
    let markup = editor.markup();
    if element.inner_html() == markup {
        return Ok(false);
    }
    element.set_inner_html(&markup);
    Ok(true)
}

/// Current markup of the editor element.
pub fn read_markup(editor_id: &str) -> Result<String, PlatformError> {
    Ok(editor_element(editor_id)?.inner_html())
}

/// Pull the DOM contents into the editor.
///
/// Returns false when the DOM already matches the document.
pub fn sync_from_dom(editor_id: &str, editor: &mut TemplateEditor) -> Result<bool, PlatformError> {
    let markup = read_markup(editor_id)?;
    if markup == editor.markup() {
        return Ok(false);
    }
    tracing::trace!(
        target: "stencil::browser",
        len = markup.len(),
        "syncing document from DOM"
    );
    editor.sync_from_markup(&markup);
    Ok(true)
}

/// Load raw template text into the editor and render it.
pub fn load_raw(editor_id: &str, editor: &mut TemplateEditor, raw: &str) -> Result<(), PlatformError> {
    editor.load(raw);
    render(editor_id, editor)?;
    Ok(())
}

/// Normalize the document, re-render, and put the caret back.
///
/// `innerHTML` replaces every node, so the selection the core restored is
/// applied a second time against the new DOM.
pub fn normalize_and_render<P: SelectionPlatform + ?Sized>(
    editor_id: &str,
    editor: &mut TemplateEditor,
    platform: &P,
) -> Result<(), PlatformError> {
    sync_from_dom(editor_id, editor)?;
    let restored = editor.normalize(platform);
    render(editor_id, editor)?;
    if let Some(state) = restored {
        selection::restore(platform, editor.document(), &state);
    }
    Ok(())
}

fn editor_element(editor_id: &str) -> Result<web_sys::Element, PlatformError> {
    web_sys::window()
        .ok_or("no window")?
        .document()
        .ok_or("no document")?
        .get_element_by_id(editor_id)
        .ok_or_else(|| format!("editor element not found: {}", editor_id).into())
}
