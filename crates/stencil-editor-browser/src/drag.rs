//! Drag event handling for the editor and the variable list.
//!
//! The editable surface forwards `dragenter`/`dragover`/`dragleave`/`drop`
//! to the editor's drag controller and re-renders after each, so the drop
//! indicator the controller places shows up in the DOM.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use stencil_editor_core::drag::{DRAG_MIME, drag_start};
use stencil_editor_core::{
    DragResponse, DragState, EditorConfig, PlatformError, Point, TemplateEditor,
    VariableDescriptor, selection,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::dom_sync;
use crate::environment::BrowserEnvironment;

/// Pointer location of a drag event in viewport coordinates.
pub fn event_point(evt: &web_sys::DragEvent) -> Point {
    Point::new(evt.client_x() as f64, evt.client_y() as f64)
}

/// Apply the controller's verdict to the browser event.
pub fn apply_response(evt: &web_sys::DragEvent, response: DragResponse) {
    if response.prevent_default {
        evt.prevent_default();
    }
    if let Some(effect) = response.drop_effect {
        if let Some(data_transfer) = evt.data_transfer() {
            data_transfer.set_drop_effect(effect.as_str());
        }
    }
}

fn rerender(env: &BrowserEnvironment, editor: &TemplateEditor) {
    if let Err(e) = dom_sync::render(env.editor_id(), editor) {
        tracing::debug!(target: "stencil::browser", error = %e, "re-render after drag event failed");
    }
}

pub fn handle_drag_enter(
    editor: &mut TemplateEditor,
    env: &BrowserEnvironment,
    evt: &web_sys::DragEvent,
) {
    // Pick up typing done since the last sync. Only at the start of a
    // gesture: enter also fires when crossing into child elements.
    if editor.drag_state() == DragState::Idle {
        if let Err(e) = dom_sync::sync_from_dom(env.editor_id(), editor) {
            tracing::debug!(target: "stencil::browser", error = %e, "sync before drag failed");
        }
    }
    apply_response(evt, editor.drag_enter(env));
}

pub fn handle_drag_over(
    editor: &mut TemplateEditor,
    env: &BrowserEnvironment,
    evt: &web_sys::DragEvent,
) {
    let response = editor.drag_over(env, event_point(evt));
    apply_response(evt, response);
    rerender(env, editor);
}

pub fn handle_drag_leave(
    editor: &mut TemplateEditor,
    env: &BrowserEnvironment,
    evt: &web_sys::DragEvent,
) {
    let response = editor.drag_leave(env, event_point(evt));
    apply_response(evt, response);
    rerender(env, editor);
}

/// Handle a drop. Returns whether a variable was inserted.
pub fn handle_drop(
    editor: &mut TemplateEditor,
    env: &BrowserEnvironment,
    evt: &web_sys::DragEvent,
) -> bool {
    evt.prevent_default();
    let payload = evt
        .data_transfer()
        .and_then(|data_transfer| data_transfer.get_data(DRAG_MIME).ok())
        .unwrap_or_default();

    let result = editor.drop(env, event_point(evt), &payload);
    rerender(env, editor);
    match result {
        Ok(token) => {
            // The re-render replaced the nodes the caret was placed on.
            selection::place_caret_after(env, editor.document(), token);
            true
        }
        Err(e) => {
            tracing::debug!(target: "stencil::browser", error = %e, "drop ignored");
            false
        }
    }
}

/// Roll back an abandoned gesture. Wire to `dragend` on the document.
pub fn handle_drag_cancel(editor: &mut TemplateEditor, env: &BrowserEnvironment) {
    if editor.drag_state() == DragState::Idle && editor.document().drop_indicators().is_empty() {
        return;
    }
    editor.drag_cancel(env);
    rerender(env, editor);
}

/// Event listeners keeping an element wired as a drop target.
/// Dropping this detaches them.
pub struct DropTargetListeners {
    _listeners: Vec<EventListener>,
}

/// Wire the editor element's drag events to `editor`.
pub fn attach_drop_target(
    editor: Rc<RefCell<TemplateEditor>>,
    env: Rc<BrowserEnvironment>,
) -> Result<DropTargetListeners, PlatformError> {
    let element = env.editor_element().ok_or("editor element not found")?;
    let document = web_sys::window()
        .ok_or("no window")?
        .document()
        .ok_or("no document")?;

    let listeners = vec![
        listen(&element, "dragenter", &editor, &env, handle_drag_enter),
        listen(&element, "dragover", &editor, &env, handle_drag_over),
        listen(&element, "dragleave", &editor, &env, handle_drag_leave),
        listen(&element, "drop", &editor, &env, |editor, env, evt| {
            handle_drop(editor, env, evt);
        }),
        listen(&document, "dragend", &editor, &env, |editor, env, _| {
            handle_drag_cancel(editor, env);
        }),
    ];
    Ok(DropTargetListeners {
        _listeners: listeners,
    })
}

fn listen<F>(
    target: &web_sys::EventTarget,
    event_type: &'static str,
    editor: &Rc<RefCell<TemplateEditor>>,
    env: &Rc<BrowserEnvironment>,
    handler: F,
) -> EventListener
where
    F: Fn(&mut TemplateEditor, &BrowserEnvironment, &web_sys::DragEvent) + 'static,
{
    let editor = editor.clone();
    let env = env.clone();
    EventListener::new_with_options(
        target,
        event_type,
        EventListenerOptions::enable_prevent_default(),
        move |event| {
            let Some(evt) = event.dyn_ref::<web_sys::DragEvent>() else {
                return;
            };
            let Ok(mut editor) = editor.try_borrow_mut() else {
                tracing::debug!(target: "stencil::browser", event_type, "editor busy, drag event skipped");
                return;
            };
            handler(&mut editor, &env, evt);
        },
    )
}

/// Producer side: start dragging a variable from the host's list.
///
/// Sets the payload and allowed effect, and uses a translucent clone of the
/// dragged element as the drag image. The clone is removed on the next tick,
/// once the browser has taken its snapshot.
pub fn handle_variable_drag_start(
    evt: &web_sys::DragEvent,
    descriptor: &VariableDescriptor,
    config: &EditorConfig,
) -> Result<(), PlatformError> {
    let start = drag_start(descriptor, config).map_err(|e| format!("encoding drag payload failed: {}", e))?;
    let data_transfer = evt.data_transfer().ok_or("drag event has no data transfer")?;
    data_transfer
        .set_data(start.mime, &start.data)
        .map_err(|e| format!("set_data failed: {:?}", e))?;
    data_transfer.set_effect_allowed(start.effect_allowed.as_str());

    let source = evt
        .target()
        .and_then(|target| target.dyn_into::<web_sys::HtmlElement>().ok())
        .ok_or("drag source is not an element")?;
    let image = source
        .clone_node_with_deep(true)
        .map_err(|e| format!("clone_node failed: {:?}", e))?
        .dyn_into::<web_sys::HtmlElement>()
        .map_err(|_| "cloned drag source is not an element")?;

    let style = image.style();
    let opacity = start.image_opacity.to_string();
    for (name, value) in [
        ("opacity", opacity.as_str()),
        ("position", "absolute"),
        ("top", "-1000px"),
    ] {
        style
            .set_property(name, value)
            .map_err(|e| format!("set_property {} failed: {:?}", name, e))?;
    }

    let window = web_sys::window().ok_or("no window")?;
    let body = window
        .document()
        .and_then(|document| document.body())
        .ok_or("no document body")?;
    body.append_child(&image)
        .map_err(|e| format!("append_child failed: {:?}", e))?;
    data_transfer.set_drag_image(&image, 0, 0);

    let remove = Closure::once_into_js(move || image.remove());
    window
        .set_timeout_with_callback_and_timeout_and_arguments_0(remove.unchecked_ref(), 0)
        .map_err(|e| format!("set_timeout failed: {:?}", e))?;

    tracing::trace!(target: "stencil::browser", name = %descriptor.name, "variable drag started");
    Ok(())
}
