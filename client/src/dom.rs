use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, EventTarget, HtmlCanvasElement, HtmlElement, HtmlInputElement,
    HtmlSelectElement, HtmlTextAreaElement, KeyboardEvent, PointerEvent,
};

use crate::geometry::normalize_point;
use crate::keyboard::{FocusTarget, KeyInput};
use crate::state::{Notification, NotificationKind, Point, State, Tool};

pub fn get_element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    let element = document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Missing element: {id}")))?;
    element
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("Invalid element type: {id}")))
}

/// Client coordinates to stage coordinates, accounting for CSS scaling of
/// the canvas element.
pub fn event_to_point(canvas: &HtmlCanvasElement, event: &PointerEvent) -> Option<Point> {
    let rect = canvas.get_bounding_client_rect();
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return None;
    }
    let scale_x = f64::from(canvas.width()) / rect.width();
    let scale_y = f64::from(canvas.height()) / rect.height();
    normalize_point(Point::new(
        (f64::from(event.client_x()) - rect.left()) * scale_x,
        (f64::from(event.client_y()) - rect.top()) * scale_y,
    ))
}

fn focus_target(target: Option<EventTarget>) -> FocusTarget {
    let Some(target) = target else {
        return FocusTarget::Canvas;
    };
    if target.is_instance_of::<HtmlInputElement>()
        || target.is_instance_of::<HtmlTextAreaElement>()
        || target.is_instance_of::<HtmlSelectElement>()
    {
        FocusTarget::TextField
    } else {
        FocusTarget::Canvas
    }
}

pub fn key_input(event: &KeyboardEvent) -> KeyInput {
    KeyInput {
        key: event.key(),
        ctrl: event.ctrl_key(),
        meta: event.meta_key(),
        shift: event.shift_key(),
        focus: focus_target(event.target()),
    }
}

pub fn set_canvas_cursor(canvas: &HtmlCanvasElement, tool: Tool, busy: bool) {
    let cursor = match tool {
        _ if busy => "progress",
        Tool::Select => "default",
        Tool::AiEdit => "cell",
        _ => "crosshair",
    };
    if let Ok(element) = canvas.clone().dyn_into::<HtmlElement>() {
        let _ = element.style().set_property("cursor", cursor);
    }
}

pub fn set_tool_buttons(document: &Document, state: &State) {
    for tool in Tool::ALL {
        let Some(button) = document.get_element_by_id(&format!("tool-{}", tool.as_str())) else {
            continue;
        };
        let pressed = if state.tool() == tool { "true" } else { "false" };
        let _ = button.set_attribute("aria-pressed", pressed);
        if tool == Tool::AiEdit {
            set_disabled(&button, !state.has_image());
        }
    }
}

pub fn set_disabled(element: &Element, disabled: bool) {
    let _ = if disabled {
        element.set_attribute("disabled", "")
    } else {
        element.remove_attribute("disabled")
    };
}

pub fn set_progress(element: &Element, state: &State) {
    let percent = (state.ai.progress * 100.0).round();
    let busy = if state.ai.is_processing { "true" } else { "false" };
    let _ = element.set_attribute("data-busy", busy);
    element.set_text_content(Some(&if state.ai.is_processing {
        format!("{percent}%")
    } else {
        String::new()
    }));
}

pub fn show_notification(element: &Element, notification: &Notification) {
    let kind = match notification.kind {
        NotificationKind::Success => "success",
        NotificationKind::Error => "error",
    };
    let _ = element.set_attribute("data-kind", kind);
    element.set_text_content(Some(&notification.message));
}
