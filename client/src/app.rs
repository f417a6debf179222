use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    Document, Element, Event, HtmlCanvasElement, HtmlElement, HtmlInputElement,
    HtmlSelectElement, HtmlTextAreaElement, KeyboardEvent, PointerEvent,
};

use crate::actions::{set_brush_color, set_brush_size, set_tool};
use crate::ai::{AiOrchestrator, Surface};
use crate::config::EditorConfig;
use crate::dom::{
    event_to_point, get_element, key_input, set_canvas_cursor, set_disabled, set_progress,
    set_tool_buttons, show_notification,
};
use crate::geometry::hit_test;
use crate::input::{apply_pointer, PointerInput, PointerPhase};
use crate::keyboard::{dispatch_key, Shortcut};
use crate::net::FetchTransport;
use crate::paint::{context_2d, Painter};
use crate::raster;
use crate::state::{BrushSize, NotificationKind, State, Tool};

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let text = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&text),
            log::Level::Warn => web_sys::console::warn_1(&text),
            _ => web_sys::console::log_1(&text),
        }
    }

    fn flush(&self) {}
}

fn debug_enabled(window: &web_sys::Window) -> bool {
    let search = window.location().search().ok().unwrap_or_default();
    search.contains("debug=1") || search.contains("debug=true")
}

/// Optional `<script type="application/json" id="drawpilot-config">`.
fn read_config(document: &Document) -> EditorConfig {
    let text = document
        .get_element_by_id("drawpilot-config")
        .and_then(|element| element.text_content())
        .unwrap_or_default();
    EditorConfig::from_json(&text).unwrap_or_else(|error| {
        log::warn!("Ignoring invalid editor config: {error}");
        EditorConfig::default()
    })
}

/// Everything that has to be refreshed after a state change.
struct Frame {
    document: Document,
    canvas: HtmlCanvasElement,
    state: Rc<RefCell<State>>,
    painter: Rc<Painter>,
    notice: Element,
    progress: Element,
    submit: Element,
}

impl Frame {
    fn refresh(&self) {
        // An image load can fire while a handler holds the state.
        let Ok(mut state) = self.state.try_borrow_mut() else {
            return;
        };
        for notification in state.take_notifications() {
            show_notification(&self.notice, &notification);
        }
        self.painter.paint(&state);
        set_progress(&self.progress, &state);
        set_disabled(&self.submit, !state.can_submit_prompt());
        set_tool_buttons(&self.document, &state);
        set_canvas_cursor(&self.canvas, state.tool(), state.ai.is_processing);
    }
}

struct CanvasSurface {
    frame: Rc<Frame>,
}

#[async_trait(?Send)]
impl Surface for CanvasSurface {
    async fn export_png(&self, ids: &[String]) -> Result<Vec<u8>, String> {
        let frame = &self.frame;
        let state = frame.state.borrow();
        frame
            .painter
            .export_png(&frame.document, &state, ids)
            .map_err(|error| error.as_string().unwrap_or_else(|| format!("{error:?}")))
    }

    async fn sleep(&self, duration: Duration) {
        self.frame.refresh();
        let millis = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            let scheduled = web_sys::window().and_then(|window| {
                window
                    .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis)
                    .ok()
            });
            if scheduled.is_none() {
                let _ = resolve.call0(&JsValue::NULL);
            }
        });
        let _ = JsFuture::from(promise).await;
        self.frame.refresh();
    }
}

type Orchestrator = AiOrchestrator<CanvasSurface, FetchTransport>;

#[wasm_bindgen(start)]
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let level = if debug_enabled(&window) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }

    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;
    if document.ready_state() == "complete" {
        return start_app();
    }

    let started = Rc::new(Cell::new(false));
    let onload = Closure::<dyn FnMut(Event)>::new(move |_| {
        if started.replace(true) {
            return;
        }
        if let Err(err) = start_app() {
            web_sys::console::error_1(&err);
        }
    });
    window.add_event_listener_with_callback("load", onload.as_ref().unchecked_ref())?;
    onload.forget();
    Ok(())
}

fn start_app() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;

    let canvas: HtmlCanvasElement = get_element(&document, "board")?;
    let prompt: HtmlTextAreaElement = get_element(&document, "prompt")?;
    let upload: HtmlInputElement = get_element(&document, "upload")?;
    let submit: HtmlElement = get_element(&document, "submit")?;

    let config = read_config(&document);
    let api_base = config.api_base.clone();
    let state = Rc::new(RefCell::new(State::new(config)));
    {
        let mut state = state.borrow_mut();
        state.canvas.stage_width = f64::from(canvas.width());
        state.canvas.stage_height = f64::from(canvas.height());
    }

    let painter = Rc::new(Painter::new(context_2d(&canvas)?));
    let frame = Rc::new(Frame {
        document: document.clone(),
        canvas: canvas.clone(),
        state: state.clone(),
        painter: painter.clone(),
        notice: get_element(&document, "notice")?,
        progress: get_element(&document, "progress")?,
        submit: submit.clone().into(),
    });
    {
        let frame = frame.clone();
        painter.set_on_image_load(Rc::new(move || frame.refresh()));
    }

    let orchestrator: Rc<Orchestrator> = Rc::new(AiOrchestrator::new(
        state.clone(),
        CanvasSurface {
            frame: frame.clone(),
        },
        FetchTransport::new(&api_base),
    ));

    for phase in [PointerPhase::Down, PointerPhase::Move, PointerPhase::Up] {
        let canvas_cb = canvas.clone();
        let state = state.clone();
        let frame = frame.clone();
        let onpointer = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            if phase == PointerPhase::Move && event.buttons() == 0 {
                return;
            }
            let Some(point) = event_to_point(&canvas_cb, &event) else {
                return;
            };
            {
                let mut state = state.borrow_mut();
                let mut input = PointerInput::new(phase, point.x, point.y);
                input.shift = event.shift_key();
                if phase == PointerPhase::Down {
                    input.target = hit_test(&state.canvas, point);
                }
                apply_pointer(&mut state, &input);
            }
            if phase == PointerPhase::Down {
                let _ = canvas_cb.set_pointer_capture(event.pointer_id());
            }
            frame.refresh();
        });
        let name = match phase {
            PointerPhase::Down => "pointerdown",
            PointerPhase::Move => "pointermove",
            PointerPhase::Up => "pointerup",
        };
        canvas.add_event_listener_with_callback(name, onpointer.as_ref().unchecked_ref())?;
        onpointer.forget();
    }

    {
        let state = state.clone();
        let frame = frame.clone();
        let upload = upload.clone();
        let prompt = prompt.clone();
        let onkeydown = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
            let input = key_input(&event);
            let outcome = dispatch_key(&mut state.borrow_mut(), &input);
            if outcome.prevent_default {
                event.prevent_default();
            }
            match outcome.shortcut {
                Some(Shortcut::Save) => download_canvas(&frame),
                Some(Shortcut::OpenUpload) => upload.click(),
                Some(Shortcut::CommandPalette) => {
                    let _ = prompt.focus();
                }
                _ => {}
            }
            frame.refresh();
        });
        window.add_event_listener_with_callback("keydown", onkeydown.as_ref().unchecked_ref())?;
        onkeydown.forget();
    }

    {
        let state = state.clone();
        let orchestrator = orchestrator.clone();
        let prompt = prompt.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            let (allowed, region_edit) = {
                let state = state.borrow();
                (state.can_submit_prompt(), state.tool() == Tool::AiEdit)
            };
            if !allowed {
                return;
            }
            let text = prompt.value();
            let orchestrator = orchestrator.clone();
            spawn_local(async move {
                let result = if region_edit {
                    orchestrator.edit_image_region(&text).await
                } else {
                    orchestrator.submit_prompt(&text).await.map(|_| ())
                };
                if let Err(error) = result {
                    log::debug!("AI request ended with {error}");
                }
                orchestrator.surface().frame.refresh();
            });
        });
        submit.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let state = state.clone();
        let frame = frame.clone();
        let upload_cb = upload.clone();
        let onchange = Closure::<dyn FnMut(Event)>::new(move |_| {
            let Some(file) = upload_cb.files().and_then(|files| files.get(0)) else {
                return;
            };
            let mime = file.type_();
            let state = state.clone();
            let frame = frame.clone();
            spawn_local(async move {
                match JsFuture::from(file.array_buffer()).await {
                    Ok(buffer) => {
                        let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
                        let mut state = state.borrow_mut();
                        if let Err(error) = raster::load_image(&mut state, &mime, &bytes) {
                            log::warn!("Upload rejected: {error}");
                        }
                    }
                    Err(_) => state
                        .borrow_mut()
                        .notify(NotificationKind::Error, "Failed to read file"),
                }
                frame.refresh();
            });
        });
        upload.add_event_listener_with_callback("change", onchange.as_ref().unchecked_ref())?;
        onchange.forget();
    }

    if let Some(picker) = document
        .get_element_by_id("brush-color")
        .and_then(|element| element.dyn_into::<HtmlInputElement>().ok())
    {
        let state = state.clone();
        let picker_cb = picker.clone();
        let oninput = Closure::<dyn FnMut(Event)>::new(move |_| {
            set_brush_color(&mut state.borrow_mut(), &picker_cb.value());
        });
        picker.add_event_listener_with_callback("input", oninput.as_ref().unchecked_ref())?;
        oninput.forget();
    }

    if let Some(picker) = document
        .get_element_by_id("brush-size")
        .and_then(|element| element.dyn_into::<HtmlSelectElement>().ok())
    {
        let state = state.clone();
        let picker_cb = picker.clone();
        let onchange = Closure::<dyn FnMut(Event)>::new(move |_| {
            match BrushSize::from_label(&picker_cb.value()) {
                Some(size) => set_brush_size(&mut state.borrow_mut(), size),
                None => log::warn!("Unknown brush size {:?}", picker_cb.value()),
            }
        });
        picker.add_event_listener_with_callback("change", onchange.as_ref().unchecked_ref())?;
        onchange.forget();
    }

    for tool in Tool::ALL {
        let Some(button) = document.get_element_by_id(&format!("tool-{}", tool.as_str())) else {
            continue;
        };
        let state = state.clone();
        let frame = frame.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            {
                let mut state = state.borrow_mut();
                if tool == Tool::AiEdit && !state.has_image() {
                    return;
                }
                set_tool(&mut state, tool);
            }
            frame.refresh();
        });
        button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    log::info!("DrawPilot ready");
    frame.refresh();
    Ok(())
}

fn download_canvas(frame: &Frame) {
    let Ok(url) = frame.canvas.to_data_url() else {
        return;
    };
    let Ok(link) = frame.document.create_element("a") else {
        return;
    };
    let _ = link.set_attribute("href", &url);
    let _ = link.set_attribute("download", "drawpilot.png");
    if let Ok(link) = link.dyn_into::<HtmlElement>() {
        link.click();
    }
}
