use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use drawpilot_shared::{
    base64_from_data_url, data_url_mime, decode_base64, encode_base64, png_data_url,
    GenerateRequest, GenerateResponse, ImageEditRequest, ImageEditResponse, SelectionData,
    GENERATE_PATH, IMAGE_EDIT_PATH,
};
use serde::Serialize;

use crate::actions;
use crate::config::EditorConfig;
use crate::error::{AiError, CanvasError};
use crate::geometry::{union_bounds, Bounds};
use crate::net::{AiTransport, HttpReply};
use crate::raster;
use crate::selection;
use crate::state::{AiPhase, NotificationKind, RasterImage, State};

/// The rendering side of the canvas, as far as an AI session needs it.
#[async_trait(?Send)]
pub trait Surface {
    /// PNG of the given objects on a white background.
    async fn export_png(&self, ids: &[String]) -> Result<Vec<u8>, String>;
    async fn sleep(&self, duration: Duration);
}

struct CanvasTarget {
    ids: Vec<String>,
    bounds: Option<Bounds>,
}

struct AiImage {
    base64: String,
    size: Option<(u32, u32)>,
}

/// Drives one AI session at a time against the shared state:
/// capture, request, preview, apply, then back to idle. The state is never
/// borrowed across an await, so pointer and key handlers keep running while
/// a request is in flight.
pub struct AiOrchestrator<S, T> {
    state: Rc<RefCell<State>>,
    surface: S,
    transport: T,
}

impl<S: Surface, T: AiTransport> AiOrchestrator<S, T> {
    pub fn new(state: Rc<RefCell<State>>, surface: S, transport: T) -> Self {
        Self {
            state,
            surface,
            transport,
        }
    }

    pub fn state(&self) -> &Rc<RefCell<State>> {
        &self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends the selection (plus everything touching it) with the prompt and
    /// replaces it with the generated image. Returns the new image's id.
    pub async fn submit_prompt(&self, prompt: &str) -> Result<String, AiError> {
        let prompt = prompt.trim();
        let target = self.begin_canvas_session(prompt)?;
        match self.run_canvas_session(prompt, target).await {
            Ok(id) => Ok(id),
            Err(error) => {
                self.fail(&error);
                Err(error)
            }
        }
    }

    /// Sends the loaded image and the dragged region to the image-edit
    /// endpoint and swaps in the result.
    pub async fn edit_image_region(&self, prompt: &str) -> Result<(), AiError> {
        let prompt = prompt.trim();
        let (request, previous) = self.begin_region_session(prompt)?;
        match self.run_region_session(request, previous).await {
            Ok(()) => Ok(()),
            Err(error) => {
                self.fail(&error);
                Err(error)
            }
        }
    }

    fn begin_canvas_session(&self, prompt: &str) -> Result<CanvasTarget, AiError> {
        let mut state = self.state.borrow_mut();
        if state.ai.is_processing {
            log::warn!("Ignoring prompt while an AI session is running");
            return Err(AiError::Busy);
        }
        if prompt.is_empty() {
            return Err(reject(&mut state, AiError::EmptyPrompt));
        }
        let selected = selection::live_ids(&state.canvas, state.selected_ids());
        if selected.is_empty() {
            return Err(reject(&mut state, AiError::EmptySelection));
        }
        let ids = selection::expand_by_collision(&state.canvas, &selected);
        if ids.len() > selected.len() {
            log::info!(
                "Found {} additional touching objects to process",
                ids.len() - selected.len()
            );
        }
        let bounds = union_bounds(&state.canvas, &ids);
        state.ai.begin();
        Ok(CanvasTarget { ids, bounds })
    }

    async fn run_canvas_session(
        &self,
        prompt: &str,
        target: CanvasTarget,
    ) -> Result<String, AiError> {
        let png = self
            .surface
            .export_png(&target.ids)
            .await
            .map_err(AiError::Export)?;
        if png.is_empty() {
            return Err(AiError::Export("canvas export was empty".into()));
        }
        self.advance(AiPhase::Requesting, 0.3);

        let request = GenerateRequest {
            prompt: prompt.to_string(),
            drawing_data: Some(encode_base64(&png)),
        };
        let reply = self.post(GENERATE_PATH, &request).await?;
        self.advance(AiPhase::Requesting, 0.7);
        let response: GenerateResponse = reply.json()?;
        let image = accepted_image(response.success, response.image_data, response.error)?;
        self.advance(AiPhase::Requesting, 0.8);

        let src = png_data_url(&image.base64);
        self.show_preview(&src).await;

        self.remove_targets(&target.ids);
        self.sleep(|config| config.settle_delay_ms).await;
        let id = {
            let mut state = self.state.borrow_mut();
            place_image(&mut state, &src, target.bounds, image.size)?
        };
        self.finish("Image updated successfully!").await;
        Ok(id)
    }

    fn begin_region_session(
        &self,
        prompt: &str,
    ) -> Result<(ImageEditRequest, RasterImage), AiError> {
        let mut state = self.state.borrow_mut();
        if state.ai.is_processing {
            log::warn!("Ignoring image edit while an AI session is running");
            return Err(AiError::Busy);
        }
        if prompt.is_empty() {
            return Err(reject(&mut state, AiError::EmptyPrompt));
        }
        let Some(image) = state.image.image.clone() else {
            return Err(reject(&mut state, AiError::NoImage));
        };
        let image_data = match (data_url_mime(&image.src), base64_from_data_url(&image.src)) {
            (Some(mime), Some(data)) if mime.starts_with("image/") => data.to_string(),
            _ => {
                return Err(reject(
                    &mut state,
                    AiError::Export("image source is not an image data URL".into()),
                ))
            }
        };
        let selection = match state.selection.edit_region {
            Some(region) => SelectionData {
                x: region.x,
                y: region.y,
                width: region.width,
                height: region.height,
                prompt: Some(prompt.to_string()),
            },
            None => SelectionData {
                x: 0.0,
                y: 0.0,
                width: f64::from(image.width),
                height: f64::from(image.height),
                prompt: Some(prompt.to_string()),
            },
        };
        state.ai.begin();
        let request = ImageEditRequest {
            image_data,
            selection: Some(selection),
            prompt: prompt.to_string(),
        };
        Ok((request, image))
    }

    async fn run_region_session(
        &self,
        request: ImageEditRequest,
        previous: RasterImage,
    ) -> Result<(), AiError> {
        self.advance(AiPhase::Requesting, 0.3);
        let reply = self.post(IMAGE_EDIT_PATH, &request).await?;
        self.advance(AiPhase::Requesting, 0.7);
        let response: ImageEditResponse = reply.json()?;
        let message = response.message.trim().to_string();
        let image = accepted_image(
            response.success,
            response.edited_image_data,
            response.error,
        )?;
        self.advance(AiPhase::Requesting, 0.8);

        let src = png_data_url(&image.base64);
        self.show_preview(&src).await;
        {
            let mut state = self.state.borrow_mut();
            let (width, height) = image.size.unwrap_or((previous.width, previous.height));
            raster::replace_image(&mut state, RasterImage { src, width, height });
            state.selection.edit_region = None;
        }
        let message = if message.is_empty() {
            "Image edited successfully"
        } else {
            message.as_str()
        };
        self.finish(message).await;
        Ok(())
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<HttpReply, AiError> {
        let body =
            serde_json::to_string(body).map_err(|error| AiError::Malformed(error.to_string()))?;
        log::info!("POST {path} ({} bytes)", body.len());
        self.transport
            .post_json(path, body)
            .await
            .map_err(AiError::Transport)
    }

    fn advance(&self, phase: AiPhase, progress: f64) {
        self.state.borrow_mut().ai.advance(phase, progress);
    }

    async fn sleep(&self, delay: fn(&EditorConfig) -> u64) {
        let millis = delay(&self.state.borrow().config);
        if millis > 0 {
            self.surface.sleep(Duration::from_millis(millis)).await;
        }
    }

    async fn show_preview(&self, src: &str) {
        {
            let mut state = self.state.borrow_mut();
            state.ai.preview = Some(src.to_string());
            state.ai.advance(AiPhase::Previewing, 0.9);
        }
        self.sleep(|config| config.preview_delay_ms).await;
        self.advance(AiPhase::Applying, 0.9);
    }

    fn remove_targets(&self, ids: &[String]) {
        let mut state = self.state.borrow_mut();
        let outcome = actions::delete_objects(&mut state, ids);
        settle_removal(&mut state, outcome);
    }

    async fn finish(&self, message: &str) {
        {
            let mut state = self.state.borrow_mut();
            state.ai.advance(AiPhase::Applying, 1.0);
            state.notify(NotificationKind::Success, message);
        }
        self.sleep(|config| config.reset_delay_ms).await;
        self.state.borrow_mut().ai.reset();
    }

    fn fail(&self, error: &AiError) {
        log::error!("AI session failed: {error}");
        let mut state = self.state.borrow_mut();
        state.ai.reset();
        state.notify(NotificationKind::Error, error.user_message());
    }
}

/// Targets removed by the user while the preview was showing are not a
/// failure. Only a deletion that left targets behind clears the canvas.
fn settle_removal(state: &mut State, outcome: Result<usize, CanvasError>) {
    match outcome {
        Ok(0) => log::debug!("Selected objects were already removed"),
        Ok(removed) => log::debug!("Removed {removed} selected objects"),
        Err(error) => {
            log::warn!("Could not delete the selected objects ({error}), clearing the canvas");
            actions::clear_canvas(state);
        }
    }
}

fn reject(state: &mut State, error: AiError) -> AiError {
    state.notify(NotificationKind::Error, error.user_message());
    error
}

/// Unwraps a successful payload into decoded image bytes. Nothing on the
/// canvas has changed when this fails.
fn accepted_image(
    success: bool,
    data: Option<String>,
    error: Option<String>,
) -> Result<AiImage, AiError> {
    if !success {
        let reason = error
            .filter(|reason| !reason.trim().is_empty())
            .unwrap_or_else(|| "the AI service reported a failure".to_string());
        return Err(AiError::Rejected(reason));
    }
    let data = data
        .map(|data| data.trim().to_string())
        .filter(|data| !data.is_empty())
        .ok_or(AiError::MissingImage)?;
    let base64 = base64_from_data_url(&data)
        .unwrap_or(data.as_str())
        .to_string();
    let bytes = decode_base64(&base64)
        .ok_or_else(|| AiError::Malformed("image data is not valid base64".into()))?;
    let size = match raster::decode_dimensions(&bytes) {
        Ok(size) => Some(size),
        Err(error) => {
            log::warn!("Using fallback image size: {error}");
            None
        }
    };
    Ok(AiImage { base64, size })
}

/// Selection bounds when usable, otherwise centered on the stage at the
/// decoded size (or the configured fallback size).
fn place_image(
    state: &mut State,
    src: &str,
    bounds: Option<Bounds>,
    size: Option<(u32, u32)>,
) -> Result<String, AiError> {
    if let Some(bounds) = bounds {
        match actions::insert_image(state, src, bounds) {
            Ok(id) => return Ok(id),
            Err(error) => log::warn!("Placing image at the selection failed ({error}), retrying"),
        }
    }
    let placement = centered_placement(state, size);
    actions::insert_image(state, src, placement).map_err(AiError::Insert)
}

fn centered_placement(state: &State, size: Option<(u32, u32)>) -> Bounds {
    let config = &state.config;
    let (width, height) = size
        .filter(|(width, height)| *width > 0 && *height > 0)
        .map(|(width, height)| (f64::from(width), f64::from(height)))
        .unwrap_or((config.fallback_image_width, config.fallback_image_height));
    let stage_width = state.canvas.stage_width;
    let stage_height = state.canvas.stage_height;
    let (x, y) = if stage_width.is_finite() && stage_height.is_finite() {
        ((stage_width - width) / 2.0, (stage_height - height) / 2.0)
    } else {
        (0.0, 0.0)
    };
    Bounds::from_rect(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_payload_is_rejected_with_its_reason() {
        let result = accepted_image(false, None, Some("quota exceeded".into()));
        assert!(matches!(result, Err(AiError::Rejected(reason)) if reason == "quota exceeded"));
    }

    #[test]
    fn success_without_image_is_missing_image() {
        assert!(matches!(
            accepted_image(true, Some("  ".into()), None),
            Err(AiError::MissingImage)
        ));
    }

    #[test]
    fn data_url_payloads_are_unwrapped() {
        let image = accepted_image(true, Some("data:image/png;base64,AAAA".into()), None).unwrap();
        assert_eq!(image.base64, "AAAA");
        assert_eq!(image.size, None);
    }

    #[test]
    fn failed_deletion_falls_back_to_clearing() {
        let mut state = State::default();
        let bounds = Bounds::from_rect(0.0, 0.0, 10.0, 10.0);
        actions::insert_image(&mut state, "data:image/png;base64,AAAA", bounds).unwrap();
        settle_removal(&mut state, Ok(0));
        assert_eq!(state.canvas.images.len(), 1);

        settle_removal(&mut state, Err(CanvasError::Undeleted(1)));
        assert_eq!(state.canvas.object_count(), 0);
    }

    #[test]
    fn centered_placement_uses_fallback_size() {
        let state = State::default();
        let bounds = centered_placement(&state, None);
        assert_eq!(bounds, Bounds::from_rect(150.0, 100.0, 500.0, 400.0));
        let bounds = centered_placement(&state, Some((200, 100)));
        assert_eq!(bounds, Bounds::from_rect(300.0, 250.0, 200.0, 100.0));
    }
}
