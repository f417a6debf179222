use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use drawpilot_shared::{
    GenerateRequest, GenerateResponse, GuidanceRequest, GuidanceResponse, ImageEditRequest,
    ImageEditResponse,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::logic::{edit_parts, generation_parts, guidance_for, parse_body, require_prompt};
use crate::state::AppState;

pub async fn ping_handler() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

pub async fn generate_handler(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<GenerateResponse>, ApiError> {
    let request: GenerateRequest = parse_body(&body)?;
    let prompt = require_prompt(&request.prompt)?;
    let model = state.model.as_ref().ok_or(ApiError::MissingCredential)?;

    let request_id = Uuid::new_v4();
    let drawing = request.drawing_data.as_deref();
    log::info!(
        "AI generate request={request_id} prompt_len={} drawing_bytes={}",
        prompt.len(),
        drawing.map(str::len).unwrap_or(0)
    );
    let output = model
        .generate(generation_parts(prompt, drawing))
        .await
        .map_err(|error| {
            log::error!("AI generate failed request={request_id} error={error}");
            ApiError::Upstream(error.to_string())
        })?;
    log::info!(
        "AI generate done request={request_id} image={}",
        output.image.is_some()
    );

    Ok(Json(GenerateResponse {
        success: true,
        message: output.text,
        image_data: output.image,
        error: None,
    }))
}

pub async fn image_edit_handler(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<ImageEditResponse>, ApiError> {
    let request: ImageEditRequest = parse_body(&body)?;
    let prompt = request.prompt.trim();
    let (Some(selection), false, false) = (
        request.selection.as_ref(),
        request.image_data.trim().is_empty(),
        prompt.is_empty(),
    ) else {
        return Err(ApiError::BadRequest(
            "Image data, selection area, and prompt are required".into(),
        ));
    };
    let model = state.model.as_ref().ok_or(ApiError::MissingCredential)?;

    let request_id = Uuid::new_v4();
    log::info!(
        "AI image edit request={request_id} area={}x{}@{},{}",
        selection.width,
        selection.height,
        selection.x,
        selection.y
    );
    let output = model
        .generate(edit_parts(&request.image_data, selection, prompt))
        .await
        .map_err(|error| {
            log::error!("AI image edit failed request={request_id} error={error}");
            ApiError::Upstream(error.to_string())
        })?;

    Ok(Json(ImageEditResponse {
        success: true,
        message: output.text,
        edited_image_data: output.image,
        error: None,
    }))
}

pub async fn guidance_handler(body: String) -> Result<Json<GuidanceResponse>, ApiError> {
    let request: GuidanceRequest = parse_body(&body)?;
    let prompt = require_prompt(&request.prompt)?;
    Ok(Json(GuidanceResponse {
        guidance: guidance_for(prompt),
    }))
}
