use drawpilot_shared::{Guidance, SelectionData, MAX_REQUEST_BYTES};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::model::ContentPart;

pub fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    if body.len() > MAX_REQUEST_BYTES {
        return Err(ApiError::PayloadTooLarge);
    }
    serde_json::from_str(body).map_err(|error| {
        log::warn!("Rejecting request with invalid JSON: {error}");
        ApiError::BadRequest("Invalid JSON in request body".into())
    })
}

pub fn require_prompt(prompt: &str) -> Result<&str, ApiError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(ApiError::BadRequest("Prompt is required".into()));
    }
    Ok(prompt)
}

/// Text-only prompt when there is no drawing, otherwise the drawing followed by
/// enhancement instructions.
pub fn generation_parts(prompt: &str, drawing_data: Option<&str>) -> Vec<ContentPart> {
    match drawing_data.map(str::trim).filter(|data| !data.is_empty()) {
        Some(data) => vec![
            ContentPart::png(data),
            ContentPart::Text(enhance_instructions(prompt)),
        ],
        None => vec![ContentPart::Text(prompt.to_string())],
    }
}

pub fn edit_parts(image_data: &str, selection: &SelectionData, prompt: &str) -> Vec<ContentPart> {
    let area = serde_json::to_string(selection).unwrap_or_default();
    vec![
        ContentPart::png(image_data.trim()),
        ContentPart::Text(format!(
            "{prompt}. Focus on the selected area: {area}. Keep the overall style consistent."
        )),
    ]
}

fn enhance_instructions(prompt: &str) -> String {
    format!(
        "Enhance this image based on the following instructions:\n```\n{prompt}\n```\n\n\
         **IMPORTANT**: The final image should be high quality, follow my instructions and \
         maintain consistency. Do not include borders or frames around the image."
    )
}

pub fn guidance_for(prompt: &str) -> Guidance {
    const STEPS: [&str; 5] = [
        "Start by sketching the main outline",
        "Add details to the central elements",
        "Work on the background elements",
        "Refine the proportions and perspective",
        "Add finishing touches and details",
    ];
    const SUGGESTIONS: [&str; 3] = [
        "Try using lighter strokes for distant objects",
        "Consider the light source for consistent shadows",
        "Use varied line weights to add depth",
    ];
    Guidance {
        prompt: prompt.to_string(),
        steps: STEPS.iter().map(|step| step.to_string()).collect(),
        suggestions: SUGGESTIONS.iter().map(|tip| tip.to_string()).collect(),
    }
}
