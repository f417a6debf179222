use serde::{Deserialize, Serialize};

mod data_url;

pub use data_url::{base64_from_data_url, data_url_mime, decode_base64, encode_base64, png_data_url};

/// Request bodies above this size are refused with 413.
pub const MAX_REQUEST_BYTES: usize = 100 * 1024 * 1024;

pub const GENERATE_PATH: &str = "/api/ai/generate";
pub const IMAGE_EDIT_PATH: &str = "/api/ai/image-edit";
pub const GUIDANCE_PATH: &str = "/api/ai";

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: String,
    /// Base64 PNG without the data-URL prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drawing_data: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub image_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Region of an uploaded image an edit should focus on.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SelectionData {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageEditRequest {
    #[serde(default)]
    pub image_data: String,
    #[serde(default)]
    pub selection: Option<SelectionData>,
    #[serde(default)]
    pub prompt: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageEditResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub edited_image_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct GuidanceRequest {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Guidance {
    pub prompt: String,
    pub steps: Vec<String>,
    pub suggestions: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GuidanceResponse {
    pub guidance: Guidance,
}

/// Body of every non-2xx answer.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    pub error: String,
}
