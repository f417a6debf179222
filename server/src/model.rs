use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp-image-generation";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Clone, Debug, PartialEq)]
pub enum ContentPart {
    Text(String),
    Image { mime_type: String, data: String },
}

impl ContentPart {
    pub fn png(data: impl Into<String>) -> Self {
        ContentPart::Image {
            mime_type: "image/png".to_string(),
            data: data.into(),
        }
    }
}

/// What the model answered: the last text part and the last inline image, if any.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelOutput {
    pub text: String,
    pub image: Option<String>,
}

#[async_trait]
pub trait ImageModel: Send + Sync {
    async fn generate(&self, parts: Vec<ContentPart>) -> Result<ModelOutput, ModelError>;
}

#[derive(Clone, Debug)]
pub struct ModelConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl ModelConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

pub struct GeminiModel {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiModel {
    pub fn new(config: ModelConfig) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        let endpoint = format!(
            "{}/models/{}:generateContent",
            config.api_base.trim_end_matches('/'),
            config.model
        );
        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key,
        })
    }
}

#[async_trait]
impl ImageModel for GeminiModel {
    async fn generate(&self, parts: Vec<ContentPart>) -> Result<ModelOutput, ModelError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: parts.into_iter().map(Part::from).collect(),
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["Text", "Image"],
            },
        };
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            body.truncate(512);
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let payload = response.json::<GenerateContentResponse>().await?;
        Ok(collect_output(payload))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
}

#[derive(Deserialize, Default)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Default)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl From<ContentPart> for Part {
    fn from(part: ContentPart) -> Self {
        match part {
            ContentPart::Text(text) => Part {
                text: Some(text),
                inline_data: None,
            },
            ContentPart::Image { mime_type, data } => Part {
                text: None,
                inline_data: Some(InlineData { mime_type, data }),
            },
        }
    }
}

fn collect_output(response: GenerateContentResponse) -> ModelOutput {
    let mut output = ModelOutput::default();
    let Some(content) = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
    else {
        return output;
    };
    for part in content.parts {
        if let Some(text) = part.text.filter(|text| !text.is_empty()) {
            output.text = text;
        } else if let Some(inline) = part.inline_data {
            output.image = Some(inline.data);
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_gemini_shape() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::from(ContentPart::png("AAAA")),
                    Part::from(ContentPart::Text("hello".into())),
                ],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["Text", "Image"],
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json["contents"][0]["parts"][0]["inlineData"]["mimeType"],
            "image/png"
        );
        assert_eq!(json["contents"][0]["parts"][1]["text"], "hello");
        assert_eq!(json["generationConfig"]["responseModalities"][1], "Image");
    }

    #[test]
    fn output_takes_text_and_image_from_first_candidate() {
        let payload: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[
                {"text":"Here is your cat"},
                {"inlineData":{"mimeType":"image/png","data":"iVBOR"}}
            ]}},{"content":{"parts":[{"text":"ignored"}]}}]}"#,
        )
        .unwrap();
        let output = collect_output(payload);
        assert_eq!(output.text, "Here is your cat");
        assert_eq!(output.image.as_deref(), Some("iVBOR"));
    }

    #[test]
    fn empty_candidates_yield_empty_output() {
        let payload: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(collect_output(payload), ModelOutput::default());
    }

    #[test]
    fn endpoint_is_built_from_base_and_model() {
        let mut config = ModelConfig::new("key");
        config.api_base = "http://localhost:9999/v1beta/".into();
        let model = GeminiModel::new(config).unwrap();
        assert_eq!(
            model.endpoint,
            format!("http://localhost:9999/v1beta/models/{DEFAULT_MODEL}:generateContent")
        );
    }
}
