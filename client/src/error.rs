use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CanvasError {
    #[error("{0} objects survived deletion")]
    Undeleted(usize),
    #[error("image placement needs finite, positive bounds")]
    InvalidBounds,
    #[error("selected file is not an image ({0})")]
    NotAnImage(String),
    #[error("could not read image: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AiError {
    #[error("prompt is empty")]
    EmptyPrompt,
    #[error("nothing is selected")]
    EmptySelection,
    #[error("no image is loaded")]
    NoImage,
    #[error("an AI request is already running")]
    Busy,
    #[error("could not capture the canvas: {0}")]
    Export(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server answered {status}: {message}")]
    Status { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Malformed(String),
    #[error("{0}")]
    Rejected(String),
    #[error("response did not contain an image")]
    MissingImage,
    #[error("could not place the new image: {0}")]
    Insert(CanvasError),
}

impl AiError {
    /// Text for the notification shown when a session fails.
    pub fn user_message(&self) -> String {
        match self {
            AiError::EmptyPrompt => "Please enter a prompt".to_string(),
            AiError::EmptySelection => "Please select shapes to edit with AI".to_string(),
            AiError::NoImage => "Please upload an image first".to_string(),
            AiError::Busy => "AI is still working on the previous request".to_string(),
            AiError::Status { message, .. } | AiError::Rejected(message) => {
                format!("Failed to process image: {message}")
            }
            other => format!("Failed to process image: {other}"),
        }
    }
}
