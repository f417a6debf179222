use std::sync::Arc;

use crate::model::ImageModel;

#[derive(Clone)]
pub struct AppState {
    /// `None` when no credential was configured; AI routes then answer 500.
    pub model: Option<Arc<dyn ImageModel>>,
}

impl AppState {
    pub fn new(model: Option<Arc<dyn ImageModel>>) -> Self {
        Self { model }
    }
}
