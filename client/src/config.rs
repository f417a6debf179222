use serde::{Deserialize, Serialize};

/// Tunables for the editor. Every field has a default so a partial JSON
/// object (or none at all) is a valid configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Minimum pointer travel before a freehand point is recorded.
    pub sample_distance: f64,
    pub simplify_above: usize,
    pub simplify_target: usize,
    pub preview_delay_ms: u64,
    pub settle_delay_ms: u64,
    pub reset_delay_ms: u64,
    pub fallback_image_width: f64,
    pub fallback_image_height: f64,
    /// Grow a single-object selection to everything touching it.
    pub expand_on_select: bool,
    /// Prefix for the AI endpoints, empty for same-origin.
    pub api_base: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            sample_distance: 2.0,
            simplify_above: 100,
            simplify_target: 50,
            preview_delay_ms: 1500,
            settle_delay_ms: 100,
            reset_delay_ms: 500,
            fallback_image_width: 500.0,
            fallback_image_height: 400.0,
            expand_on_select: false,
            api_base: String::new(),
        }
    }
}

impl EditorConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EditorConfig::from_json(r#"{"previewDelayMs":0,"expandOnSelect":true}"#)
            .unwrap();
        assert_eq!(config.preview_delay_ms, 0);
        assert!(config.expand_on_select);
        assert_eq!(config.sample_distance, 2.0);
        assert_eq!(config.simplify_above, 100);
        assert_eq!(EditorConfig::from_json("  ").unwrap(), EditorConfig::default());
    }
}
