//! Host-tunable editor settings.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::EditorError;

/// Editor settings. Every field has a default, so hosts only spell out
/// what they change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Class put on the editable surface while a drag hovers over it.
    pub drop_target_class: SmolStr,
    /// Saturation of preview highlight colors, in percent.
    pub preview_saturation: u8,
    /// Lightness of preview highlight colors, in percent.
    pub preview_lightness: u8,
    /// Redraws allowed per variable before a duplicate hue is accepted.
    pub max_hue_attempts: u32,
    /// Opacity of the drag image clone.
    pub drag_image_opacity: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            drop_target_class: SmolStr::new_static("drag-over"),
            preview_saturation: 70,
            preview_lightness: 35,
            max_hue_attempts: 64,
            drag_image_opacity: crate::drag::DRAG_IMAGE_OPACITY,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        serde_json::from_str(json).map_err(EditorError::Config)
    }

    /// CSS color for a preview hue.
    pub fn preview_color(&self, hue: u16) -> String {
        format!(
            "hsl({}, {}%, {}%)",
            hue, self.preview_saturation, self.preview_lightness
        )
    }
}
