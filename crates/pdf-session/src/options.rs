use crate::constants::*;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Tunables for an editing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    // Render scales
    pub display_scale: f32,
    pub export_scale: f32,
    pub thumbnail_scale: f32,
    pub preview_scale: f32,

    // Undo history
    pub history_capacity: usize,

    // Zoom
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub zoom_step: f32,
    pub fit_padding_px: f32,

    // Export
    pub jpeg_quality: u8,

    // Tools
    pub image_target_width: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            display_scale: DISPLAY_SCALE,
            export_scale: EXPORT_SCALE,
            thumbnail_scale: THUMBNAIL_SCALE,
            preview_scale: PREVIEW_SCALE,
            history_capacity: HISTORY_CAPACITY,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            zoom_step: ZOOM_STEP,
            fit_padding_px: FIT_PADDING_PX,
            jpeg_quality: JPEG_QUALITY,
            image_target_width: IMAGE_TARGET_WIDTH,
        }
    }
}

impl SessionOptions {
    /// Load options from JSON file
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options: SessionOptions = serde_json::from_slice(&bytes)
            .map_err(|e| SessionError::Config(format!("Failed to parse config: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Save options to JSON file
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SessionError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        let scales = [
            ("display_scale", self.display_scale),
            ("export_scale", self.export_scale),
            ("thumbnail_scale", self.thumbnail_scale),
            ("preview_scale", self.preview_scale),
        ];
        for (name, value) in scales {
            if !(value.is_finite() && value > 0.0) {
                return Err(SessionError::Config(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        if self.history_capacity == 0 {
            return Err(SessionError::Config(
                "history_capacity must be at least 1".to_string(),
            ));
        }

        if !(self.min_zoom > 0.0 && self.min_zoom < self.max_zoom) {
            return Err(SessionError::Config(format!(
                "Zoom range {}..{} is empty or not positive",
                self.min_zoom, self.max_zoom
            )));
        }

        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(SessionError::Config(format!(
                "jpeg_quality must be within 1..=100, got {}",
                self.jpeg_quality
            )));
        }

        if self.image_target_width == 0 {
            return Err(SessionError::Config(
                "image_target_width must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Clamp a zoom factor into the configured range
    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}
