//! Bundled typeface for text objects and stamp labels

use crate::types::*;
use ab_glyph::{Font, FontRef, PxScale, ScaleFont};

/// DejaVu Sans (see `assets/DejaVuSans-LICENSE.txt`)
static FONT_DATA: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

pub(crate) fn overlay_font() -> Result<FontRef<'static>> {
    FontRef::try_from_slice(FONT_DATA)
        .map_err(|e| SessionError::Render(format!("Bundled font is unreadable: {e}")))
}

/// Width and line height in pixels of one line of `text` at `font_size`
pub(crate) fn text_extent(text: &str, font_size: f32) -> (f32, f32) {
    let Ok(font) = overlay_font() else {
        return (0.0, 0.0);
    };
    let scale = PxScale::from(font_size);
    let (width, _) = imageproc::drawing::text_size(scale, &font, text);
    (width as f32, font.as_scaled(scale).height())
}
