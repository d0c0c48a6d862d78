//! Editor toolbar state and the objects each tool produces

use crate::constants::*;
use crate::scene::{BlendMode, Bounds, Color, Point, SceneObject};
use crate::types::*;
use image::RgbaImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Drag scrolls the workspace; nothing is selectable
    #[default]
    Pan,
    Select,
    Pen,
    Highlighter,
    /// Next click on empty canvas places a text box
    Text,
}

impl Tool {
    pub fn is_drawing(self) -> bool {
        matches!(self, Tool::Pen | Tool::Highlighter)
    }
}

/// Freehand brush derived from the toolbar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    pub color: Color,
    pub width: f32,
    pub blend: BlendMode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolState {
    pub tool: Tool,
    pub color: Color,
    pub size: u32,
    pub font_family: String,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            tool: Tool::Pan,
            color: Color::BLACK,
            size: DEFAULT_TOOL_SIZE,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
        }
    }
}

impl ToolState {
    /// Brush for the active drawing tool, `None` for non-drawing tools
    pub fn brush(&self) -> Option<Brush> {
        let size = self.size as f32;
        match self.tool {
            Tool::Pen => Some(Brush {
                color: self.color,
                width: size / PEN_WIDTH_DIVISOR,
                blend: BlendMode::Normal,
            }),
            Tool::Highlighter => Some(Brush {
                color: self.color.with_alpha(HIGHLIGHTER_ALPHA),
                width: size * HIGHLIGHTER_WIDTH_FACTOR,
                blend: BlendMode::Multiply,
            }),
            _ => None,
        }
    }

    /// Ink object for a finished stroke with the current brush
    pub fn stroke(&self, points: Vec<Point>) -> Option<SceneObject> {
        let brush = self.brush()?;
        if points.is_empty() {
            return None;
        }
        Some(SceneObject::Ink {
            points,
            color: brush.color,
            width: brush.width,
            blend: brush.blend,
        })
    }

    /// Placeholder text box at `origin` in the current style
    pub fn text_box(&self, origin: Point) -> SceneObject {
        SceneObject::Text {
            origin,
            content: DEFAULT_TEXT.to_string(),
            color: self.color,
            font_size: self.size as f32,
            font_family: self.font_family.clone(),
        }
    }

    /// Restyle a text object; returns false for anything else
    pub fn apply_style(&self, object: &mut SceneObject) -> bool {
        match object {
            SceneObject::Text {
                color,
                font_size,
                font_family,
                ..
            } => {
                *color = self.color;
                *font_size = self.size as f32;
                *font_family = self.font_family.clone();
                true
            }
            _ => false,
        }
    }

    /// Take colour, size and family from a selected text object
    pub fn sync_from(&mut self, object: &SceneObject) {
        if let SceneObject::Text {
            color,
            font_size,
            font_family,
            ..
        } = object
        {
            self.color = *color;
            self.size = font_size.round().max(1.0) as u32;
            self.font_family = font_family.clone();
        }
    }
}

/// Image object scaled to `target_width` and centred on a canvas of `canvas_size`
pub fn centered_image(
    image: &RgbaImage,
    canvas_size: (u32, u32),
    target_width: u32,
) -> Result<SceneObject> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(SessionError::Render("Image has no pixels".to_string()));
    }
    let target_width = target_width as f32;
    let target_height = height as f32 * target_width / width as f32;
    let center = Point::new(canvas_size.0 as f32 / 2.0, canvas_size.1 as f32 / 2.0);
    Ok(SceneObject::Image {
        bounds: Bounds::centered(center, target_width, target_height),
        png: crate::export::encode_png(image)?,
    })
}
