use crate::constants::{SIGNATURE_PAD_SIZE, SIGNATURE_STROKE_WIDTH};
use crate::scene::{BlendMode, CanvasSurface, Color, Point, RasterCanvas, SceneObject};
use crate::types::*;
use image::Rgba;

/// Freehand drawing area for a signature, separate from the page canvas
#[derive(Debug, Clone)]
pub struct SignaturePad {
    canvas: RasterCanvas,
    color: Color,
}

impl Default for SignaturePad {
    fn default() -> Self {
        Self::new(Color::BLACK)
    }
}

impl SignaturePad {
    pub fn new(color: Color) -> Self {
        let (width, height) = SIGNATURE_PAD_SIZE;
        Self {
            canvas: RasterCanvas::new(width, height),
            color,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        self.canvas.size()
    }

    pub fn add_stroke(&mut self, points: Vec<Point>) {
        if points.is_empty() {
            return;
        }
        self.canvas.add_object(SceneObject::Ink {
            points,
            color: self.color,
            width: SIGNATURE_STROKE_WIDTH,
            blend: BlendMode::Normal,
        });
    }

    pub fn clear(&mut self) {
        self.canvas.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.canvas.object_count() == 0
    }

    /// Flatten the strokes to a transparent image object of the pad's size,
    /// centred on a canvas of `canvas_size`. An empty pad yields nothing.
    pub fn finish(&self, canvas_size: (u32, u32)) -> Result<Option<SceneObject>> {
        if self.is_empty() {
            return Ok(None);
        }
        let (width, height) = self.canvas.size();
        let mut pad = self.canvas.clone();
        pad.set_background(image::RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0])));
        let raster = pad.to_raster()?;

        let center = Point::new(canvas_size.0 as f32 / 2.0, canvas_size.1 as f32 / 2.0);
        Ok(Some(SceneObject::Image {
            bounds: crate::scene::Bounds::centered(center, width as f32, height as f32),
            png: crate::export::encode_png(&raster)?,
        }))
    }
}
