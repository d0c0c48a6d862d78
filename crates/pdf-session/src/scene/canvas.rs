use super::draw;
use super::font::text_extent;
use super::object::{Bounds, ObjectRef, Point, Scene, SceneEntry, SceneObject};
use crate::snapshot::Snapshot;
use crate::types::*;
use image::{Rgba, RgbaImage};

/// Stamp label size in canvas pixels
const STAMP_FONT_SIZE: f32 = 24.0;
const STAMP_PADDING: f32 = 8.0;
const STAMP_BORDER: f32 = 3.0;

/// Drawing surface that owns the overlay objects of one page.
///
/// The engine only talks to the surface through this trait, so a host UI can
/// provide its own implementation; [`RasterCanvas`] is the built-in one.
pub trait CanvasSurface {
    /// Remove every object, the selection and the background
    fn clear(&mut self);
    fn set_size(&mut self, width: u32, height: u32);
    fn size(&self) -> (u32, u32);
    fn set_background(&mut self, raster: RgbaImage);
    fn add_object(&mut self, object: SceneObject) -> ObjectRef;
    fn remove_object(&mut self, id: ObjectRef) -> Option<SceneObject>;
    fn object(&self, id: ObjectRef) -> Option<&SceneObject>;
    fn object_mut(&mut self, id: ObjectRef) -> Option<&mut SceneObject>;
    fn object_count(&self) -> usize;
    fn active_selection(&self) -> Vec<ObjectRef>;
    fn set_active_selection(&mut self, ids: Vec<ObjectRef>);
    fn serialize_scene(&self) -> Result<Snapshot>;
    /// Replace all objects with the ones in `snapshot` (not a merge)
    fn deserialize_scene(&mut self, snapshot: &Snapshot) -> Result<()>;
    /// Flatten background and overlay into one image
    fn to_raster(&self) -> Result<RgbaImage>;
}

/// In-memory canvas that rasterizes its scene with `imageproc`
#[derive(Debug, Clone, Default)]
pub struct RasterCanvas {
    width: u32,
    height: u32,
    /// Coordinate space the objects were authored in
    scene_size: (u32, u32),
    background: Option<RgbaImage>,
    objects: Vec<SceneEntry>,
    selection: Vec<ObjectRef>,
}

impl RasterCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scene_size: (width, height),
            ..Default::default()
        }
    }

    pub fn objects(&self) -> impl Iterator<Item = (ObjectRef, &SceneObject)> {
        self.objects.iter().map(|entry| (entry.id, &entry.object))
    }

    pub fn background(&self) -> Option<&RgbaImage> {
        self.background.as_ref()
    }

    fn scale_factors(&self) -> (f32, f32) {
        let (sw, sh) = self.scene_size;
        if sw == 0 || sh == 0 {
            return (1.0, 1.0);
        }
        (self.width as f32 / sw as f32, self.height as f32 / sh as f32)
    }

    fn base_raster(&self) -> RgbaImage {
        match &self.background {
            Some(bg) if bg.dimensions() == (self.width, self.height) => bg.clone(),
            Some(bg) => image::imageops::resize(
                bg,
                self.width.max(1),
                self.height.max(1),
                image::imageops::FilterType::Triangle,
            ),
            None => RgbaImage::from_pixel(
                self.width.max(1),
                self.height.max(1),
                Rgba([255, 255, 255, 255]),
            ),
        }
    }
}

fn scale_point(p: Point, (sx, sy): (f32, f32)) -> Point {
    Point::new(p.x * sx, p.y * sy)
}

fn scale_bounds(b: Bounds, (sx, sy): (f32, f32)) -> Bounds {
    Bounds::new(b.x * sx, b.y * sy, b.width * sx, b.height * sy)
}

/// Draw one object, mapping scene coordinates through `scale`
fn render_object(
    target: &mut RgbaImage,
    object: &SceneObject,
    scale: (f32, f32),
) -> Result<()> {
    let linear = (scale.0 + scale.1) / 2.0;
    match object {
        SceneObject::Ink {
            points,
            color,
            width,
            blend,
        } => {
            let points: Vec<Point> = points.iter().map(|p| scale_point(*p, scale)).collect();
            draw::stroke_polyline(target, &points, width * linear, *color, *blend);
        }
        SceneObject::Text {
            origin,
            content,
            color,
            font_size,
            ..
        } => {
            draw::draw_text(
                target,
                scale_point(*origin, scale),
                content,
                font_size * linear,
                *color,
            )?;
        }
        SceneObject::Rect {
            bounds,
            stroke,
            fill,
            stroke_width,
        } => {
            let bounds = scale_bounds(*bounds, scale);
            if let Some(fill) = fill {
                draw::fill_rect(target, bounds, *fill);
            }
            if let Some(stroke) = stroke {
                draw::stroke_rect(target, bounds, stroke_width * linear, *stroke);
            }
        }
        SceneObject::Ellipse {
            bounds,
            stroke,
            fill,
            stroke_width,
        } => {
            let bounds = scale_bounds(*bounds, scale);
            if let Some(fill) = fill {
                draw::fill_ellipse(target, bounds, *fill);
            }
            if let Some(stroke) = stroke {
                draw::stroke_ellipse(target, bounds, stroke_width * linear, *stroke);
            }
        }
        SceneObject::Line {
            from,
            to,
            color,
            width,
        } => {
            let points = [scale_point(*from, scale), scale_point(*to, scale)];
            draw::stroke_polyline(target, &points, width * linear, *color, Default::default());
        }
        SceneObject::Image { bounds, png } => {
            let source = image::load_from_memory(png)?.to_rgba8();
            draw::draw_image(target, &source, scale_bounds(*bounds, scale));
        }
        SceneObject::Stamp {
            origin,
            label,
            color,
        } => {
            let bounds = scale_bounds(stamp_bounds(*origin, label), scale);
            draw::stroke_rect(target, bounds, STAMP_BORDER * linear, *color);
            let text_origin = Point::new(
                bounds.x + STAMP_PADDING * scale.0,
                bounds.y + STAMP_PADDING * scale.1,
            );
            draw::draw_text(target, text_origin, label, STAMP_FONT_SIZE * linear, *color)?;
        }
    }
    Ok(())
}

/// Outer box of a stamp placed at `origin`
pub fn stamp_bounds(origin: Point, label: &str) -> Bounds {
    let (width, height) = text_extent(label, STAMP_FONT_SIZE);
    Bounds::new(
        origin.x,
        origin.y,
        width + 2.0 * STAMP_PADDING,
        height + 2.0 * STAMP_PADDING,
    )
}

impl CanvasSurface for RasterCanvas {
    fn clear(&mut self) {
        self.objects.clear();
        self.selection.clear();
        self.background = None;
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        if self.objects.is_empty() {
            self.scene_size = (width, height);
        }
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_background(&mut self, raster: RgbaImage) {
        self.background = Some(raster);
    }

    fn add_object(&mut self, object: SceneObject) -> ObjectRef {
        if self.objects.is_empty() {
            self.scene_size = (self.width, self.height);
        }
        let id = ObjectRef::new();
        self.objects.push(SceneEntry { id, object });
        id
    }

    fn remove_object(&mut self, id: ObjectRef) -> Option<SceneObject> {
        let index = self.objects.iter().position(|entry| entry.id == id)?;
        self.selection.retain(|selected| *selected != id);
        Some(self.objects.remove(index).object)
    }

    fn object(&self, id: ObjectRef) -> Option<&SceneObject> {
        self.objects
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| &entry.object)
    }

    fn object_mut(&mut self, id: ObjectRef) -> Option<&mut SceneObject> {
        self.objects
            .iter_mut()
            .find(|entry| entry.id == id)
            .map(|entry| &mut entry.object)
    }

    fn object_count(&self) -> usize {
        self.objects.len()
    }

    fn active_selection(&self) -> Vec<ObjectRef> {
        self.selection.clone()
    }

    fn set_active_selection(&mut self, ids: Vec<ObjectRef>) {
        self.selection = ids
            .into_iter()
            .filter(|id| self.objects.iter().any(|entry| entry.id == *id))
            .collect();
    }

    fn serialize_scene(&self) -> Result<Snapshot> {
        let (width, height) = self.scene_size;
        Snapshot::encode(&Scene {
            width,
            height,
            objects: self.objects.clone(),
        })
    }

    fn deserialize_scene(&mut self, snapshot: &Snapshot) -> Result<()> {
        let scene = snapshot.decode()?;
        self.objects = scene.objects;
        self.selection.clear();
        self.scene_size = if scene.width == 0 || scene.height == 0 {
            (self.width, self.height)
        } else {
            (scene.width, scene.height)
        };
        Ok(())
    }

    fn to_raster(&self) -> Result<RgbaImage> {
        let mut raster = self.base_raster();
        let scale = self.scale_factors();
        for entry in &self.objects {
            render_object(&mut raster, &entry.object, scale)?;
        }
        Ok(raster)
    }
}
