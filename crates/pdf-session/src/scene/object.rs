//! Drawable overlay objects
//!
//! Coordinates are canvas pixels with the origin at the top-left corner, in
//! the space of the canvas the object was placed on. A scene remembers that
//! space (`Scene::width`/`height`) so it can be replayed onto a surface of a
//! different size.

use crate::types::{Result, SessionError};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable handle to an object on a canvas surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectRef(pub Uuid);

impl ObjectRef {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectRef {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box, top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box of the given size centred on a point
    pub fn centered(center: Point, width: f32, height: f32) -> Self {
        Self::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(220, 38, 38);
    pub const BLUE: Color = Color::rgb(37, 99, 235);
    pub const YELLOW: Color = Color::rgb(250, 204, 21);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Parse `#rrggbb` or `#rrggbbaa` as produced by a color picker
    pub fn from_hex(value: &str) -> Result<Self> {
        let hex = value.strip_prefix('#').unwrap_or(value);
        let channel = |i: usize| {
            hex.get(i..i + 2)
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .ok_or_else(|| SessionError::Config(format!("Invalid color: {value}")))
        };
        match hex.len() {
            6 => Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?).with_alpha(channel(6)?)),
            _ => Err(SessionError::Config(format!("Invalid color: {value}"))),
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// How a stroke combines with what is underneath
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    #[default]
    Normal,
    /// Darkens only, used by the highlighter so text stays legible
    Multiply,
}

/// One user-added drawable on a page overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SceneObject {
    /// Freehand stroke (pen or highlighter)
    Ink {
        points: Vec<Point>,
        color: Color,
        width: f32,
        #[serde(default)]
        blend: BlendMode,
    },
    Text {
        origin: Point,
        content: String,
        color: Color,
        font_size: f32,
        font_family: String,
    },
    Rect {
        bounds: Bounds,
        #[serde(default)]
        stroke: Option<Color>,
        #[serde(default)]
        fill: Option<Color>,
        #[serde(default = "default_stroke_width")]
        stroke_width: f32,
    },
    Ellipse {
        bounds: Bounds,
        #[serde(default)]
        stroke: Option<Color>,
        #[serde(default)]
        fill: Option<Color>,
        #[serde(default = "default_stroke_width")]
        stroke_width: f32,
    },
    Line {
        from: Point,
        to: Point,
        color: Color,
        width: f32,
    },
    /// Raster image (uploads, signatures), stored as PNG bytes
    Image { bounds: Bounds, png: Vec<u8> },
    /// Labelled, bordered box such as "APPROVED"
    Stamp {
        origin: Point,
        label: String,
        color: Color,
    },
}

fn default_stroke_width() -> f32 {
    2.0
}

impl SceneObject {
    pub fn type_name(&self) -> &'static str {
        match self {
            SceneObject::Ink { .. } => "ink",
            SceneObject::Text { .. } => "text",
            SceneObject::Rect { .. } => "rect",
            SceneObject::Ellipse { .. } => "ellipse",
            SceneObject::Line { .. } => "line",
            SceneObject::Image { .. } => "image",
            SceneObject::Stamp { .. } => "stamp",
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, SceneObject::Text { .. })
    }
}

/// An object together with the handle it is addressed by
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEntry {
    pub id: ObjectRef,
    #[serde(flatten)]
    pub object: SceneObject,
}

/// Complete overlay of one page, in stacking order (first = bottom)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub objects: Vec<SceneEntry>,
}

impl Scene {
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
