//! Page overlays: drawable objects, the canvas surface contract and a
//! raster implementation of it

mod canvas;
mod draw;
mod font;
mod object;

pub use canvas::{CanvasSurface, RasterCanvas, stamp_bounds};
pub use object::*;
