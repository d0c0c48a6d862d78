//! Painting scene objects onto an RGBA raster
//!
//! Each primitive is first drawn into a coverage mask with `imageproc` and
//! then composited once, so overlapping parts of a translucent stroke do not
//! darken each other.

use super::font::overlay_font;
use super::object::{BlendMode, Bounds, Color, Point};
use crate::types::*;
use ab_glyph::PxScale;
use image::{GrayImage, Luma, Pixel, Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_ellipse_mut, draw_filled_rect_mut,
    draw_line_segment_mut, draw_polygon_mut, draw_text_mut,
};
use imageproc::point::Point as PolyPoint;
use imageproc::rect::Rect;

const COVERED: Luma<u8> = Luma([255]);
const CLEAR: Luma<u8> = Luma([0]);

fn mask_for(image: &RgbaImage) -> GrayImage {
    GrayImage::new(image.width(), image.height())
}

/// Composite `color` through `mask` onto `image`
fn composite(image: &mut RgbaImage, mask: &GrayImage, color: Color, mode: BlendMode) {
    for (pixel, coverage) in image.pixels_mut().zip(mask.pixels()) {
        let coverage = coverage.0[0] as u16;
        if coverage == 0 {
            continue;
        }
        let alpha = (coverage * color.a as u16 / 255) as u8;
        let [r, g, b] = match mode {
            BlendMode::Normal => [color.r, color.g, color.b],
            BlendMode::Multiply => [
                multiply(pixel.0[0], color.r),
                multiply(pixel.0[1], color.g),
                multiply(pixel.0[2], color.b),
            ],
        };
        pixel.blend(&Rgba([r, g, b, alpha]));
    }
}

fn multiply(under: u8, over: u8) -> u8 {
    (under as u16 * over as u16 / 255) as u8
}

fn rect(bounds: Bounds) -> Option<Rect> {
    let width = bounds.width.round();
    let height = bounds.height.round();
    if width < 1.0 || height < 1.0 {
        return None;
    }
    Some(Rect::at(bounds.x.round() as i32, bounds.y.round() as i32).of_size(width as u32, height as u32))
}

/// One straight piece of a thick stroke, as a quad
fn mask_segment(mask: &mut GrayImage, a: Point, b: Point, radius: f32) {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let length = (dx * dx + dy * dy).sqrt();
    if length < f32::EPSILON {
        return;
    }
    let (nx, ny) = (-dy / length * radius, dx / length * radius);
    let quad = [
        (a.x + nx, a.y + ny),
        (b.x + nx, b.y + ny),
        (b.x - nx, b.y - ny),
        (a.x - nx, a.y - ny),
    ]
    .map(|(x, y)| PolyPoint::new(x.round() as i32, y.round() as i32));

    // Too thin to form a polygon after rounding
    if quad[0] == quad[3] {
        draw_line_segment_mut(mask, (a.x, a.y), (b.x, b.y), COVERED);
    } else {
        draw_polygon_mut(mask, &quad, COVERED);
    }
}

/// Round-capped polyline of the given width
pub(crate) fn stroke_polyline(
    image: &mut RgbaImage,
    points: &[Point],
    width: f32,
    color: Color,
    mode: BlendMode,
) {
    if points.is_empty() {
        return;
    }
    let radius = width / 2.0;
    let mut mask = mask_for(image);

    for pair in points.windows(2) {
        mask_segment(&mut mask, pair[0], pair[1], radius);
    }
    let joint = radius.round() as i32;
    for p in points {
        let center = (p.x.round() as i32, p.y.round() as i32);
        if joint >= 1 {
            draw_filled_circle_mut(&mut mask, center, joint, COVERED);
        } else {
            draw_line_segment_mut(&mut mask, (p.x, p.y), (p.x, p.y), COVERED);
        }
    }
    composite(image, &mask, color, mode);
}

pub(crate) fn fill_rect(image: &mut RgbaImage, bounds: Bounds, color: Color) {
    let Some(area) = rect(bounds) else {
        return;
    };
    let mut mask = mask_for(image);
    draw_filled_rect_mut(&mut mask, area, COVERED);
    composite(image, &mask, color, BlendMode::Normal);
}

/// Border of `width` centred on the edge of `bounds`
pub(crate) fn stroke_rect(image: &mut RgbaImage, bounds: Bounds, width: f32, color: Color) {
    let half = width / 2.0;
    let outer = Bounds::new(
        bounds.x - half,
        bounds.y - half,
        bounds.width + width,
        bounds.height + width,
    );
    let Some(outer) = rect(outer) else {
        return;
    };
    let mut mask = mask_for(image);
    draw_filled_rect_mut(&mut mask, outer, COVERED);
    let inner = Bounds::new(
        bounds.x + half,
        bounds.y + half,
        bounds.width - width,
        bounds.height - width,
    );
    if let Some(inner) = rect(inner) {
        draw_filled_rect_mut(&mut mask, inner, CLEAR);
    }
    composite(image, &mask, color, BlendMode::Normal);
}

fn mask_ellipse(mask: &mut GrayImage, bounds: Bounds, grow: f32, value: Luma<u8>) -> bool {
    let rx = (bounds.width / 2.0 + grow).round() as i32;
    let ry = (bounds.height / 2.0 + grow).round() as i32;
    if rx < 1 || ry < 1 {
        return false;
    }
    let center = (
        (bounds.x + bounds.width / 2.0).round() as i32,
        (bounds.y + bounds.height / 2.0).round() as i32,
    );
    draw_filled_ellipse_mut(mask, center, rx, ry, value);
    true
}

pub(crate) fn fill_ellipse(image: &mut RgbaImage, bounds: Bounds, color: Color) {
    let mut mask = mask_for(image);
    if mask_ellipse(&mut mask, bounds, 0.0, COVERED) {
        composite(image, &mask, color, BlendMode::Normal);
    }
}

pub(crate) fn stroke_ellipse(image: &mut RgbaImage, bounds: Bounds, width: f32, color: Color) {
    let mut mask = mask_for(image);
    if !mask_ellipse(&mut mask, bounds, width / 2.0, COVERED) {
        return;
    }
    mask_ellipse(&mut mask, bounds, -width / 2.0, CLEAR);
    composite(image, &mask, color, BlendMode::Normal);
}

/// Draw a single line of text with its top-left corner at `origin`
pub(crate) fn draw_text(
    image: &mut RgbaImage,
    origin: Point,
    text: &str,
    font_size: f32,
    color: Color,
) -> Result<()> {
    if text.is_empty() || font_size <= 0.0 {
        return Ok(());
    }
    let font = overlay_font()?;
    let mut mask = mask_for(image);
    draw_text_mut(
        &mut mask,
        COVERED,
        origin.x.round() as i32,
        origin.y.round() as i32,
        PxScale::from(font_size),
        &font,
        text,
    );
    composite(image, &mask, color, BlendMode::Normal);
    Ok(())
}

/// Alpha-composite `source` scaled into `bounds`
pub(crate) fn draw_image(image: &mut RgbaImage, source: &RgbaImage, bounds: Bounds) {
    let width = bounds.width.round().max(1.0) as u32;
    let height = bounds.height.round().max(1.0) as u32;
    let scaled = if source.dimensions() == (width, height) {
        source.clone()
    } else {
        image::imageops::resize(source, width, height, image::imageops::FilterType::Triangle)
    };
    image::imageops::overlay(image, &scaled, bounds.x.round() as i64, bounds.y.round() as i64);
}
