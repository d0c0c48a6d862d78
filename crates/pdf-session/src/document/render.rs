//! Page rasterization

use super::source::SourceDocument;
use crate::types::*;
use image::{Rgba, RgbaImage};

#[cfg(feature = "pdfium")]
use pdfium_render::prelude::*;

/// Turns a page into a raster. Called from blocking tasks.
pub trait PageRenderer: Send + Sync {
    /// Render a 1-based page at `scale` (1.0 = one pixel per point)
    fn render_page(&self, document: &SourceDocument, page_number: u32, scale: f32)
    -> Result<RgbaImage>;
}

/// Raster size for a page at `scale`, never smaller than 1x1
pub fn raster_size(document: &SourceDocument, page_number: u32, scale: f32) -> Result<(u32, u32)> {
    let (width, height) = document.page_size(page_number)?;
    Ok((
        (width * scale).round().max(1.0) as u32,
        (height * scale).round().max(1.0) as u32,
    ))
}

/// Renders blank white pages of the right size.
///
/// Used when pdfium is unavailable, and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageBoxRenderer;

impl PageRenderer for PageBoxRenderer {
    fn render_page(
        &self,
        document: &SourceDocument,
        page_number: u32,
        scale: f32,
    ) -> Result<RgbaImage> {
        let (width, height) = raster_size(document, page_number, scale)?;
        Ok(RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255])))
    }
}

/// Initialize Pdfium, trying the vendored library first, then falling back to system
#[cfg(feature = "pdfium")]
pub fn init_pdfium() -> std::result::Result<Pdfium, PdfiumError> {
    // Try to load from vendor directory (relative to workspace root)
    let vendor_path = std::env::current_dir().ok().and_then(|mut p| {
        p.push("vendor/pdfium/lib");
        if p.exists() { Some(p) } else { None }
    });

    if let Some(vendor_path) = vendor_path {
        if let Ok(binding) =
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&vendor_path))
        {
            return Ok(Pdfium::new(binding));
        }
    }

    Pdfium::bind_to_system_library().map(Pdfium::new)
}

/// Renders through pdfium. The library is bound per call, so the renderer
/// itself carries no state and can be shared across tasks.
#[cfg(feature = "pdfium")]
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfiumRenderer;

#[cfg(feature = "pdfium")]
impl PdfiumRenderer {
    /// Whether a pdfium library can be bound on this machine
    pub fn is_available() -> bool {
        init_pdfium().is_ok()
    }
}

#[cfg(feature = "pdfium")]
impl PageRenderer for PdfiumRenderer {
    fn render_page(
        &self,
        document: &SourceDocument,
        page_number: u32,
        scale: f32,
    ) -> Result<RgbaImage> {
        let index = document.check_page(page_number)?;
        let render_err = |e: PdfiumError| SessionError::Render(e.to_string());

        let pdfium = init_pdfium().map_err(render_err)?;
        let pdf = pdfium
            .load_pdf_from_byte_slice(document.bytes(), None)
            .map_err(render_err)?;
        let page = pdf.pages().get(index as u16).map_err(render_err)?;

        let config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let bitmap = page.render_with_config(&config).map_err(render_err)?;
        let width = bitmap.width() as u32;
        let height = bitmap.height() as u32;
        let rgba_data = bitmap.as_rgba_bytes().to_vec();

        RgbaImage::from_raw(width, height, rgba_data).ok_or_else(|| {
            SessionError::Render(format!(
                "Bitmap for page {page_number} does not match {width}x{height}"
            ))
        })
    }
}
