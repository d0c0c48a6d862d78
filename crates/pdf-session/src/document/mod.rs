//! Source documents, page rasterization and output assembly

mod assemble;
mod render;
mod source;

pub use assemble::PdfAssembler;
pub use render::{PageBoxRenderer, PageRenderer, raster_size};
pub use source::SourceDocument;

#[cfg(feature = "pdfium")]
pub use render::{PdfiumRenderer, init_pdfium};
