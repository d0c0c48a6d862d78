//! Per-mode sessions driving the engine components
//!
//! Each session owns its state explicitly; a host keeps one of each and
//! forwards UI triggers to their methods.

mod editor;
mod merge;
mod organize;
mod signature;
mod split;
mod tools;

pub use editor::EditorSession;
pub use merge::MergeSession;
pub use organize::OrganizeSession;
pub use signature::SignaturePad;
pub use split::SplitSession;
pub use tools::{Brush, Tool, ToolState, centered_image};

use crate::document::{PageRenderer, SourceDocument};
use crate::types::*;
use image::RgbaImage;
use std::sync::Arc;

/// Render a 1-based page on a blocking task
pub(crate) async fn render_blocking(
    renderer: &Arc<dyn PageRenderer>,
    document: &SourceDocument,
    page_number: u32,
    scale: f32,
) -> Result<RgbaImage> {
    let renderer = Arc::clone(renderer);
    let document = document.clone();
    tokio::task::spawn_blocking(move || renderer.render_page(&document, page_number, scale)).await?
}

/// Render the page displayed at `position` of an arrangement
pub(crate) async fn render_position(
    renderer: &Arc<dyn PageRenderer>,
    document: Option<&SourceDocument>,
    original_index: Option<usize>,
    scale: f32,
) -> Result<RgbaImage> {
    let document = document.ok_or(SessionError::NoDocument)?;
    let index = original_index.ok_or(SessionError::InvalidPage {
        page: 0,
        page_count: document.page_count(),
    })?;
    render_blocking(renderer, document, index as u32 + 1, scale).await
}
