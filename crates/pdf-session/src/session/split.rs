use super::render_position;
use crate::document::{PageRenderer, SourceDocument};
use crate::export::{ExportJob, ExportPipeline, PageSource};
use crate::options::SessionOptions;
use crate::page_order::PageOrder;
use crate::types::*;
use image::RgbaImage;
use std::sync::Arc;

/// Pick pages of one document to extract
pub struct SplitSession {
    renderer: Arc<dyn PageRenderer>,
    options: SessionOptions,
    document: Option<SourceDocument>,
    pages: PageOrder,
    dirty: bool,
}

impl SplitSession {
    pub fn new(renderer: Arc<dyn PageRenderer>, options: SessionOptions) -> Self {
        Self {
            renderer,
            options,
            document: None,
            pages: PageOrder::new(0),
            dirty: false,
        }
    }

    /// Load a document with an empty selection
    pub async fn open(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> Result<usize> {
        let document = SourceDocument::load(name, bytes).await?;
        let page_count = document.page_count() as usize;
        self.pages = PageOrder::new(page_count);
        self.document = Some(document);
        self.dirty = false;
        Ok(page_count)
    }

    pub fn document(&self) -> Option<&SourceDocument> {
        self.document.as_ref()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Flip the page at `position`; `None` when there is no such page
    pub fn toggle(&mut self, position: usize) -> Option<bool> {
        let selected = self.pages.toggle_select(position)?;
        self.dirty = true;
        Some(selected)
    }

    pub fn is_selected(&self, position: usize) -> bool {
        self.pages.is_selected(position)
    }

    pub fn select_all(&mut self) -> bool {
        self.dirty = true;
        self.pages.select_all()
    }

    pub fn deselect_all(&mut self) -> bool {
        self.dirty = true;
        self.pages.deselect_all()
    }

    /// Select all unless everything already is; returns whether all are selected now
    pub fn toggle_all(&mut self) -> bool {
        self.dirty = true;
        self.pages.toggle_all()
    }

    /// Selected original indices, ascending
    pub fn selected(&self) -> Vec<usize> {
        self.pages.selected()
    }

    pub async fn thumbnail(&self, position: usize) -> Result<RgbaImage> {
        render_position(
            &self.renderer,
            self.document.as_ref(),
            self.pages.original_index(position),
            self.options.thumbnail_scale,
        )
        .await
    }

    pub async fn preview(&self, position: usize) -> Result<RgbaImage> {
        render_position(
            &self.renderer,
            self.document.as_ref(),
            self.pages.original_index(position),
            self.options.preview_scale,
        )
        .await
    }

    /// Copy the selected pages, lowest page first, into a new document
    pub async fn export(&mut self, name: &str) -> Result<ExportArtifact> {
        let document = match &self.document {
            Some(document) if self.pages.selection_len() > 0 => document.clone(),
            _ => {
                return Err(SessionError::EmptySelection(
                    "Select pages to extract first".to_string(),
                ));
            }
        };
        let source = PageSource::Selected {
            document,
            indices: self.pages.selected(),
        };
        let mut pipeline = ExportPipeline::new(Arc::clone(&self.renderer), self.options.clone());
        let artifact = pipeline.run(ExportJob::new(name, source)).await?;
        self.dirty = false;
        Ok(artifact)
    }

    /// Drop the document and selection
    pub fn discard(&mut self) {
        self.document = None;
        self.pages = PageOrder::new(0);
        self.dirty = false;
    }
}
