use super::render_position;
use crate::document::{PageRenderer, SourceDocument};
use crate::export::{ExportJob, ExportPipeline, PageSource};
use crate::options::SessionOptions;
use crate::page_order::PageOrder;
use crate::types::*;
use image::RgbaImage;
use std::sync::Arc;

/// Reorder and delete pages of one document
pub struct OrganizeSession {
    renderer: Arc<dyn PageRenderer>,
    options: SessionOptions,
    document: Option<SourceDocument>,
    order: PageOrder,
    dirty: bool,
}

impl OrganizeSession {
    pub fn new(renderer: Arc<dyn PageRenderer>, options: SessionOptions) -> Self {
        Self {
            renderer,
            options,
            document: None,
            order: PageOrder::new(0),
            dirty: false,
        }
    }

    /// Load a document; its arrangement starts as the identity order
    pub async fn open(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> Result<usize> {
        let document = SourceDocument::load(name, bytes).await?;
        let page_count = document.page_count() as usize;
        self.order = PageOrder::new(page_count);
        self.document = Some(document);
        self.dirty = false;
        Ok(page_count)
    }

    pub fn document(&self) -> Option<&SourceDocument> {
        self.document.as_ref()
    }

    /// Current arrangement of original 0-based page indices
    pub fn order(&self) -> &[usize] {
        self.order.order()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn move_page(&mut self, position: usize, direction: Direction) -> Outcome {
        let outcome = self.order.move_page(position, direction);
        if outcome.is_applied() {
            self.dirty = true;
        }
        outcome
    }

    /// Delete the page at `position`. When the last page goes, the source is
    /// dropped and the caller should ask for a new upload.
    pub fn delete_page(&mut self, position: usize) -> Outcome {
        let outcome = self.order.delete_at(position);
        match outcome {
            Outcome::Applied => self.dirty = true,
            Outcome::Exhausted => {
                self.dirty = true;
                self.document = None;
                log::info!("All pages deleted; waiting for a new document");
            }
            Outcome::Boundary => {}
        }
        outcome
    }

    pub async fn thumbnail(&self, position: usize) -> Result<RgbaImage> {
        render_position(
            &self.renderer,
            self.document.as_ref(),
            self.order.original_index(position),
            self.options.thumbnail_scale,
        )
        .await
    }

    pub async fn preview(&self, position: usize) -> Result<RgbaImage> {
        render_position(
            &self.renderer,
            self.document.as_ref(),
            self.order.original_index(position),
            self.options.preview_scale,
        )
        .await
    }

    /// Copy the arranged pages, in order, into a new document
    pub async fn export(&mut self, name: &str) -> Result<ExportArtifact> {
        let Some(document) = &self.document else {
            return Err(SessionError::EmptySelection(
                "No pages left to export".to_string(),
            ));
        };
        let source = PageSource::Arranged {
            document: document.clone(),
            indices: self.order.order().to_vec(),
        };
        let mut pipeline = ExportPipeline::new(Arc::clone(&self.renderer), self.options.clone());
        let artifact = pipeline.run(ExportJob::new(name, source)).await?;
        self.dirty = false;
        Ok(artifact)
    }

    /// Drop the document and arrangement
    pub fn discard(&mut self) {
        self.document = None;
        self.order = PageOrder::new(0);
        self.dirty = false;
    }
}
