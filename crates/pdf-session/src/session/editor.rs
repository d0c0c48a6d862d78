//! Page-by-page annotation of one document
//!
//! The session keeps exactly one page on the canvas at a time. Leaving a page
//! commits its overlay to the [`PageStateMap`]; arriving at a page replays the
//! stored overlay on top of a freshly rendered background. Undo history is
//! cleared on every navigation, so it never reaches across pages.

use super::signature::SignaturePad;
use super::tools::{Tool, ToolState, centered_image};
use super::render_blocking;
use crate::document::{PageRenderer, SourceDocument};
use crate::export::{ExportJob, ExportPipeline, ExportProgress, PageSource};
use crate::history::UndoController;
use crate::options::SessionOptions;
use crate::page_state::PageStateMap;
use crate::scene::{CanvasSurface, ObjectRef, Point, SceneObject};
use crate::snapshot::{capture, restore};
use crate::types::*;
use image::RgbaImage;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;

pub struct EditorSession<C: CanvasSurface> {
    canvas: C,
    renderer: Arc<dyn PageRenderer>,
    options: SessionOptions,
    document: Option<SourceDocument>,
    current_page: u32,
    page_states: PageStateMap,
    undo: UndoController,
    tools: ToolState,
    zoom: f32,
    dirty: bool,
    progress_tx: Option<mpsc::UnboundedSender<ExportProgress>>,
}

impl<C: CanvasSurface> EditorSession<C> {
    pub fn new(canvas: C, renderer: Arc<dyn PageRenderer>, options: SessionOptions) -> Self {
        let undo = UndoController::new(options.history_capacity);
        Self {
            canvas,
            renderer,
            options,
            document: None,
            current_page: 1,
            page_states: PageStateMap::new(),
            undo,
            tools: ToolState::default(),
            zoom: 1.0,
            dirty: false,
            progress_tx: None,
        }
    }

    /// Publish export progress on `tx`
    pub fn set_progress_sender(&mut self, tx: mpsc::UnboundedSender<ExportProgress>) {
        self.progress_tx = Some(tx);
    }

    /// Load a document and show its first page.
    ///
    /// On failure the previous document, page states and canvas are kept.
    pub async fn open(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> Result<u32> {
        let document = SourceDocument::load(name, bytes).await?;
        let raster = render_blocking(&self.renderer, &document, 1, self.options.display_scale)
            .await
            .map_err(SessionError::load)?;

        let page_count = document.page_count();
        self.document = Some(document);
        self.page_states = PageStateMap::new();
        self.current_page = 1;
        self.dirty = false;
        self.show_page(raster)?;
        Ok(page_count)
    }

    pub async fn open_path(&mut self, path: impl AsRef<Path>) -> Result<u32> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| SessionError::load(format!("{}: {e}", path.display())))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.open(name, bytes).await
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn document(&self) -> Option<&SourceDocument> {
        self.document.as_ref()
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_count(&self) -> u32 {
        self.document.as_ref().map_or(0, SourceDocument::page_count)
    }

    pub fn page_states(&self) -> &PageStateMap {
        &self.page_states
    }

    pub fn undo_controller(&self) -> &UndoController {
        &self.undo
    }

    pub fn tools(&self) -> &ToolState {
        &self.tools
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether a previous/next button should be enabled
    pub fn can_go(&self, direction: Direction) -> bool {
        match direction {
            Direction::Backward => self.document.is_some() && self.current_page > 1,
            Direction::Forward => self.current_page < self.page_count(),
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub async fn change_page(&mut self, offset: i32) -> Result<Outcome> {
        let target = self.current_page as i64 + offset as i64;
        if target < 1 {
            return Ok(Outcome::Boundary);
        }
        self.go_to_page(target as u32).await
    }

    /// Commit the current overlay, then display `page_number`.
    ///
    /// The target raster is rendered before anything changes, so a render
    /// failure leaves the session on the current page with its state intact.
    pub async fn go_to_page(&mut self, page_number: u32) -> Result<Outcome> {
        let Some(document) = &self.document else {
            return Ok(Outcome::Boundary);
        };
        if page_number == 0 || page_number > document.page_count() {
            log::debug!("Page {page_number} is outside 1..={}", document.page_count());
            return Ok(Outcome::Boundary);
        }
        if page_number == self.current_page {
            return Ok(Outcome::Boundary);
        }

        let raster =
            render_blocking(&self.renderer, document, page_number, self.options.display_scale)
                .await?;

        self.page_states
            .save_current(self.current_page, capture(&self.canvas)?);
        self.current_page = page_number;
        self.show_page(raster)?;
        Ok(Outcome::Applied)
    }

    /// Repopulate the canvas for `current_page` on top of `raster`
    fn show_page(&mut self, raster: RgbaImage) -> Result<()> {
        let (width, height) = raster.dimensions();
        self.canvas.clear();
        self.canvas.set_size(width, height);
        self.canvas.set_background(raster);
        if let Some(snapshot) = self.page_states.load_for(self.current_page) {
            restore(&mut self.canvas, snapshot)?;
        }
        self.undo.reset(&self.canvas)?;
        log::debug!("Showing page {}/{}", self.current_page, self.page_count());
        Ok(())
    }

    // =========================================================================
    // Zoom
    // =========================================================================

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) -> f32 {
        self.zoom = self.options.clamp_zoom(zoom);
        self.zoom
    }

    pub fn adjust_zoom(&mut self, delta: f32) -> f32 {
        self.set_zoom(self.zoom + delta)
    }

    /// One pinch step in or out
    pub fn pinch(&mut self, direction: Direction) -> f32 {
        self.adjust_zoom(direction.offset() as f32 * self.options.zoom_step)
    }

    /// Fit the page width into `available_px`, never enlarging past 100%
    pub fn fit_to_width(&mut self, available_px: f32) -> f32 {
        let (width, _) = self.canvas.size();
        if width == 0 {
            return self.zoom;
        }
        let fit = (available_px - self.options.fit_padding_px) / width as f32;
        self.set_zoom(fit.min(1.0))
    }

    // =========================================================================
    // Tools
    // =========================================================================

    pub fn set_tool(&mut self, tool: Tool) {
        self.tools.tool = tool;
    }

    pub fn set_color(&mut self, color: crate::scene::Color) -> Result<bool> {
        self.tools.color = color;
        self.update_style()
    }

    pub fn set_size(&mut self, size: u32) -> Result<bool> {
        self.tools.size = size.max(1);
        self.update_style()
    }

    pub fn set_font_family(&mut self, family: impl Into<String>) -> Result<bool> {
        self.tools.font_family = family.into();
        self.update_style()
    }

    /// Change several toolbar fields at once; the selected text is restyled
    /// as a single undo step
    pub fn set_style(
        &mut self,
        color: Option<crate::scene::Color>,
        size: Option<u32>,
        font_family: Option<String>,
    ) -> Result<bool> {
        if let Some(color) = color {
            self.tools.color = color;
        }
        if let Some(size) = size {
            self.tools.size = size.max(1);
        }
        if let Some(family) = font_family {
            self.tools.font_family = family;
        }
        self.update_style()
    }

    /// Restyle the selected text object with the toolbar; true if one changed
    pub fn update_style(&mut self) -> Result<bool> {
        let Some(id) = self.single_selection() else {
            return Ok(false);
        };
        let changed = match self.canvas.object_mut(id) {
            Some(object) => self.tools.apply_style(object),
            None => false,
        };
        if changed {
            self.commit()?;
        }
        Ok(changed)
    }

    /// Select objects; a lone text object pushes its style into the toolbar
    pub fn select(&mut self, ids: Vec<ObjectRef>) {
        self.canvas.set_active_selection(ids);
        if let Some(object) = self.single_selection().and_then(|id| self.canvas.object(id)) {
            self.tools.sync_from(object);
        }
    }

    fn single_selection(&self) -> Option<ObjectRef> {
        match self.canvas.active_selection().as_slice() {
            [id] => Some(*id),
            _ => None,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    fn commit(&mut self) -> Result<()> {
        self.undo.record_mutation(&self.canvas)?;
        self.dirty = true;
        Ok(())
    }

    fn ensure_document(&self) -> Result<()> {
        if self.document.is_none() {
            return Err(SessionError::NoDocument);
        }
        Ok(())
    }

    /// Add any object as one undoable step
    pub fn add_object(&mut self, object: SceneObject) -> Result<ObjectRef> {
        self.ensure_document()?;
        let id = self.canvas.add_object(object);
        self.commit()?;
        Ok(id)
    }

    /// Finish a freehand stroke with the active pen or highlighter
    pub fn add_stroke(&mut self, points: Vec<Point>) -> Result<Option<ObjectRef>> {
        match self.tools.stroke(points) {
            Some(object) => self.add_object(object).map(Some),
            None => Ok(None),
        }
    }

    /// Place a text box when the text tool is active; the tool reverts to pan
    pub fn place_text(&mut self, origin: Point) -> Result<Option<ObjectRef>> {
        if self.tools.tool != Tool::Text {
            return Ok(None);
        }
        let id = self.add_object(self.tools.text_box(origin))?;
        self.canvas.set_active_selection(vec![id]);
        self.tools.tool = Tool::Pan;
        Ok(Some(id))
    }

    /// Replace the content of a text object
    pub fn edit_text(&mut self, id: ObjectRef, text: impl Into<String>) -> Result<bool> {
        let text = text.into();
        self.modify_object(id, |object| match object {
            SceneObject::Text { content, .. } => {
                *content = text;
                true
            }
            _ => false,
        })
    }

    /// Apply an edit to one object; `edit` returns whether anything changed
    pub fn modify_object<F>(&mut self, id: ObjectRef, edit: F) -> Result<bool>
    where
        F: FnOnce(&mut SceneObject) -> bool,
    {
        let changed = self.canvas.object_mut(id).is_some_and(edit);
        if changed {
            self.commit()?;
        }
        Ok(changed)
    }

    /// Decode an uploaded image and place it centred, scaled to the target width
    pub fn insert_image(&mut self, bytes: &[u8]) -> Result<ObjectRef> {
        self.ensure_document()?;
        let image = image::load_from_memory(bytes)?.to_rgba8();
        let object = centered_image(
            &image,
            self.canvas.size(),
            self.options.image_target_width,
        )?;
        self.place_selected(object)
    }

    /// Place a finished signature; an empty pad inserts nothing
    pub fn insert_signature(&mut self, pad: &SignaturePad) -> Result<Option<ObjectRef>> {
        self.ensure_document()?;
        match pad.finish(self.canvas.size())? {
            Some(object) => self.place_selected(object).map(Some),
            None => Ok(None),
        }
    }

    fn place_selected(&mut self, object: SceneObject) -> Result<ObjectRef> {
        let id = self.add_object(object)?;
        self.canvas.set_active_selection(vec![id]);
        self.tools.tool = Tool::Pan;
        Ok(id)
    }

    pub fn place_stamp(&mut self, origin: Point, label: impl Into<String>) -> Result<ObjectRef> {
        self.add_object(SceneObject::Stamp {
            origin,
            label: label.into(),
            color: self.tools.color,
        })
    }

    /// Remove every selected object in one undoable step
    pub fn delete_selected(&mut self) -> Result<usize> {
        let selected = self.canvas.active_selection();
        if selected.is_empty() {
            return Ok(0);
        }
        self.canvas.set_active_selection(Vec::new());
        let removed = selected
            .into_iter()
            .filter_map(|id| self.canvas.remove_object(id))
            .count();
        if removed > 0 {
            self.commit()?;
        }
        Ok(removed)
    }

    pub fn undo(&mut self) -> Result<Outcome> {
        let outcome = self.undo.undo(&mut self.canvas)?;
        if outcome.is_applied() {
            self.dirty = true;
        }
        Ok(outcome)
    }

    pub fn redo(&mut self) -> Result<Outcome> {
        let outcome = self.undo.redo(&mut self.canvas)?;
        if outcome.is_applied() {
            self.dirty = true;
        }
        Ok(outcome)
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Export the annotated document (PDF) or the current page (PNG).
    ///
    /// The current page is committed to the page states first. A failed
    /// export leaves `dirty` as it was.
    pub async fn export(&mut self, name: &str, kind: OutputKind) -> Result<ExportArtifact> {
        let Some(document) = &self.document else {
            return Err(SessionError::NoDocument);
        };

        let source = match kind {
            OutputKind::Png => PageSource::Raster {
                image: self.canvas.to_raster()?,
            },
            OutputKind::Pdf => {
                self.page_states
                    .save_current(self.current_page, capture(&self.canvas)?);
                PageSource::Annotated {
                    document: document.clone(),
                    states: self.page_states.clone(),
                }
            }
        };

        let mut pipeline = ExportPipeline::new(Arc::clone(&self.renderer), self.options.clone());
        if let Some(tx) = &self.progress_tx {
            pipeline = pipeline.with_progress(tx.clone());
        }
        let artifact = pipeline.run(ExportJob::new(name, source)).await?;
        self.dirty = false;
        Ok(artifact)
    }

    /// Forget the document and every page state
    pub fn discard(&mut self) -> Result<()> {
        self.document = None;
        self.page_states = PageStateMap::new();
        self.current_page = 1;
        self.canvas.clear();
        self.undo.reset(&self.canvas)?;
        self.dirty = false;
        Ok(())
    }
}
