//! Command dispatch over the four tool sessions

use crate::{NoticeKind, SessionCommand, SessionUpdate};
use pdf_session::scene::{CanvasSurface, ObjectRef, RasterCanvas};
use pdf_session::{
    EditorSession, ExportProgress, MergeSession, OrganizeSession, Outcome, PageRenderer,
    QueuedFile, Result, SessionError, SessionOptions, SignaturePad, SplitSession, save_artifact,
};
use image::RgbaImage;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Top-level screens of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Home,
    Editor,
    Organize,
    Split,
    Merge,
}

/// Result of a screen change request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Switched(Screen),
    /// The active tool is dirty; nothing changed until the user confirms
    NeedsConfirmation,
}

/// All session state of one application instance
pub struct Workbench {
    screen: Screen,
    editor: EditorSession<RasterCanvas>,
    organize: OrganizeSession,
    split: SplitSession,
    merge: MergeSession,
}

impl Workbench {
    pub fn new(renderer: Arc<dyn PageRenderer>, options: SessionOptions) -> Self {
        Self {
            screen: Screen::Home,
            editor: EditorSession::new(
                RasterCanvas::default(),
                Arc::clone(&renderer),
                options.clone(),
            ),
            organize: OrganizeSession::new(Arc::clone(&renderer), options.clone()),
            split: SplitSession::new(Arc::clone(&renderer), options.clone()),
            merge: MergeSession::new(renderer, options),
        }
    }

    /// Publish export progress of the editor and merge tools on `tx`
    pub fn with_progress(mut self, tx: mpsc::UnboundedSender<ExportProgress>) -> Self {
        self.editor.set_progress_sender(tx.clone());
        self.merge.set_progress_sender(tx);
        self
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn editor(&self) -> &EditorSession<RasterCanvas> {
        &self.editor
    }

    pub fn organize(&self) -> &OrganizeSession {
        &self.organize
    }

    pub fn split(&self) -> &SplitSession {
        &self.split
    }

    pub fn merge(&self) -> &MergeSession {
        &self.merge
    }

    /// Whether the active screen has unsaved changes
    pub fn is_dirty(&self) -> bool {
        match self.screen {
            Screen::Home => false,
            Screen::Editor => self.editor.is_dirty(),
            Screen::Organize => self.organize.is_dirty(),
            Screen::Split => self.split.is_dirty(),
            Screen::Merge => self.merge.is_dirty(),
        }
    }

    /// Switch screens unless that would abandon unsaved work
    pub fn navigate(&mut self, target: Screen) -> Navigation {
        if target != self.screen && self.is_dirty() {
            log::info!("Unsaved changes in {:?}; asking before leaving", self.screen);
            return Navigation::NeedsConfirmation;
        }
        self.screen = target;
        Navigation::Switched(target)
    }

    /// Drop the active tool's work and return home
    pub fn confirm_discard(&mut self) -> Result<Screen> {
        match self.screen {
            Screen::Home => {}
            Screen::Editor => self.editor.discard()?,
            Screen::Organize => self.organize.discard(),
            Screen::Split => self.split.discard(),
            Screen::Merge => self.merge.discard(),
        }
        log::info!("Discarded {:?} session", self.screen);
        self.screen = Screen::Home;
        Ok(self.screen)
    }

    /// Run one command; failures come back as notices, never as errors
    pub async fn handle(&mut self, command: SessionCommand) -> Vec<SessionUpdate> {
        match self.dispatch(command).await {
            Ok(updates) => updates,
            Err(e) => {
                log::error!("{e}");
                vec![notice(&e)]
            }
        }
    }

    async fn dispatch(&mut self, command: SessionCommand) -> Result<Vec<SessionUpdate>> {
        use SessionCommand as C;

        let updates = match command {
            C::Open(screen) => self.navigation_updates(screen),
            C::GoHome => self.navigation_updates(Screen::Home),
            C::ConfirmDiscard => vec![SessionUpdate::ScreenChanged {
                screen: self.confirm_discard()?,
            }],

            // Editor
            C::EditorLoad { path } => {
                self.editor.open_path(&path).await?;
                self.editor_updates()?
            }
            C::EditorChangePage { offset } => {
                let outcome = self.editor.change_page(offset).await?;
                self.editor_outcome(outcome, "No page in that direction")?
            }
            C::EditorGoToPage { page } => {
                let outcome = self.editor.go_to_page(page).await?;
                self.editor_outcome(outcome, "No such page")?
            }
            C::EditorZoom { delta } => {
                self.editor.adjust_zoom(delta);
                vec![self.editor_state()]
            }
            C::EditorPinch { direction } => {
                self.editor.pinch(direction);
                vec![self.editor_state()]
            }
            C::EditorFitWidth { available_px } => {
                self.editor.fit_to_width(available_px);
                vec![self.editor_state()]
            }
            C::EditorSetTool { tool } => {
                self.editor.set_tool(tool);
                vec![self.editor_state()]
            }
            C::EditorSetStyle {
                color,
                size,
                font_family,
            } => {
                self.editor.set_style(color, size, font_family)?;
                self.editor_updates()?
            }
            C::EditorSelect { ids } => {
                self.editor.select(ids);
                vec![self.editor_state()]
            }
            C::EditorStroke { points } => {
                self.editor.add_stroke(points)?;
                self.editor_updates()?
            }
            C::EditorPlaceText { origin } => {
                let placed = self.editor.place_text(origin)?;
                self.placed_updates(placed)?
            }
            C::EditorEditText { id, content } => {
                self.editor.edit_text(id, content)?;
                self.editor_updates()?
            }
            C::EditorAddObject { object } => {
                let id = self.editor.add_object(object)?;
                self.placed_updates(Some(id))?
            }
            C::EditorInsertImage { path } => {
                let bytes = tokio::fs::read(&path).await?;
                let id = self.editor.insert_image(&bytes)?;
                self.placed_updates(Some(id))?
            }
            C::EditorInsertSignature { strokes } => {
                let mut pad = SignaturePad::default();
                for stroke in strokes {
                    pad.add_stroke(stroke);
                }
                let placed = self.editor.insert_signature(&pad)?;
                self.placed_updates(placed)?
            }
            C::EditorStamp { origin, label } => {
                let id = self.editor.place_stamp(origin, label)?;
                self.placed_updates(Some(id))?
            }
            C::EditorDeleteSelected => {
                self.editor.delete_selected()?;
                self.editor_updates()?
            }
            C::EditorUndo => {
                let outcome = self.editor.undo()?;
                self.editor_outcome(outcome, "Nothing to undo")?
            }
            C::EditorRedo => {
                let outcome = self.editor.redo()?;
                self.editor_outcome(outcome, "Nothing to redo")?
            }
            C::EditorExport {
                name,
                kind,
                output_dir,
            } => {
                let artifact = self.editor.export(&name, kind).await?;
                let path = save_artifact(&artifact, &output_dir).await?;
                vec![SessionUpdate::Exported { path }, self.editor_state()]
            }

            // Organize
            C::OrganizeLoad { path } => {
                let (name, bytes) = read_source(&path).await?;
                self.organize.open(name, bytes).await?;
                vec![self.organize_order()]
            }
            C::OrganizeMove {
                position,
                direction,
            } => match self.organize.move_page(position, direction) {
                Outcome::Boundary => vec![boundary("Page is already at the edge")],
                _ => vec![self.organize_order()],
            },
            C::OrganizeDelete { position } => match self.organize.delete_page(position) {
                Outcome::Boundary => vec![boundary("No page at that position")],
                Outcome::Exhausted => {
                    vec![self.organize_order(), SessionUpdate::OrganizeExhausted]
                }
                Outcome::Applied => vec![self.organize_order()],
            },
            C::OrganizeRenderThumbnail { position } => {
                let image = self.organize.thumbnail(position).await?;
                vec![page_image(Screen::Organize, position, image)]
            }
            C::OrganizeRenderPreview { position } => {
                let image = self.organize.preview(position).await?;
                vec![page_image(Screen::Organize, position, image)]
            }
            C::OrganizeExport { name, output_dir } => {
                let artifact = self.organize.export(&name).await?;
                let path = save_artifact(&artifact, &output_dir).await?;
                vec![SessionUpdate::Exported { path }, self.organize_order()]
            }

            // Split
            C::SplitLoad { path } => {
                let (name, bytes) = read_source(&path).await?;
                self.split.open(name, bytes).await?;
                vec![self.split_selection()]
            }
            C::SplitToggle { position } => match self.split.toggle(position) {
                Some(_) => vec![self.split_selection()],
                None => vec![boundary("No page at that position")],
            },
            C::SplitToggleAll => {
                self.split.toggle_all();
                vec![self.split_selection()]
            }
            C::SplitRenderThumbnail { position } => {
                let image = self.split.thumbnail(position).await?;
                vec![page_image(Screen::Split, position, image)]
            }
            C::SplitRenderPreview { position } => {
                let image = self.split.preview(position).await?;
                vec![page_image(Screen::Split, position, image)]
            }
            C::SplitExport { name, output_dir } => {
                let artifact = self.split.export(&name).await?;
                let path = save_artifact(&artifact, &output_dir).await?;
                vec![SessionUpdate::Exported { path }]
            }

            // Merge
            C::MergeEnqueue { paths } => {
                self.merge
                    .enqueue(paths.into_iter().map(QueuedFile::from_path));
                vec![self.merge_queue()]
            }
            C::MergeMove { index, direction } => match self.merge.move_file(index, direction) {
                Outcome::Boundary => vec![boundary("File is already at the edge")],
                _ => vec![self.merge_queue()],
            },
            C::MergeRemove { index } => match self.merge.remove_file(index) {
                Outcome::Boundary => vec![boundary("No file at that position")],
                _ => vec![self.merge_queue()],
            },
            C::MergeExport { name, output_dir } => {
                let artifact = self.merge.export(&name).await?;
                let path = save_artifact(&artifact, &output_dir).await?;
                vec![SessionUpdate::Exported { path }]
            }
        };
        Ok(updates)
    }

    /// Apply queued zoom steps in order, reporting only the final state
    pub fn zoom_steps(&mut self, deltas: &[f32]) -> Vec<SessionUpdate> {
        for delta in deltas {
            self.editor.adjust_zoom(*delta);
        }
        vec![self.editor_state()]
    }

    fn navigation_updates(&mut self, target: Screen) -> Vec<SessionUpdate> {
        match self.navigate(target) {
            Navigation::Switched(screen) => vec![SessionUpdate::ScreenChanged { screen }],
            Navigation::NeedsConfirmation => vec![SessionUpdate::UnsavedChanges],
        }
    }

    fn editor_state(&self) -> SessionUpdate {
        let history = self.editor.undo_controller().history();
        SessionUpdate::EditorState {
            page: self.editor.current_page(),
            page_count: self.editor.page_count(),
            zoom: self.editor.zoom(),
            can_undo: history.can_undo(),
            can_redo: history.can_redo(),
            dirty: self.editor.is_dirty(),
            tools: self.editor.tools().clone(),
        }
    }

    /// State plus the freshly flattened page
    fn editor_updates(&self) -> Result<Vec<SessionUpdate>> {
        let raster = self.editor.canvas().to_raster()?;
        let (width, height, rgba_data) = rgba_parts(raster);
        Ok(vec![
            self.editor_state(),
            SessionUpdate::EditorRaster {
                page: self.editor.current_page(),
                width,
                height,
                rgba_data,
            },
        ])
    }

    fn editor_outcome(&self, outcome: Outcome, message: &str) -> Result<Vec<SessionUpdate>> {
        match outcome {
            Outcome::Boundary => Ok(vec![boundary(message)]),
            _ => self.editor_updates(),
        }
    }

    fn placed_updates(&self, placed: Option<ObjectRef>) -> Result<Vec<SessionUpdate>> {
        let mut updates = self.editor_updates()?;
        if let Some(id) = placed {
            updates.push(SessionUpdate::EditorObjectPlaced { id });
        }
        Ok(updates)
    }

    fn organize_order(&self) -> SessionUpdate {
        SessionUpdate::OrganizeOrder {
            order: self.organize.order().to_vec(),
            dirty: self.organize.is_dirty(),
        }
    }

    fn split_selection(&self) -> SessionUpdate {
        let selected = self.split.selected();
        let page_count = self.split.page_count();
        SessionUpdate::SplitSelection {
            all_selected: page_count > 0 && selected.len() == page_count,
            page_count,
            selected,
        }
    }

    fn merge_queue(&self) -> SessionUpdate {
        SessionUpdate::MergeQueue {
            names: self.merge.queue().names(),
        }
    }
}

fn notice(err: &SessionError) -> SessionUpdate {
    SessionUpdate::Notice {
        kind: err.kind().into(),
        message: err.to_string(),
    }
}

fn boundary(message: &str) -> SessionUpdate {
    SessionUpdate::Notice {
        kind: NoticeKind::BoundaryNoOp,
        message: message.to_string(),
    }
}

fn page_image(screen: Screen, position: usize, image: RgbaImage) -> SessionUpdate {
    let (width, height, rgba_data) = rgba_parts(image);
    SessionUpdate::PageImage {
        screen,
        position,
        width,
        height,
        rgba_data,
    }
}

fn rgba_parts(image: RgbaImage) -> (u32, u32, Vec<u8>) {
    let (width, height) = image.dimensions();
    (width, height, image.into_raw())
}

/// Read a document for one of the single-file tools
async fn read_source(path: &Path) -> Result<(String, Vec<u8>)> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| SessionError::Load(format!("{}: {e}", path.display())))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok((name, bytes))
}
