use std::path::PathBuf;

mod logger;
mod workbench;
mod worker;

pub use logger::{AppLogger, LogEntry};
pub use workbench::{Navigation, Screen, Workbench};
pub use worker::worker_task;

// Re-export types from library crates
pub use pdf_session::scene::{Color, ObjectRef, Point, SceneObject};
pub use pdf_session::{
    Direction, ExportStage, FailureKind, OutputKind, SessionError, SessionOptions, Tool,
    ToolState,
};

/// Commands sent from UI to worker
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// Enter a tool screen from home
    Open(Screen),
    /// Leave the active tool; prompts first when it has unsaved changes
    GoHome,
    /// Answer to the unsaved-changes prompt: drop the work and go home
    ConfirmDiscard,

    EditorLoad {
        path: PathBuf,
    },
    EditorChangePage {
        offset: i32,
    },
    EditorGoToPage {
        page: u32,
    },
    EditorZoom {
        delta: f32,
    },
    EditorPinch {
        direction: Direction,
    },
    EditorFitWidth {
        available_px: f32,
    },
    EditorSetTool {
        tool: Tool,
    },
    EditorSetStyle {
        color: Option<Color>,
        size: Option<u32>,
        font_family: Option<String>,
    },
    EditorSelect {
        ids: Vec<ObjectRef>,
    },
    EditorStroke {
        points: Vec<Point>,
    },
    EditorPlaceText {
        origin: Point,
    },
    EditorEditText {
        id: ObjectRef,
        content: String,
    },
    EditorAddObject {
        object: SceneObject,
    },
    EditorInsertImage {
        path: PathBuf,
    },
    /// Strokes drawn on the signature pad, in pad coordinates
    EditorInsertSignature {
        strokes: Vec<Vec<Point>>,
    },
    EditorStamp {
        origin: Point,
        label: String,
    },
    EditorDeleteSelected,
    EditorUndo,
    EditorRedo,
    EditorExport {
        name: String,
        kind: OutputKind,
        output_dir: PathBuf,
    },

    OrganizeLoad {
        path: PathBuf,
    },
    OrganizeMove {
        position: usize,
        direction: Direction,
    },
    OrganizeDelete {
        position: usize,
    },
    OrganizeRenderThumbnail {
        position: usize,
    },
    OrganizeRenderPreview {
        position: usize,
    },
    OrganizeExport {
        name: String,
        output_dir: PathBuf,
    },

    SplitLoad {
        path: PathBuf,
    },
    SplitToggle {
        position: usize,
    },
    SplitToggleAll,
    SplitRenderThumbnail {
        position: usize,
    },
    SplitRenderPreview {
        position: usize,
    },
    SplitExport {
        name: String,
        output_dir: PathBuf,
    },

    MergeEnqueue {
        paths: Vec<PathBuf>,
    },
    MergeMove {
        index: usize,
        direction: Direction,
    },
    MergeRemove {
        index: usize,
    },
    MergeExport {
        name: String,
        output_dir: PathBuf,
    },
}

/// User-facing condition classes reported through [`SessionUpdate::Notice`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    LoadFailure,
    EmptySelection,
    /// A move, undo or redo hit a limit; nothing changed
    BoundaryNoOp,
    ExportFailure,
}

impl From<FailureKind> for NoticeKind {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::LoadFailure => NoticeKind::LoadFailure,
            FailureKind::EmptySelection => NoticeKind::EmptySelection,
            FailureKind::ExportFailure => NoticeKind::ExportFailure,
        }
    }
}

/// Updates sent from worker to UI
#[derive(Debug, Clone)]
pub enum SessionUpdate {
    ScreenChanged {
        screen: Screen,
    },
    /// The active tool has unsaved changes; ask before leaving
    UnsavedChanges,
    Notice {
        kind: NoticeKind,
        message: String,
    },
    Progress {
        operation: String,
        current: usize,
        total: usize,
    },
    Exported {
        path: PathBuf,
    },

    EditorState {
        page: u32,
        page_count: u32,
        zoom: f32,
        can_undo: bool,
        can_redo: bool,
        dirty: bool,
        tools: ToolState,
    },
    /// Flattened page (background and overlay) as shown in the editor
    EditorRaster {
        page: u32,
        width: u32,
        height: u32,
        rgba_data: Vec<u8>,
    },
    EditorObjectPlaced {
        id: ObjectRef,
    },

    OrganizeOrder {
        order: Vec<usize>,
        dirty: bool,
    },
    /// Every page was deleted; a new upload is needed
    OrganizeExhausted,
    SplitSelection {
        page_count: usize,
        selected: Vec<usize>,
        all_selected: bool,
    },
    MergeQueue {
        names: Vec<String>,
    },
    PageImage {
        screen: Screen,
        position: usize,
        width: u32,
        height: u32,
        rgba_data: Vec<u8>,
    },
}
