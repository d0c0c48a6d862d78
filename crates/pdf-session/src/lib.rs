pub mod constants;
pub mod document;
pub mod export;
mod file_queue;
mod history;
mod options;
mod page_order;
mod page_state;
mod reorder;
pub mod scene;
pub mod session;
mod snapshot;
mod types;

pub use document::{PageBoxRenderer, PageRenderer, PdfAssembler, SourceDocument};
pub use export::{ExportJob, ExportPipeline, ExportProgress, ExportStage, PageSource, save_artifact};
pub use file_queue::{FileId, FileQueue, FileSource, QueuedFile};
pub use history::{History, UndoController};
pub use options::*;
pub use page_order::PageOrder;
pub use page_state::PageStateMap;
pub use session::{EditorSession, MergeSession, OrganizeSession, SignaturePad, SplitSession, Tool, ToolState};
pub use snapshot::{Snapshot, capture, restore};
pub use types::*;

#[cfg(feature = "pdfium")]
pub use document::PdfiumRenderer;
