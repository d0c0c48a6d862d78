//! Turning session state into downloadable artifacts

mod job;
mod pipeline;

pub use job::{ExportJob, PageSource, resolve_name};
pub use pipeline::{ExportPipeline, ExportProgress, ExportStage, save_artifact};

pub(crate) use pipeline::encode_png;
