use crate::document::PageRenderer;
use crate::export::{ExportJob, ExportPipeline, ExportProgress, PageSource};
use crate::file_queue::{FileQueue, QueuedFile};
use crate::options::SessionOptions;
use crate::types::*;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Concatenate whole documents in queue order
pub struct MergeSession {
    renderer: Arc<dyn PageRenderer>,
    options: SessionOptions,
    queue: FileQueue,
    dirty: bool,
    progress_tx: Option<mpsc::UnboundedSender<ExportProgress>>,
}

impl MergeSession {
    pub fn new(renderer: Arc<dyn PageRenderer>, options: SessionOptions) -> Self {
        Self {
            renderer,
            options,
            queue: FileQueue::new(),
            dirty: false,
            progress_tx: None,
        }
    }

    pub fn set_progress_sender(&mut self, tx: mpsc::UnboundedSender<ExportProgress>) {
        self.progress_tx = Some(tx);
    }

    /// Append files to the queue; earlier uploads stay where they are
    pub fn enqueue(&mut self, files: impl IntoIterator<Item = QueuedFile>) -> usize {
        let added = self.queue.enqueue(files);
        if added > 0 {
            self.dirty = true;
        }
        added
    }

    pub fn move_file(&mut self, index: usize, direction: Direction) -> Outcome {
        let outcome = self.queue.move_file(index, direction);
        if outcome.is_applied() {
            self.dirty = true;
        }
        outcome
    }

    pub fn remove_file(&mut self, index: usize) -> Outcome {
        let outcome = self.queue.remove_at(index);
        if outcome.is_applied() {
            self.dirty = true;
        }
        outcome
    }

    pub fn files(&self) -> &[QueuedFile] {
        self.queue.files()
    }

    pub fn queue(&self) -> &FileQueue {
        &self.queue
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Parse every queued file and concatenate all their pages
    pub async fn export(&mut self, name: &str) -> Result<ExportArtifact> {
        let source = PageSource::Queue {
            files: self.queue.files().to_vec(),
        };
        let mut pipeline = ExportPipeline::new(Arc::clone(&self.renderer), self.options.clone());
        if let Some(tx) = &self.progress_tx {
            pipeline = pipeline.with_progress(tx.clone());
        }
        let artifact = pipeline.run(ExportJob::new(name, source)).await?;
        self.dirty = false;
        Ok(artifact)
    }

    /// Empty the queue
    pub fn discard(&mut self) {
        self.queue = FileQueue::new();
        self.dirty = false;
    }
}
