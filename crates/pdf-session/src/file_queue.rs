//! Ordered queue of whole documents to concatenate

use crate::reorder::{remove_at, swap_adjacent};
use crate::types::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_FILE_ID: AtomicU64 = AtomicU64::new(1);

/// Distinct handle per queued entry; queuing the same file twice yields two ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(pub u64);

/// Where a queued document's bytes come from
#[derive(Debug, Clone)]
pub enum FileSource {
    Path(PathBuf),
    Bytes(Arc<[u8]>),
}

impl FileSource {
    pub async fn read(&self) -> Result<Vec<u8>> {
        match self {
            FileSource::Path(path) => Ok(tokio::fs::read(path).await?),
            FileSource::Bytes(bytes) => Ok(bytes.to_vec()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueuedFile {
    pub id: FileId,
    pub name: String,
    pub source: FileSource,
}

impl QueuedFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::new(name, FileSource::Path(path))
    }

    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::new(name.into(), FileSource::Bytes(bytes.into()))
    }

    fn new(name: String, source: FileSource) -> Self {
        Self {
            id: FileId(NEXT_FILE_ID.fetch_add(1, Ordering::SeqCst)),
            name,
            source,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FileQueue {
    files: Vec<QueuedFile>,
}

impl FileQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch; earlier entries are kept
    pub fn enqueue(&mut self, files: impl IntoIterator<Item = QueuedFile>) -> usize {
        let before = self.files.len();
        self.files.extend(files);
        let added = self.files.len() - before;
        log::debug!("Queued {added} file(s), {} total", self.files.len());
        added
    }

    pub fn move_file(&mut self, index: usize, direction: Direction) -> Outcome {
        swap_adjacent(&mut self.files, index, direction)
    }

    pub fn remove_at(&mut self, index: usize) -> Outcome {
        let (outcome, removed) = remove_at(&mut self.files, index);
        if let Some(file) = removed {
            log::debug!("Removed {} from merge queue", file.name);
        }
        outcome
    }

    pub fn files(&self) -> &[QueuedFile] {
        &self.files
    }

    pub fn names(&self) -> Vec<String> {
        self.files.iter().map(|f| f.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
