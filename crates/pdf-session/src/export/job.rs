use crate::constants::*;
use crate::document::SourceDocument;
use crate::file_queue::QueuedFile;
use crate::page_state::PageStateMap;
use crate::types::*;
use image::RgbaImage;

/// Pages that make up one export
#[derive(Debug, Clone)]
pub enum PageSource {
    /// Every page rasterized at export scale with its stored overlay
    Annotated {
        document: SourceDocument,
        states: PageStateMap,
    },
    /// Structural copy of pages in arranged order (organize)
    Arranged {
        document: SourceDocument,
        indices: Vec<usize>,
    },
    /// Structural copy of selected pages; the job sorts them ascending (split)
    Selected {
        document: SourceDocument,
        indices: Vec<usize>,
    },
    /// Every page of every file, files in queue order (merge)
    Queue { files: Vec<QueuedFile> },
    /// One already flattened raster, encoded as PNG
    Raster { image: RgbaImage },
}

impl PageSource {
    fn default_name(&self) -> &'static str {
        match self {
            PageSource::Annotated { .. } | PageSource::Raster { .. } => DEFAULT_EDITOR_NAME,
            PageSource::Arranged { .. } => DEFAULT_ORGANIZE_NAME,
            PageSource::Selected { .. } => DEFAULT_SPLIT_NAME,
            PageSource::Queue { .. } => DEFAULT_MERGE_NAME,
        }
    }

    fn kind(&self) -> OutputKind {
        match self {
            PageSource::Raster { .. } => OutputKind::Png,
            _ => OutputKind::Pdf,
        }
    }

    /// Reject sources with nothing to export
    pub(crate) fn check_not_empty(&self) -> Result<()> {
        match self {
            PageSource::Arranged { indices, .. } if indices.is_empty() => Err(
                SessionError::EmptySelection("No pages left to export".to_string()),
            ),
            PageSource::Selected { indices, .. } if indices.is_empty() => Err(
                SessionError::EmptySelection("Select pages to extract first".to_string()),
            ),
            PageSource::Queue { files } if files.len() < MIN_MERGE_FILES => {
                Err(SessionError::EmptySelection(format!(
                    "Select at least {MIN_MERGE_FILES} PDFs to merge"
                )))
            }
            _ => Ok(()),
        }
    }
}

/// One export request
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub file_name: String,
    pub kind: OutputKind,
    pub source: PageSource,
}

impl ExportJob {
    /// Build a job, falling back to the mode's default name when `name` is blank
    pub fn new(name: &str, source: PageSource) -> Self {
        let stem = resolve_name(name, source.default_name());
        let kind = source.kind();
        let mut source = source;
        if let PageSource::Selected { indices, .. } = &mut source {
            indices.sort_unstable();
            indices.dedup();
        }
        Self {
            file_name: format!("{stem}.{}", kind.extension()),
            kind,
            source,
        }
    }
}

/// Trimmed user name, or `default` when it is empty
pub fn resolve_name(name: &str, default: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_name() {
        assert_eq!(resolve_name("  ", DEFAULT_MERGE_NAME), "Merged_Doc");
        assert_eq!(resolve_name(" report ", DEFAULT_MERGE_NAME), "report");
    }

    #[test]
    fn test_raster_job_is_png() {
        let job = ExportJob::new(
            "",
            PageSource::Raster {
                image: RgbaImage::new(2, 2),
            },
        );
        assert_eq!(job.kind, OutputKind::Png);
        assert_eq!(job.file_name, "Edited_Document.png");
    }

    #[test]
    fn test_short_queue_is_empty_selection() {
        let source = PageSource::Queue {
            files: vec![QueuedFile::from_bytes("a.pdf", vec![0u8])],
        };
        let err = source.check_not_empty().unwrap_err();
        assert_eq!(err.kind(), FailureKind::EmptySelection);
    }
}
