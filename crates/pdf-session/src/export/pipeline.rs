use super::job::{ExportJob, PageSource};
use crate::document::{PageRenderer, PdfAssembler, SourceDocument};
use crate::file_queue::QueuedFile;
use crate::options::SessionOptions;
use crate::page_state::PageStateMap;
use crate::scene::{CanvasSurface, RasterCanvas};
use crate::snapshot::restore;
use crate::types::*;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Where a running export currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportStage {
    #[default]
    Idle,
    /// Reading and parsing queued files (1-based `current`)
    Loading { current: usize, total: usize },
    /// Rasterizing pages (1-based `current`)
    Rendering { current: usize, total: usize },
    Assembling,
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportProgress {
    pub file_name: String,
    pub stage: ExportStage,
}

/// Cloneable handle used to publish progress from blocking tasks
#[derive(Clone)]
struct Reporter {
    file_name: String,
    tx: Option<mpsc::UnboundedSender<ExportProgress>>,
}

impl Reporter {
    fn report(&self, stage: ExportStage) {
        log::debug!("Export {}: {:?}", self.file_name, stage);
        if let Some(tx) = &self.tx {
            // Receiver gone means nobody is watching; the export carries on
            let _ = tx.send(ExportProgress {
                file_name: self.file_name.clone(),
                stage,
            });
        }
    }
}

/// Runs export jobs against a renderer.
///
/// A failed job returns an error and no artifact; nothing the caller owns is
/// touched, so the same job can simply be run again.
pub struct ExportPipeline {
    renderer: Arc<dyn PageRenderer>,
    options: SessionOptions,
    stage: ExportStage,
    progress_tx: Option<mpsc::UnboundedSender<ExportProgress>>,
}

impl ExportPipeline {
    pub fn new(renderer: Arc<dyn PageRenderer>, options: SessionOptions) -> Self {
        Self {
            renderer,
            options,
            stage: ExportStage::Idle,
            progress_tx: None,
        }
    }

    /// Publish every stage change on `tx`
    pub fn with_progress(mut self, tx: mpsc::UnboundedSender<ExportProgress>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn stage(&self) -> ExportStage {
        self.stage
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub async fn run(&mut self, job: ExportJob) -> Result<ExportArtifact> {
        job.source.check_not_empty()?;

        let reporter = Reporter {
            file_name: job.file_name.clone(),
            tx: self.progress_tx.clone(),
        };
        log::info!("Exporting {}", job.file_name);

        match self.execute(job.source, &reporter).await {
            Ok(bytes) => {
                self.finish(&reporter, ExportStage::Done);
                log::info!("Exported {} ({} bytes)", job.file_name, bytes.len());
                Ok(ExportArtifact {
                    file_name: job.file_name,
                    kind: job.kind,
                    bytes,
                })
            }
            Err(e) => {
                self.finish(&reporter, ExportStage::Failed);
                log::error!("Export of {} failed: {}", job.file_name, e);
                Err(e)
            }
        }
    }

    fn finish(&mut self, reporter: &Reporter, stage: ExportStage) {
        self.stage = stage;
        reporter.report(stage);
    }

    async fn execute(&mut self, source: PageSource, reporter: &Reporter) -> Result<Vec<u8>> {
        match source {
            PageSource::Annotated { document, states } => {
                self.stage = ExportStage::Rendering {
                    current: 0,
                    total: document.page_count() as usize,
                };
                let renderer = Arc::clone(&self.renderer);
                let options = self.options.clone();
                let reporter = reporter.clone();
                tokio::task::spawn_blocking(move || {
                    render_annotated(renderer.as_ref(), &document, &states, &options, &reporter)
                })
                .await
                .map_err(|e| SessionError::export(ExportStageName::Rendering, e.into()))?
            }
            PageSource::Arranged { document, indices }
            | PageSource::Selected { document, indices } => {
                self.stage = ExportStage::Assembling;
                reporter.report(ExportStage::Assembling);
                let quality = self.options.jpeg_quality;
                tokio::task::spawn_blocking(move || copy_documents(&[(document, indices)], quality))
                    .await
                    .map_err(|e| SessionError::export(ExportStageName::Assembling, e.into()))?
            }
            PageSource::Queue { files } => {
                let documents = self.load_queue(&files, reporter).await?;
                self.stage = ExportStage::Assembling;
                reporter.report(ExportStage::Assembling);
                let quality = self.options.jpeg_quality;
                tokio::task::spawn_blocking(move || copy_documents(&documents, quality))
                    .await
                    .map_err(|e| SessionError::export(ExportStageName::Assembling, e.into()))?
            }
            PageSource::Raster { image } => encode_png(&image)
                .map_err(|e| SessionError::export(ExportStageName::Encoding, e)),
        }
    }

    /// Read and parse queued files in order; merge never works from cached parses
    async fn load_queue(
        &mut self,
        files: &[QueuedFile],
        reporter: &Reporter,
    ) -> Result<Vec<(SourceDocument, Vec<usize>)>> {
        let total = files.len();
        let mut documents = Vec::with_capacity(total);
        for (i, file) in files.iter().enumerate() {
            let stage = ExportStage::Loading {
                current: i + 1,
                total,
            };
            self.stage = stage;
            reporter.report(stage);

            let loaded = match file.source.read().await {
                Ok(bytes) => SourceDocument::load(file.name.clone(), bytes).await,
                Err(e) => Err(e),
            };
            let document =
                loaded.map_err(|e| SessionError::export(ExportStageName::Loading, e))?;
            let indices = (0..document.page_count() as usize).collect();
            documents.push((document, indices));
        }
        Ok(documents)
    }
}

/// Rasterize every page at export scale, replay its stored overlay on top and
/// append the flattened result as a new page
fn render_annotated(
    renderer: &dyn PageRenderer,
    document: &SourceDocument,
    states: &PageStateMap,
    options: &SessionOptions,
    reporter: &Reporter,
) -> Result<Vec<u8>> {
    let total = document.page_count();
    let mut assembler = PdfAssembler::new(options.jpeg_quality);

    for page_number in 1..=total {
        reporter.report(ExportStage::Rendering {
            current: page_number as usize,
            total: total as usize,
        });

        let flattened = flatten_page(renderer, document, states, page_number, options.export_scale)
            .map_err(|e| SessionError::export(ExportStageName::Rendering, e))?;
        let orientation = Orientation::from_size(flattened.width(), flattened.height());
        assembler
            .append_raster_as_page(&flattened, orientation, options.export_scale)
            .map_err(|e| SessionError::export(ExportStageName::Assembling, e))?;
    }

    reporter.report(ExportStage::Assembling);
    assembler
        .serialize()
        .map_err(|e| SessionError::export(ExportStageName::Assembling, e))
}

fn flatten_page(
    renderer: &dyn PageRenderer,
    document: &SourceDocument,
    states: &PageStateMap,
    page_number: u32,
    scale: f32,
) -> Result<RgbaImage> {
    let background = renderer.render_page(document, page_number, scale)?;
    let (width, height) = background.dimensions();

    // Detached surface so the live editor canvas is never disturbed
    let mut canvas = RasterCanvas::new(width, height);
    canvas.set_background(background);
    if let Some(snapshot) = states.load_for(page_number) {
        restore(&mut canvas, snapshot)?;
    }
    canvas.to_raster()
}

fn copy_documents(documents: &[(SourceDocument, Vec<usize>)], jpeg_quality: u8) -> Result<Vec<u8>> {
    let mut assembler = PdfAssembler::new(jpeg_quality);
    for (document, indices) in documents {
        assembler
            .copy_pages(document, indices)
            .map_err(|e| SessionError::export(ExportStageName::Assembling, e))?;
    }
    assembler
        .serialize()
        .map_err(|e| SessionError::export(ExportStageName::Assembling, e))
}

pub(crate) fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Write an artifact into `dir`, creating the directory if needed
pub async fn save_artifact(artifact: &ExportArtifact, dir: impl AsRef<Path>) -> Result<PathBuf> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(&artifact.file_name);
    tokio::fs::write(&path, &artifact.bytes).await?;
    log::info!("Saved {}", path.display());
    Ok(path)
}
