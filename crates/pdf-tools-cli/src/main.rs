use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use pdf_async_runtime::AppLogger;
use pdf_session::scene::{RasterCanvas, SceneObject};
use pdf_session::{
    Direction, EditorSession, MergeSession, OrganizeSession, OutputKind, Outcome,
    PageBoxRenderer, PageRenderer, QueuedFile, SessionOptions, SplitSession, save_artifact,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const LOG_CAPACITY: usize = 256;

#[derive(Parser)]
#[command(name = "pdft", about = "PDF tools CLI", version)]
struct Cli {
    /// Session settings as JSON (see `pdft init-config`)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log progress and details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Concatenate PDFs in the given order
    Merge {
        /// Input PDF files, at least two
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Directory for the result
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Output file name without extension
        #[arg(long, default_value = "")]
        name: String,
    },

    /// Extract selected pages into a new PDF
    Split {
        #[arg(short, long)]
        input: PathBuf,

        /// 1-based page numbers, comma separated; output keeps document order
        #[arg(long, required = true, value_delimiter = ',')]
        pages: Vec<usize>,

        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        #[arg(long, default_value = "")]
        name: String,
    },

    /// Reorder or delete pages
    Organize {
        #[arg(short, long)]
        input: PathBuf,

        /// Edits applied in order: swap-next=N, swap-prev=N or delete=N
        /// (N is the 1-based position at the time the edit runs)
        #[arg(long = "op", value_parser = parse_page_op)]
        ops: Vec<PageOp>,

        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        #[arg(long, default_value = "")]
        name: String,
    },

    /// Flatten overlay objects onto pages
    Annotate {
        #[arg(short, long)]
        input: PathBuf,

        /// JSON object mapping 1-based page numbers to lists of scene objects
        #[arg(long)]
        overlay: PathBuf,

        #[arg(long, default_value = "pdf", value_enum)]
        format: FormatArg,

        /// Page to capture when writing PNG
        #[arg(long, default_value = "1")]
        page: u32,

        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        #[arg(long, default_value = "")]
        name: String,
    },

    /// Write the default settings to a JSON file
    InitConfig {
        #[arg(default_value = "pdft.json")]
        path: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Pdf,
    Png,
}

impl From<FormatArg> for OutputKind {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Pdf => Self::Pdf,
            FormatArg::Png => Self::Png,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageOp {
    SwapNext(usize),
    SwapPrev(usize),
    Delete(usize),
}

fn parse_page_op(arg: &str) -> std::result::Result<PageOp, String> {
    let (op, position) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected OP=PAGE, got '{arg}'"))?;
    let position: usize = position
        .parse()
        .map_err(|_| format!("invalid page number '{position}'"))?;
    if position == 0 {
        return Err("pages are numbered from 1".to_string());
    }
    let index = position - 1;
    match op {
        "swap-next" => Ok(PageOp::SwapNext(index)),
        "swap-prev" => Ok(PageOp::SwapPrev(index)),
        "delete" => Ok(PageOp::Delete(index)),
        other => Err(format!(
            "unknown operation '{other}' (expected swap-next, swap-prev or delete)"
        )),
    }
}

/// Pdfium when it can be bound, otherwise blank pages of the right size
fn page_renderer() -> Arc<dyn PageRenderer> {
    #[cfg(feature = "pdfium")]
    {
        if pdf_session::PdfiumRenderer::is_available() {
            return Arc::new(pdf_session::PdfiumRenderer);
        }
    }
    log::warn!("Pdfium library not found; rendered pages will be blank");
    Arc::new(PageBoxRenderer)
}

async fn read_input(path: &Path) -> Result<(String, Vec<u8>)> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok((name, bytes))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    AppLogger::new(LOG_CAPACITY)
        .with_level(level)
        .with_echo(true)
        .init()?;

    let options = match &cli.config {
        Some(path) => SessionOptions::load(path)
            .await
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SessionOptions::default(),
    };

    match cli.command {
        Commands::Merge {
            input,
            output_dir,
            name,
        } => {
            let mut session = MergeSession::new(page_renderer(), options);
            let count = session.enqueue(input.into_iter().map(QueuedFile::from_path));
            let artifact = session.export(&name).await?;
            let path = save_artifact(&artifact, &output_dir).await?;
            println!("Merged {count} files → {}", path.display());
        }

        Commands::Split {
            input,
            pages,
            output_dir,
            name,
        } => {
            let (file_name, bytes) = read_input(&input).await?;
            let mut session = SplitSession::new(page_renderer(), options);
            let page_count = session.open(file_name, bytes).await?;

            for page in pages {
                if page == 0 || page > page_count {
                    bail!("Page {page} is out of range (document has {page_count} pages)");
                }
                if !session.is_selected(page - 1) {
                    session.toggle(page - 1);
                }
            }
            let selected = session.selected().len();
            let artifact = session.export(&name).await?;
            let path = save_artifact(&artifact, &output_dir).await?;
            println!("Extracted {selected} of {page_count} pages → {}", path.display());
        }

        Commands::Organize {
            input,
            ops,
            output_dir,
            name,
        } => {
            let (file_name, bytes) = read_input(&input).await?;
            let mut session = OrganizeSession::new(page_renderer(), options);
            session.open(file_name, bytes).await?;

            for op in ops {
                let outcome = match op {
                    PageOp::SwapNext(index) => session.move_page(index, Direction::Forward),
                    PageOp::SwapPrev(index) => session.move_page(index, Direction::Backward),
                    PageOp::Delete(index) => session.delete_page(index),
                };
                match outcome {
                    Outcome::Applied => log::debug!("Applied {op:?}"),
                    Outcome::Boundary => log::warn!("Skipped {op:?}: nothing to move or delete"),
                    Outcome::Exhausted => bail!("Every page was deleted; nothing to write"),
                }
            }

            let pages = session.order().len();
            let artifact = session.export(&name).await?;
            let path = save_artifact(&artifact, &output_dir).await?;
            println!("Wrote {pages} pages → {}", path.display());
        }

        Commands::Annotate {
            input,
            overlay,
            format,
            page,
            output_dir,
            name,
        } => {
            let overlay_json = tokio::fs::read(&overlay)
                .await
                .with_context(|| format!("Failed to read {}", overlay.display()))?;
            let overlay: BTreeMap<u32, Vec<SceneObject>> = serde_json::from_slice(&overlay_json)
                .with_context(|| format!("Invalid overlay {}", overlay.display()))?;

            let mut editor =
                EditorSession::new(RasterCanvas::default(), page_renderer(), options);
            let page_count = editor.open_path(&input).await?;

            for (page_number, objects) in overlay {
                if page_number == 0 || page_number > page_count {
                    bail!("Overlay page {page_number} is out of range (document has {page_count} pages)");
                }
                editor.go_to_page(page_number).await?;
                let added = objects.len();
                for object in objects {
                    editor.add_object(object)?;
                }
                log::info!("Placed {added} objects on page {page_number}");
            }

            let kind = OutputKind::from(format);
            if kind == OutputKind::Png {
                if page == 0 || page > page_count {
                    bail!("Page {page} is out of range (document has {page_count} pages)");
                }
                editor.go_to_page(page).await?;
            }
            let artifact = editor.export(&name, kind).await?;
            let path = save_artifact(&artifact, &output_dir).await?;
            println!("Annotated → {}", path.display());
        }

        Commands::InitConfig { path } => {
            SessionOptions::default().save(&path).await?;
            println!("Wrote default settings → {}", path.display());
        }
    }

    Ok(())
}
