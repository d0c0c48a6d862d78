use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to load document: {0}")]
    Load(String),
    #[error("{0}")]
    EmptySelection(String),
    #[error("Export failed while {stage}: {source}")]
    Export {
        stage: ExportStageName,
        #[source]
        source: Box<SessionError>,
    },
    #[error("No document loaded")]
    NoDocument,
    #[error("Page {page} is out of range (document has {page_count} pages)")]
    InvalidPage { page: u32, page_count: u32 },
    #[error("Render error: {0}")]
    Render(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Scene encoding error: {0}")]
    Scene(#[from] serde_json::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// User-facing failure classes. Every `SessionError` maps onto one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Malformed or unreadable source document
    LoadFailure,
    /// Export requested with nothing to export
    EmptySelection,
    /// A collaborator failed while rendering or assembling
    ExportFailure,
}

impl SessionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SessionError::Load(_) | SessionError::NoDocument => FailureKind::LoadFailure,
            SessionError::EmptySelection(_) => FailureKind::EmptySelection,
            _ => FailureKind::ExportFailure,
        }
    }

    pub(crate) fn load(err: impl fmt::Display) -> Self {
        SessionError::Load(err.to_string())
    }

    pub(crate) fn export(stage: ExportStageName, source: SessionError) -> Self {
        match source {
            // Already wrapped further down the pipeline
            err @ SessionError::Export { .. } => err,
            err => SessionError::Export {
                stage,
                source: Box::new(err),
            },
        }
    }
}

/// Pipeline phase an export failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStageName {
    Loading,
    Rendering,
    Assembling,
    Encoding,
}

impl fmt::Display for ExportStageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExportStageName::Loading => "loading sources",
            ExportStageName::Rendering => "rendering pages",
            ExportStageName::Assembling => "assembling document",
            ExportStageName::Encoding => "encoding image",
        };
        f.write_str(s)
    }
}

/// Result signal for structural edits that may hit a limit.
///
/// None of these are errors; the caller renders them as hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Outcome {
    /// The edit was applied
    Applied,
    /// The edit would cross a structural limit and was skipped
    Boundary,
    /// The edit was applied and left the working list empty
    Exhausted,
}

impl Outcome {
    pub fn is_applied(self) -> bool {
        !matches!(self, Outcome::Boundary)
    }
}

/// Direction for adjacent-swap moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards position 0
    Backward,
    /// Towards the end of the list
    Forward,
}

impl Direction {
    pub fn offset(self) -> isize {
        match self {
            Direction::Backward => -1,
            Direction::Forward => 1,
        }
    }
}

impl TryFrom<i32> for Direction {
    type Error = SessionError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            -1 => Ok(Direction::Backward),
            1 => Ok(Direction::Forward),
            other => Err(SessionError::Config(format!(
                "Move direction must be -1 or +1, got {other}"
            ))),
        }
    }
}

/// Page orientation, derived from the raster aspect ratio on export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Portrait: height >= width
    #[default]
    Portrait,
    /// Landscape: width > height
    Landscape,
}

impl Orientation {
    pub fn from_size(width: u32, height: u32) -> Self {
        if width > height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }

    /// Order a (width, height) pair so that it matches this orientation
    pub fn apply(self, width: f32, height: f32) -> (f32, f32) {
        let (short, long) = if width <= height {
            (width, height)
        } else {
            (height, width)
        };
        match self {
            Orientation::Portrait => (short, long),
            Orientation::Landscape => (long, short),
        }
    }
}

/// Artifact format produced by an export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Pdf,
    Png,
}

impl OutputKind {
    pub fn extension(self) -> &'static str {
        match self {
            OutputKind::Pdf => "pdf",
            OutputKind::Png => "png",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputKind::Pdf => "application/pdf",
            OutputKind::Png => "image/png",
        }
    }
}

/// Finished export, ready to hand to a save/download collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub kind: OutputKind,
    pub bytes: Vec<u8>,
}
