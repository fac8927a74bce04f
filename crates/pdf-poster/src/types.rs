use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PosterError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Source PDF not found: {}", path.display())]
    SourceNotFound { path: PathBuf },
    #[error("Failed to load '{}': {reason}", path.display())]
    DocumentLoad { path: PathBuf, reason: String },
    #[error("Failed to render page {page} (tile row {row}, col {col}): {reason}")]
    PageRender {
        page: usize,
        row: usize,
        col: usize,
        reason: String,
    },
    #[error("Malformed page content: {0}")]
    MalformedContent(String),
    #[error("Output error at '{}': {source}", path.display())]
    OutputIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Output file already exists: {}", path.display())]
    FilenameCollision { path: PathBuf },
    #[error("Poster generation was cancelled")]
    Cancelled,
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, PosterError>;

/// Physical size of a page in points
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl From<(f32, f32)> for PageSize {
    fn from((width, height): (f32, f32)) -> Self {
        Self { width, height }
    }
}

/// Number of rows and columns a page is cut into.
///
/// Both counts are at least 1; the only way to build one is [`GridShape::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridShape {
    rows: usize,
    cols: usize,
}

impl GridShape {
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(PosterError::InvalidArgument(format!(
                "rows and cols must be at least 1 (got {} x {})",
                rows, cols
            )));
        }
        Ok(Self { rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Output pages produced per source page
    pub fn tiles_per_page(&self) -> usize {
        self.rows * self.cols
    }
}

/// A poster file written by a successful run
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneratedFile {
    pub path: PathBuf,
}

impl GeneratedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File name for display, falling back to the full path
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Poster tiling statistics
#[derive(Debug, Clone, PartialEq)]
pub struct PosterStatistics {
    pub source_pages: usize,
    pub rows: usize,
    pub cols: usize,
    pub tiles_per_page: usize,
    pub output_pages: usize,
    /// Tile size for each source page, in source order
    pub tile_sizes: Vec<PageSize>,
}
