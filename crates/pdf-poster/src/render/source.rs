//! Document sources
//!
//! A [`DocumentSource`] exposes page geometry and can paint a whole page onto
//! a [`Canvas`]. Painting the full page at an offset is all tiling needs: the
//! tile page's bounds do the cropping.

use crate::types::*;
use lopdf::{Document, ObjectId};
use std::path::{Path, PathBuf};

use super::output::Canvas;
use super::xobject::{create_page_xobjects, get_page_dimensions};

/// Read-only access to a paginated source document
pub trait DocumentSource {
    /// Number of pages in the document
    fn page_count(&self) -> usize;

    /// Physical size of a page in points
    fn page_size(&self, page_index: usize) -> Result<PageSize>;

    /// Paint the entire page onto `canvas`, translated by
    /// `(translate_x, translate_y)` in PDF user space and never scaled.
    fn render_page_into(
        &self,
        canvas: &mut Canvas<'_>,
        page_index: usize,
        translate_x: f32,
        translate_y: f32,
    ) -> Result<()>;
}

/// A PDF file opened with lopdf.
///
/// The parsed document lives exactly as long as this value.
#[derive(Debug)]
pub struct PdfSource {
    path: PathBuf,
    document: Document,
    page_ids: Vec<ObjectId>,
}

impl PdfSource {
    /// Open and parse a PDF file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        ensure_exists(path)?;
        let bytes = std::fs::read(path).map_err(|e| load_error(path, e))?;
        Self::parse(path, &bytes)
    }

    /// Open and parse a PDF file without blocking the async runtime
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_owned();
        ensure_exists(&path)?;
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| load_error(&path, e))?;
        tokio::task::spawn_blocking(move || Self::parse(&path, &bytes)).await?
    }

    /// Wrap an already parsed document
    pub fn from_document(path: impl Into<PathBuf>, document: Document) -> Result<Self> {
        let path = path.into();
        let page_ids: Vec<ObjectId> = document.get_pages().values().copied().collect();

        if page_ids.is_empty() {
            return Err(PosterError::DocumentLoad {
                path,
                reason: "document has no pages".to_string(),
            });
        }

        log::debug!("Opened {} ({} pages)", path.display(), page_ids.len());
        Ok(Self {
            path,
            document,
            page_ids,
        })
    }

    fn parse(path: &Path, bytes: &[u8]) -> Result<Self> {
        let document = Document::load_mem(bytes).map_err(|e| load_error(path, e))?;
        Self::from_document(path, document)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn page_id(&self, page_index: usize) -> Result<ObjectId> {
        self.page_ids.get(page_index).copied().ok_or_else(|| {
            PosterError::InvalidArgument(format!(
                "Page index {} out of range (document has {} pages)",
                page_index,
                self.page_ids.len()
            ))
        })
    }
}

impl DocumentSource for PdfSource {
    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page_size(&self, page_index: usize) -> Result<PageSize> {
        let page_id = self.page_id(page_index)?;
        Ok(get_page_dimensions(&self.document, page_id)?.into())
    }

    fn render_page_into(
        &self,
        canvas: &mut Canvas<'_>,
        page_index: usize,
        translate_x: f32,
        translate_y: f32,
    ) -> Result<()> {
        let page_id = self.page_id(page_index)?;
        let form_ids = canvas.import_forms(page_id, |output, cache| {
            create_page_xobjects(output, &self.document, page_id, cache)
        })?;
        for form_id in form_ids {
            canvas.draw_form(form_id, translate_x, translate_y);
        }
        Ok(())
    }
}

impl Drop for PdfSource {
    fn drop(&mut self) {
        log::debug!("Released source {}", self.path.display());
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(PosterError::InvalidArgument(
            "No source file specified".to_string(),
        ));
    }
    if !path.is_file() {
        return Err(PosterError::SourceNotFound {
            path: path.to_owned(),
        });
    }
    Ok(())
}

fn load_error(path: &Path, err: impl std::fmt::Display) -> PosterError {
    PosterError::DocumentLoad {
        path: path.to_owned(),
        reason: err.to_string(),
    }
}
