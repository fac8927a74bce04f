//! Tile compositing
//!
//! Each tile becomes one output page of the tile's size. The whole source
//! page is painted shifted so the tile's region lands on the new page, and a
//! clip path equal to the page bounds hides everything else.

use crate::layout::Tile;
use crate::types::{PageSize, PosterError, Result};
use lopdf::ObjectId;

use super::output::OutputDocument;
use super::source::DocumentSource;

/// Render one tile of a source page as a new output page.
///
/// # Arguments
/// * `output` - The poster document receiving the page
/// * `source` - The document the tile is cut from
/// * `page_index` - Index of the source page
/// * `page_size` - Size of that source page
/// * `tile` - The tile to cut
pub fn compose_tile<S: DocumentSource + ?Sized>(
    output: &mut OutputDocument,
    source: &S,
    page_index: usize,
    page_size: PageSize,
    tile: &Tile,
) -> Result<ObjectId> {
    let (translate_x, translate_y) = tile_translation(page_size, tile);

    let mut canvas = output.begin_page(PageSize::new(tile.rect.width, tile.rect.height));
    canvas.clip_to_bounds();
    source
        .render_page_into(&mut canvas, page_index, translate_x, translate_y)
        .map_err(|e| match e {
            PosterError::PageRender { .. } => e,
            other => PosterError::PageRender {
                page: page_index,
                row: tile.position.row,
                col: tile.position.col,
                reason: other.to_string(),
            },
        })?;

    Ok(canvas.finish())
}

/// Offset that moves a tile's region of the source page onto the origin of
/// its output page, in PDF user space (bottom-left origin).
pub fn tile_translation(page_size: PageSize, tile: &Tile) -> (f32, f32) {
    (-tile.rect.x0, -tile.rect.pdf_bottom(page_size.height))
}
