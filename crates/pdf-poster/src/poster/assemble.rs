//! Page loop of a generation run

use super::state::{PosterState, Run};
use crate::layout::partition;
use crate::render::{DocumentSource, OutputDocument, compose_tile};
use crate::types::*;

/// Tile every page of `source` into a new document, without saving it
pub fn tile_source<S: DocumentSource + ?Sized>(
    source: &S,
    shape: GridShape,
) -> Result<OutputDocument> {
    let mut run = Run::detached();
    run.transition(PosterState::Loading);
    assemble(source, shape, &mut run)
}

/// Composite every tile of every page, in source order and row-major order
/// within a page. Cancellation is honored before each source page.
pub(crate) fn assemble<S: DocumentSource + ?Sized>(
    source: &S,
    shape: GridShape,
    run: &mut Run,
) -> Result<OutputDocument> {
    let total_pages = source.page_count();
    let mut output = OutputDocument::new();

    for page_index in 0..total_pages {
        run.check_cancelled()?;
        run.transition(PosterState::Generating {
            page: page_index + 1,
            total_pages,
        });

        let page_size = source.page_size(page_index)?;
        let grid = partition(page_size, shape);
        for tile in &grid {
            compose_tile(&mut output, source, page_index, page_size, &tile)?;
        }

        log::debug!(
            "Page {}/{}: {} tiles of {:.2} x {:.2} pt",
            page_index + 1,
            total_pages,
            grid.len(),
            grid.tile_size().width,
            grid.tile_size().height
        );
    }

    Ok(output)
}
