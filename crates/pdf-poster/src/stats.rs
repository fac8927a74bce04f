use crate::layout::partition;
use crate::options::TiledPosterOptions;
use crate::render::DocumentSource;
use crate::types::*;

/// Calculate what a poster run would produce, without generating anything
pub fn calculate_statistics<S: DocumentSource + ?Sized>(
    source: &S,
    options: &TiledPosterOptions,
) -> Result<PosterStatistics> {
    let shape = options.grid_shape()?;
    let source_pages = source.page_count();

    let mut tile_sizes = Vec::with_capacity(source_pages);
    for page_index in 0..source_pages {
        let page_size = source.page_size(page_index)?;
        tile_sizes.push(partition(page_size, shape).tile_size());
    }

    Ok(PosterStatistics {
        source_pages,
        rows: shape.rows(),
        cols: shape.cols(),
        tiles_per_page: shape.tiles_per_page(),
        output_pages: source_pages * shape.tiles_per_page(),
        tile_sizes,
    })
}
