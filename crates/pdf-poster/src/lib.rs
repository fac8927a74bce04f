pub mod constants;
pub mod layout;
pub mod poster;
pub mod render;
mod history;
mod options;
mod stats;
mod types;

pub use history::{GeneratedFiles, list_generated_files};
pub use layout::{GridPosition, Tile, TileGrid, TileRect, partition};
pub use options::*;
pub use poster::{
    CancelToken, PosterState, RunControl, generate_poster, generate_poster_blocking,
    generate_poster_with, save_pdf, tile_source,
};
pub use render::{DocumentSource, OutputDocument, PdfSource};
pub use stats::calculate_statistics;
pub use types::*;
