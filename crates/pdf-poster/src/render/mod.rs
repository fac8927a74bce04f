//! PDF rendering modules for poster tiling
//!
//! This module handles all PDF-specific operations:
//! - Opening source documents and reading page geometry
//! - Creating XObjects from source pages
//! - Building tile pages and the output page tree
//! - Deep copying PDF objects

mod output;
mod source;
mod tile;
mod xobject;

pub use output::{Canvas, OutputDocument};
pub use source::{DocumentSource, PdfSource};
pub use tile::{compose_tile, tile_translation};
pub use xobject::{
    MediaBox, copy_object_deep, create_page_xobjects, get_media_box, get_page_dimensions,
};
