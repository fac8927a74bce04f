//! Layout calculation modules for poster tiling
//!
//! This module handles the geometry of cutting a page into tiles:
//! - Tile rectangles in source-page space
//! - Row-major grid iteration

mod grid;
mod types;

pub use grid::*;
pub use types::*;
