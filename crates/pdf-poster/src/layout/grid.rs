//! Grid partitioning
//!
//! Cuts a page into `rows × cols` equally sized tiles. Sizes come from plain
//! floating-point division: no rounding, no snapping and no remainder tile.

use std::iter::FusedIterator;

use crate::types::{GridShape, PageSize};

use super::{GridPosition, Tile, TileRect};

// =============================================================================
// Grid Creation
// =============================================================================

/// Partition a page into a grid of tiles.
///
/// Nothing is computed up front; the returned grid is a cheap, copyable
/// description that can be iterated any number of times.
pub fn partition(page: PageSize, shape: GridShape) -> TileGrid {
    TileGrid {
        page,
        shape,
        tile_width: page.width / shape.cols() as f32,
        tile_height: page.height / shape.rows() as f32,
    }
}

/// The tiles of one page, yielded in row-major order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileGrid {
    page: PageSize,
    shape: GridShape,
    tile_width: f32,
    tile_height: f32,
}

impl TileGrid {
    pub fn page_size(&self) -> PageSize {
        self.page
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Size shared by every tile of this grid
    pub fn tile_size(&self) -> PageSize {
        PageSize::new(self.tile_width, self.tile_height)
    }

    /// Number of tiles in the grid
    pub fn len(&self) -> usize {
        self.shape.tiles_per_page()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The tile at a grid position, if the position is inside the grid
    pub fn tile_at(&self, position: GridPosition) -> Option<Tile> {
        if position.row >= self.shape.rows() || position.col >= self.shape.cols() {
            return None;
        }

        Some(Tile {
            position,
            rect: TileRect::new(
                position.col as f32 * self.tile_width,
                position.row as f32 * self.tile_height,
                self.tile_width,
                self.tile_height,
            ),
        })
    }

    pub fn iter(&self) -> Tiles {
        Tiles {
            grid: *self,
            next: 0,
            end: self.len(),
        }
    }
}

impl IntoIterator for TileGrid {
    type Item = Tile;
    type IntoIter = Tiles;

    fn into_iter(self) -> Tiles {
        self.iter()
    }
}

impl IntoIterator for &TileGrid {
    type Item = Tile;
    type IntoIter = Tiles;

    fn into_iter(self) -> Tiles {
        self.iter()
    }
}

// =============================================================================
// Iteration
// =============================================================================

/// Row-major iterator over the tiles of a [`TileGrid`]
#[derive(Debug, Clone)]
pub struct Tiles {
    grid: TileGrid,
    next: usize,
    end: usize,
}

impl Iterator for Tiles {
    type Item = Tile;

    fn next(&mut self) -> Option<Tile> {
        if self.next >= self.end {
            return None;
        }
        let position = GridPosition::from_index(self.next, self.grid.shape.cols());
        self.next += 1;
        self.grid.tile_at(position)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Tiles {}

impl FusedIterator for Tiles {}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(width: f32, height: f32, rows: usize, cols: usize) -> TileGrid {
        partition(
            PageSize::new(width, height),
            GridShape::new(rows, cols).unwrap(),
        )
    }

    #[test]
    fn test_poster_scenario() {
        let grid = grid(600.0, 400.0, 2, 3);

        assert_eq!(grid.len(), 6);
        assert_eq!(grid.tile_size(), PageSize::new(200.0, 200.0));

        let tile = grid.tile_at(GridPosition::new(1, 2)).unwrap();
        assert_eq!(tile.rect, TileRect::new(400.0, 200.0, 200.0, 200.0));
        assert_eq!(tile.rect.right(), 600.0);
        assert_eq!(tile.rect.bottom(), 400.0);
    }

    #[test]
    fn test_row_major_order() {
        let grid = grid(600.0, 400.0, 2, 3);
        let positions: Vec<(usize, usize)> = grid
            .iter()
            .map(|tile| (tile.position.row, tile.position.col))
            .collect();

        assert_eq!(
            positions,
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]
        );

        for (k, tile) in grid.iter().enumerate() {
            assert_eq!(tile.position.row, k / 3);
            assert_eq!(tile.position.col, k % 3);
            assert_eq!(tile.position.index(3), k);
        }
    }

    #[test]
    fn test_fractional_tiles() {
        let grid = grid(100.0, 50.0, 3, 7);
        let size = grid.tile_size();

        assert_eq!(size.width, 100.0 / 7.0);
        assert_eq!(size.height, 50.0 / 3.0);
        for tile in &grid {
            assert_eq!(tile.rect.width, 100.0 / 7.0);
            assert_eq!(tile.rect.height, 50.0 / 3.0);
        }

        let last = grid.tile_at(GridPosition::new(2, 6)).unwrap();
        assert!((last.rect.right() - 100.0).abs() < 1e-3);
        assert!((last.rect.bottom() - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_single_tile_is_whole_page() {
        let grid = grid(612.0, 792.0, 1, 1);
        let tiles: Vec<Tile> = grid.iter().collect();

        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].rect, TileRect::new(0.0, 0.0, 612.0, 792.0));
    }

    #[test]
    fn test_tiles_cover_page_without_overlap() {
        let grid = grid(600.0, 400.0, 4, 5);

        let total_area: f32 = grid.iter().map(|tile| tile.rect.area()).sum();
        assert!((total_area - 600.0 * 400.0).abs() < 1.0);

        // Every sample point lands in exactly one tile
        for i in 0..60 {
            for j in 0..40 {
                let x = i as f32 * 10.0 + 5.0;
                let y = j as f32 * 10.0 + 5.0;
                let hits = grid.iter().filter(|t| t.rect.contains(x, y)).count();
                assert_eq!(hits, 1, "point ({}, {}) hit {} tiles", x, y, hits);
            }
        }
    }

    #[test]
    fn test_iteration_is_restartable() {
        let grid = grid(300.0, 300.0, 3, 3);
        let first: Vec<Tile> = grid.iter().collect();
        let second: Vec<Tile> = grid.into_iter().collect();

        assert_eq!(first, second);
        assert_eq!(grid.iter().len(), 9);
    }

    #[test]
    fn test_tile_at_outside_grid() {
        let grid = grid(300.0, 300.0, 2, 2);
        assert!(grid.tile_at(GridPosition::new(2, 0)).is_none());
        assert!(grid.tile_at(GridPosition::new(0, 2)).is_none());
    }

    #[test]
    fn test_pdf_bottom_flips_rows() {
        let grid = grid(600.0, 400.0, 2, 3);

        let top = grid.tile_at(GridPosition::new(0, 0)).unwrap();
        let bottom = grid.tile_at(GridPosition::new(1, 0)).unwrap();

        // Row 0 is the top half of the page, which starts at y = 200 in PDF space
        assert_eq!(top.rect.pdf_bottom(400.0), 200.0);
        assert_eq!(bottom.rect.pdf_bottom(400.0), 0.0);
    }
}
