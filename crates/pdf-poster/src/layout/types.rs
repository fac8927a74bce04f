//! Layout data types for poster tiling
//!
//! Tile rectangles use a top-left origin (row 0 is the top row), which is
//! how a printed poster is read and reassembled. Conversion to PDF user
//! space happens in [`TileRect::pdf_bottom`].

/// Position within the grid (row, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPosition {
    /// Row index (0 = top row)
    pub row: usize,
    /// Column index (0 = leftmost column)
    pub col: usize,
}

impl GridPosition {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Position of the `index`-th tile of a page in row-major order
    pub fn from_index(index: usize, cols: usize) -> Self {
        Self {
            row: index / cols,
            col: index % cols,
        }
    }

    /// Row-major index of this position
    pub fn index(&self, cols: usize) -> usize {
        self.row * cols + self.col
    }
}

/// A tile's region of the source page, in points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TileRect {
    /// Left edge
    pub x0: f32,
    /// Top edge, measured down from the top of the page
    pub y0: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl TileRect {
    pub fn new(x0: f32, y0: f32, width: f32, height: f32) -> Self {
        Self {
            x0,
            y0,
            width,
            height,
        }
    }

    /// Right edge x coordinate
    pub fn right(&self) -> f32 {
        self.x0 + self.width
    }

    /// Bottom edge, measured down from the top of the page
    pub fn bottom(&self) -> f32 {
        self.y0 + self.height
    }

    /// Bottom edge in PDF user space (origin at the bottom-left of the page)
    pub fn pdf_bottom(&self, page_height: f32) -> f32 {
        page_height - self.y0 - self.height
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Whether a point lies in the half-open rect `[x0, right) × [y0, bottom)`
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && x < self.right() && y >= self.y0 && y < self.bottom()
    }
}

/// One tile of a page: where it sits in the grid and what it covers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    pub position: GridPosition,
    pub rect: TileRect,
}
