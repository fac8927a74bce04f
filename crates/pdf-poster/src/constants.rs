//! Shared constants for poster tiling

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4; // ≈ 2.83465

/// Convert points to millimeters
#[inline]
pub fn pt_to_mm(pt: f32) -> f32 {
    pt / POINTS_PER_MM
}

// =============================================================================
// Default Page Dimensions
// =============================================================================

/// Default page width in points (US Letter: 8.5" × 11")
pub const DEFAULT_PAGE_WIDTH_PT: f32 = 612.0;

/// Default page height in points (US Letter)
pub const DEFAULT_PAGE_HEIGHT_PT: f32 = 792.0;

/// Default page dimensions as tuple (width, height)
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (DEFAULT_PAGE_WIDTH_PT, DEFAULT_PAGE_HEIGHT_PT);

// =============================================================================
// Output Naming
// =============================================================================

/// Prefix of timestamp-named output files
pub const DEFAULT_FILE_PREFIX: &str = "gradil";

/// Folder under the system temp dir used when no output folder is given
pub const DEFAULT_OUTPUT_DIR_NAME: &str = "Gradil";

/// Extension of every generated file
pub const OUTPUT_EXTENSION: &str = "pdf";

/// Numbered variants tried before giving up on a free file name
pub const MAX_NAME_ATTEMPTS: usize = 1000;

/// PDF version written to output documents
pub const OUTPUT_PDF_VERSION: &str = "1.7";
