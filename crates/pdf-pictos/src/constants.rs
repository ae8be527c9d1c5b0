//! Shared constants for picto layout
//!
//! Every length is in PDF points unless the name says otherwise.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4; // ≈ 2.83465

/// Convert millimeters to points
#[inline]
pub const fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

/// Convert points to millimeters
#[inline]
pub const fn pt_to_mm(pt: f32) -> f32 {
    pt / POINTS_PER_MM
}

// =============================================================================
// Caption Font Search
// =============================================================================

/// First size probed when searching the caption font size
pub const MAX_FONT_SIZE: f32 = 110.0;

/// Decrement between two probed sizes
pub const FONT_SIZE_STEP: f32 = 1.0;

/// Factor applied to the largest fitting size.
///
/// The line height metric ignores ascenders and descenders, so the raw
/// result overflows the caption band once rendered.
pub const FONT_SIZE_COMPENSATION: f32 = 0.5;

// =============================================================================
// Text
// =============================================================================

/// Fraction of a cell's height reserved for the caption band
pub const DEFAULT_TEXT_RATIO: f32 = 1.0 / 5.0;

/// Extra space above and below each definition line, relative to font size
pub const DEFAULT_LINE_SPACING_RATIO: f32 = 0.3;

/// Height of a text line relative to its font size
pub const TEXT_HEIGHT_RATIO: f32 = 0.7;

/// Approximate character width ratio for Helvetica
pub const HELVETICA_CHAR_WIDTH_RATIO: f32 = 0.5;

// =============================================================================
// Duplex Printing
// =============================================================================

/// Horizontal offset applied to picto pages (mm)
pub const DEFAULT_TWO_SIDED_OFFSET_X_MM: f32 = -3.0;

/// Vertical offset applied to picto pages (mm)
pub const DEFAULT_TWO_SIDED_OFFSET_Y_MM: f32 = 0.0;

// =============================================================================
// Lines
// =============================================================================

/// Line width for cell borders
pub const BORDER_LINE_WIDTH: f32 = 1.0;

/// Line width for cut lines
pub const CUT_LINE_WIDTH: f32 = 1.0;

/// Dash length of dotted cut lines
pub const CUT_LINE_DASH: i64 = 1;

/// Gap length of dotted cut lines
pub const CUT_LINE_GAP: i64 = 2;
