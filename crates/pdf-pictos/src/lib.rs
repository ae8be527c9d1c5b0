//! Picto sheets: images with their word on the front of a printable grid
//! and, optionally, definitions on the back.
//!
//! The layout engine works on any [`DrawingBackend`]; [`PdfBackend`] writes
//! the result with printpdf.

pub mod backend;
pub mod constants;
mod csv;
pub mod geometry;
pub mod layout;
pub mod options;
mod pdf;
pub mod render;
pub mod types;

pub use crate::csv::load_entries_from_csv;
pub use backend::{DrawingBackend, ImageMetrics, TextMetrics};
pub use geometry::{CellFrame, Margins, Point, Rect, Size};
pub use options::{GridSpec, Orientation, PaperSize, PictoConfig, TextDefaults, TwoSidedOffset};
pub use pdf::{PdfBackend, generate_pdf, generate_pdf_bytes};
pub use render::{DrawCommand, RenderedPage, render, render_commands};
pub use types::{
    Color, DefinitionText, Entry, FontFace, PictoError, Result, TextAlign, TextColors,
};

/// Load and validate a JSON configuration file
pub async fn load_config(path: impl AsRef<std::path::Path>) -> Result<PictoConfig> {
    PictoConfig::load(path).await
}
