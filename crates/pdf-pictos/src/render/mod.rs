//! Turns paginated entries into draw commands and feeds them to a backend

mod page;

pub use page::render_page;

use crate::backend::{DrawingBackend, ImageMetrics, TextMetrics};
use crate::geometry::{Point, Rect, Size};
use crate::layout::{GridLayout, PageMode, caption_font_size, document_pages};
use crate::options::{GridSpec, TextDefaults, has_definitions};
use crate::types::{Color, Entry, FontFace, Result};
use std::path::PathBuf;

/// A single drawing instruction, in top-left origin page coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Rectangle outline
    Rect { rect: Rect },
    /// Dotted line marking where to cut the sheet
    CutLine { from: Point, to: Point },
    /// Image scaled to fill `rect`
    Image { path: PathBuf, rect: Rect },
    /// One character with `position` on its baseline
    Char {
        ch: char,
        position: Point,
        font: FontFace,
        size: f32,
        color: Color,
    },
}

/// Document-wide values shared by every page
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    pub grid: &'a GridSpec,
    pub text: &'a TextDefaults,
    pub layout: GridLayout,
    pub cut_lines: bool,
    pub caption_font_size: f32,
}

impl<'a> RenderContext<'a> {
    /// Validate the settings and fix the caption size for the whole document
    pub fn new<M: TextMetrics + ?Sized>(
        entries: &[Entry],
        grid: &'a GridSpec,
        text: &'a TextDefaults,
        cut_lines: bool,
        metrics: &M,
    ) -> Result<Self> {
        grid.validate()?;
        text.validate()?;

        let layout = GridLayout::new(grid);
        let caption_font_size = caption_font_size(metrics, text, entries, layout.cell_size)?;

        Ok(Self {
            grid,
            text,
            layout,
            cut_lines,
            caption_font_size,
        })
    }
}

/// Commands of one page
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub index: usize,
    pub sheet: usize,
    pub mode: PageMode,
    pub size: Size,
    pub commands: Vec<DrawCommand>,
}

/// Lay out every page without drawing anything
pub fn render_commands<M: TextMetrics + ImageMetrics + ?Sized>(
    entries: &[Entry],
    grid: &GridSpec,
    text: &TextDefaults,
    cut_lines: bool,
    metrics: &M,
) -> Result<Vec<RenderedPage>> {
    let ctx = RenderContext::new(entries, grid, text, cut_lines, metrics)?;
    let pages = document_pages(entries, grid, has_definitions(entries));
    log::debug!("Laying out {} pages", pages.len());

    Ok(pages
        .map(|page| render_page(&ctx, &page, metrics))
        .collect())
}

/// Render the document into `backend` and return its serialized bytes.
///
/// Pages are laid out and drawn one at a time. A failure to draw an image
/// is logged and leaves that cell without its image.
pub fn render<B: DrawingBackend>(
    entries: &[Entry],
    grid: &GridSpec,
    text: &TextDefaults,
    cut_lines: bool,
    mut backend: B,
) -> Result<Vec<u8>> {
    let ctx = RenderContext::new(entries, grid, text, cut_lines, &backend)?;
    let have_definitions = has_definitions(entries);
    let pages = document_pages(entries, grid, have_definitions);
    log::debug!(
        "Rendering {} entries on {} pages (definitions: {have_definitions})",
        entries.len(),
        pages.len()
    );

    for page in pages {
        let rendered = render_page(&ctx, &page, &backend);
        backend.add_page(rendered.size)?;
        for command in &rendered.commands {
            match backend.draw(command) {
                Err(e) if e.is_image_error() => log::error!("Problem drawing image: {e}"),
                result => result?,
            }
        }
    }

    backend.finalize()
}
