//! Page and cell placement for the entry grid

use crate::geometry::{CellFrame, Margins, Point, Rect, Size};
use crate::options::GridSpec;
use crate::render::DrawCommand;
use crate::types::Entry;

/// Which side of a sheet a page prints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    /// Front side: images with their captions
    Pictos,
    /// Back side: definitions, mirrored to sit behind their picto
    Definitions,
}

impl PageMode {
    /// Placement applied to every cell of a page in this mode.
    ///
    /// Only the front side carries the duplex offset.
    pub fn transform(self, duplex_offset: Point) -> SideTransform {
        match self {
            PageMode::Pictos => SideTransform {
                mirrored: false,
                offset: duplex_offset,
            },
            PageMode::Definitions => SideTransform {
                mirrored: true,
                offset: Point::default(),
            },
        }
    }
}

const PICTOS_ONLY: &[PageMode] = &[PageMode::Pictos];
const DEFINITIONS_ONLY: &[PageMode] = &[PageMode::Definitions];
const BOTH_SIDES: &[PageMode] = &[PageMode::Pictos, PageMode::Definitions];

/// Location of an entry in the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPosition {
    pub sheet: usize,
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SideTransform {
    /// Columns are numbered right to left
    pub mirrored: bool,
    pub offset: Point,
}

/// Resolved grid geometry, in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub cols: usize,
    pub rows: usize,
    pub page_size: Size,
    /// Size of one cell, margins included
    pub cell_size: Size,
    /// Top-left corner of the first cell
    pub origin: Point,
    pub duplex_offset: Point,
}

impl GridLayout {
    /// Geometry of `grid`, which is expected to be validated
    pub fn new(grid: &GridSpec) -> Self {
        Self {
            cols: grid.cols,
            rows: grid.rows,
            page_size: grid.page_size(),
            cell_size: grid.cell_size(),
            origin: Point::new(grid.page_margins.left, grid.page_margins.top),
            duplex_offset: grid.two_sided_offset.to_pt(),
        }
    }

    pub fn cells_per_page(&self) -> usize {
        self.cols * self.rows
    }

    pub fn sheet_count(&self, entries: usize) -> usize {
        match self.cells_per_page() {
            0 => 0,
            cpp => entries.div_ceil(cpp),
        }
    }

    pub fn position_of(&self, index: usize) -> GridPosition {
        let cpp = self.cells_per_page();
        let within = index % cpp;
        GridPosition {
            sheet: index / cpp,
            row: within / self.cols,
            col: within % self.cols,
        }
    }

    /// Bounds of the grid cell at `position`, margins included
    pub fn cell_bounds(&self, position: GridPosition, transform: SideTransform) -> Rect {
        let col = if transform.mirrored {
            self.cols - position.col - 1
        } else {
            position.col
        };
        Rect::new(
            self.origin.x + col as f32 * self.cell_size.width + transform.offset.x,
            self.origin.y + position.row as f32 * self.cell_size.height + transform.offset.y,
            self.cell_size.width,
            self.cell_size.height,
        )
    }

    /// Dotted lines between columns and rows, running across the whole sheet
    pub fn cut_lines(&self, offset: Point) -> Vec<DrawCommand> {
        let vertical = (1..self.cols).map(|k| {
            let x = self.origin.x + k as f32 * self.cell_size.width + offset.x;
            DrawCommand::CutLine {
                from: Point::new(x, 0.0),
                to: Point::new(x, self.page_size.height),
            }
        });
        let horizontal = (1..self.rows).map(|k| {
            let y = self.origin.y + k as f32 * self.cell_size.height + offset.y;
            DrawCommand::CutLine {
                from: Point::new(0.0, y),
                to: Point::new(self.page_size.width, y),
            }
        });
        vertical.chain(horizontal).collect()
    }
}

/// One page of the document with the cells it holds
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    /// Position of the page in the document
    pub index: usize,
    /// Physical sheet the page belongs to
    pub sheet: usize,
    pub mode: PageMode,
    pub transform: SideTransform,
    pub cells: Vec<CellFrame<'a>>,
}

/// Lazy iterator over the pages of a document
#[derive(Debug, Clone)]
pub struct Pages<'a> {
    entries: &'a [Entry],
    layout: GridLayout,
    margins: Margins,
    modes: &'static [PageMode],
    next: usize,
    total: usize,
}

impl<'a> Pages<'a> {
    fn new(entries: &'a [Entry], grid: &GridSpec, modes: &'static [PageMode]) -> Self {
        let layout = GridLayout::new(grid);
        let total = layout.sheet_count(entries.len()) * modes.len();
        Self {
            entries,
            layout,
            margins: grid.margins,
            modes,
            next: 0,
            total,
        }
    }

    fn page(&self, index: usize) -> Page<'a> {
        let sheet = index / self.modes.len();
        let mode = self.modes[index % self.modes.len()];
        let transform = mode.transform(self.layout.duplex_offset);

        let cpp = self.layout.cells_per_page();
        let start = sheet * cpp;
        let end = (start + cpp).min(self.entries.len());
        let entries = self.entries;
        let cells = (start..end)
            .map(|i| {
                let bounds = self
                    .layout
                    .cell_bounds(self.layout.position_of(i), transform);
                CellFrame::new(bounds, &self.margins, &entries[i], i)
            })
            .collect();

        Page {
            index,
            sheet,
            mode,
            transform,
            cells,
        }
    }
}

impl<'a> Iterator for Pages<'a> {
    type Item = Page<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total {
            return None;
        }
        let page = self.page(self.next);
        self.next += 1;
        Some(page)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Pages<'_> {}

/// Pages of a single side, one per sheet
pub fn paginate<'a>(entries: &'a [Entry], grid: &GridSpec, mode: PageMode) -> Pages<'a> {
    let modes = match mode {
        PageMode::Pictos => PICTOS_ONLY,
        PageMode::Definitions => DEFINITIONS_ONLY,
    };
    Pages::new(entries, grid, modes)
}

/// Every page of the document; each picto page is followed by its
/// definitions page when `have_definitions` is set
pub fn document_pages<'a>(
    entries: &'a [Entry],
    grid: &GridSpec,
    have_definitions: bool,
) -> Pages<'a> {
    let modes = if have_definitions {
        BOTH_SIDES
    } else {
        PICTOS_ONLY
    };
    Pages::new(entries, grid, modes)
}
