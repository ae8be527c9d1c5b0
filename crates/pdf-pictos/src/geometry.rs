//! Geometry value types
//!
//! Coordinates use the page's top-left corner as origin with y growing
//! downward. Conversion to PDF's bottom-left origin happens in the backend.

use crate::constants::mm_to_pt;
use crate::types::Entry;
use serde::{Deserialize, Serialize};

/// Distances on the four sides of a box, in points
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Margins {
    pub const ZERO: Margins = Margins::uniform(0.0);

    /// Create uniform margins on all sides
    pub const fn uniform(value: f32) -> Self {
        Self {
            top: value,
            bottom: value,
            left: value,
            right: value,
        }
    }

    pub fn top_bottom(&self) -> f32 {
        self.top + self.bottom
    }

    pub fn left_right(&self) -> f32 {
        self.left + self.right
    }
}

/// Printer-safe area around the whole sheet
pub const DEFAULT_PAGE_MARGINS: Margins = Margins::uniform(mm_to_pt(5.0));

/// Space between a grid cell and its drawn border
pub const DEFAULT_MARGINS: Margins = Margins::uniform(5.67 / 2.0);

/// Space between a cell border and its content
pub const DEFAULT_PADDINGS: Margins = Margins::uniform(3.0);

/// Margins as written in a configuration file: any side may be left out
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginsConfig {
    pub top: Option<f32>,
    pub bottom: Option<f32>,
    pub left: Option<f32>,
    pub right: Option<f32>,
}

impl MarginsConfig {
    /// Fill unset sides from `defaults`
    pub fn with_defaults(&self, defaults: Margins) -> Margins {
        Margins {
            top: self.top.unwrap_or(defaults.top),
            bottom: self.bottom.unwrap_or(defaults.bottom),
            left: self.left.unwrap_or(defaults.left),
            right: self.right.unwrap_or(defaults.right),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width over height
    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height
    }

    /// Wider than (or as wide as) tall
    pub fn is_landscape(&self) -> bool {
        self.width >= self.height
    }
}

/// A rectangular area, `(x, y)` being its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x coordinate
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge y coordinate
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn center(&self) -> Point {
        Point::new(self.center_x(), self.center_y())
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Remove `margins` from each side
    pub fn inset(&self, margins: &Margins) -> Rect {
        Rect::new(
            self.x + margins.left,
            self.y + margins.top,
            self.width - margins.left_right(),
            self.height - margins.top_bottom(),
        )
    }
}

/// A grid cell with its margins removed, paired with the entry drawn in it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellFrame<'a> {
    pub rect: Rect,
    pub entry: &'a Entry,
    /// Position of `entry` in the input list
    pub index: usize,
}

impl<'a> CellFrame<'a> {
    pub fn new(cell: Rect, margins: &Margins, entry: &'a Entry, index: usize) -> Self {
        Self {
            rect: cell.inset(margins),
            entry,
            index,
        }
    }

    /// Area left for content once paddings are removed
    pub fn content_box(&self, paddings: &Margins) -> Rect {
        self.rect.inset(paddings)
    }
}
