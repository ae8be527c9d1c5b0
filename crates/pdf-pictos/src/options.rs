use crate::constants::{
    DEFAULT_TEXT_RATIO, DEFAULT_TWO_SIDED_OFFSET_X_MM, DEFAULT_TWO_SIDED_OFFSET_Y_MM,
    FONT_SIZE_COMPENSATION, mm_to_pt,
};
use crate::geometry::{
    DEFAULT_MARGINS, DEFAULT_PADDINGS, DEFAULT_PAGE_MARGINS, Margins, MarginsConfig, Point, Size,
};
use crate::types::{Color, DefinitionText, Entry, FontFace, PictoError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Paper orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Standard paper sizes
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Custom { width_mm: f32, height_mm: f32 },
}

impl PaperSize {
    /// Base dimensions, portrait
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PaperSize::A3 => (297.0, 420.0),
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::A5 => (148.0, 210.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Legal => (215.9, 355.6),
            PaperSize::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }

    /// Page size in points with orientation applied
    pub fn size_with_orientation(self, orientation: Orientation) -> Size {
        let (w, h) = self.dimensions_mm();
        let (w, h) = (mm_to_pt(w), mm_to_pt(h));
        match orientation {
            Orientation::Portrait => Size::new(w, h),
            Orientation::Landscape => Size::new(h, w),
        }
    }
}

/// Offset compensating printer misfeed on the picto side of duplex jobs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwoSidedOffset {
    pub x_mm: f32,
    pub y_mm: f32,
}

impl Default for TwoSidedOffset {
    fn default() -> Self {
        Self {
            x_mm: DEFAULT_TWO_SIDED_OFFSET_X_MM,
            y_mm: DEFAULT_TWO_SIDED_OFFSET_Y_MM,
        }
    }
}

impl TwoSidedOffset {
    pub fn to_pt(self) -> Point {
        Point::new(mm_to_pt(self.x_mm), mm_to_pt(self.y_mm))
    }
}

/// Page grid description
#[derive(Debug, Clone, PartialEq)]
pub struct GridSpec {
    pub cols: usize,
    pub rows: usize,
    pub orientation: Orientation,
    pub paper: PaperSize,
    /// Printable area of the sheet
    pub page_margins: Margins,
    /// Removed from each grid cell before drawing its border
    pub margins: Margins,
    /// Removed from the bordered cell before placing its content
    pub paddings: Margins,
    pub two_sided_offset: TwoSidedOffset,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            cols: 2,
            rows: 3,
            orientation: Orientation::Portrait,
            paper: PaperSize::A4,
            page_margins: DEFAULT_PAGE_MARGINS,
            margins: DEFAULT_MARGINS,
            paddings: DEFAULT_PADDINGS,
            two_sided_offset: TwoSidedOffset::default(),
        }
    }
}

impl GridSpec {
    pub fn validate(&self) -> Result<()> {
        if self.cols == 0 || self.rows == 0 {
            return Err(PictoError::Config(
                "cols and lines have to be > 0".to_string(),
            ));
        }

        let cell = self.cell_size();
        if cell.width <= 0.0 || cell.height <= 0.0 {
            return Err(PictoError::Config(format!(
                "page margins leave no room for cells ({:.2}x{:.2}pt)",
                cell.width, cell.height
            )));
        }

        Ok(())
    }

    pub fn cells_per_page(&self) -> usize {
        self.cols * self.rows
    }

    pub fn page_size(&self) -> Size {
        self.paper.size_with_orientation(self.orientation)
    }

    /// Size of one grid cell, margins included
    pub fn cell_size(&self) -> Size {
        let page = self.page_size();
        Size::new(
            (page.width - self.page_margins.left_right()) / self.cols as f32,
            (page.height - self.page_margins.top_bottom()) / self.rows as f32,
        )
    }

    /// Number of picto pages needed for `entries` entries
    pub fn picto_page_count(&self, entries: usize) -> usize {
        entries.div_ceil(self.cells_per_page())
    }
}

/// Document-wide text settings
#[derive(Debug, Clone, PartialEq)]
pub struct TextDefaults {
    pub font: FontFace,
    /// Fraction of the cell height used by the caption band
    pub size_ratio: f32,
    /// Caption size forced by configuration, skipping the size search
    pub fixed_size: Option<f32>,
    pub color: Color,
    /// Draw the caption above the image instead of below
    pub top_aligned: bool,
    /// Factor applied to the searched caption size
    pub size_compensation: f32,
    pub definitions: DefinitionText,
}

impl Default for TextDefaults {
    fn default() -> Self {
        Self {
            font: FontFace::Helvetica,
            size_ratio: DEFAULT_TEXT_RATIO,
            fixed_size: None,
            color: Color::BLACK,
            top_aligned: false,
            size_compensation: FONT_SIZE_COMPENSATION,
            definitions: DefinitionText::default(),
        }
    }
}

impl TextDefaults {
    pub fn validate(&self) -> Result<()> {
        if !(self.size_ratio > 0.0 && self.size_ratio < 1.0) {
            return Err(PictoError::Config(format!(
                "text ratio must be between 0 and 1, got {}",
                self.size_ratio
            )));
        }
        if !(self.size_compensation > 0.0) {
            return Err(PictoError::Config(format!(
                "text size compensation must be positive, got {}",
                self.size_compensation
            )));
        }
        if let Some(size) = self.fixed_size.filter(|size| *size <= 0.0) {
            return Err(PictoError::Config(format!(
                "text size must be positive, got {size}"
            )));
        }
        Ok(())
    }
}

/// Fully resolved run configuration
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PictoConfig {
    pub grid: GridSpec,
    pub text: TextDefaults,
    pub entries: Vec<Entry>,
}

impl PictoConfig {
    /// Load and validate a JSON configuration file.
    ///
    /// Relative image and font paths are resolved against the file's directory.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        Self::from_json(&bytes, path.parent())
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(bytes: &[u8], base_dir: Option<&Path>) -> Result<Self> {
        let file: ConfigFile = serde_json::from_slice(bytes)?;
        file.resolve(base_dir)
    }

    /// Save the configuration as JSON
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(&ConfigFile::from(self))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        self.text.validate()
    }

    /// Whether definition pages are interleaved with picto pages
    pub fn has_definitions(&self) -> bool {
        has_definitions(&self.entries)
    }

    /// Every distinct font file the document may draw with
    pub fn font_faces(&self) -> Vec<FontFace> {
        let mut faces = vec![self.text.font.clone()];
        if self.has_definitions() {
            if let Some(font) = &self.text.definitions.font {
                faces.push(FontFace::File(font.clone()));
            }
            for def in self.entries.iter().filter_map(|e| e.definition.as_ref()) {
                if let Some(font) = &def.font {
                    faces.push(FontFace::File(font.clone()));
                }
            }
        }
        let mut unique = Vec::with_capacity(faces.len());
        for face in faces {
            if !unique.contains(&face) {
                unique.push(face);
            }
        }
        unique
    }
}

/// True when at least one entry has definition text
pub fn has_definitions(entries: &[Entry]) -> bool {
    entries.iter().any(Entry::has_definition)
}

// =============================================================================
// File format
// =============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct ConfigFile {
    page: PageSection,
    text: TextSection,
    images: Vec<Entry>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct PageSection {
    cols: usize,
    lines: usize,
    orientation: Orientation,
    paper: PaperSize,
    page_margins: MarginsConfig,
    margins: MarginsConfig,
    paddings: MarginsConfig,
    two_sided_offset_mm: OffsetSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct OffsetSection {
    x: Option<f32>,
    y: Option<f32>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct TextSection {
    font: Option<PathBuf>,
    ratio: Option<f32>,
    size: Option<f32>,
    color: Option<Color>,
    top: bool,
    size_compensation: Option<f32>,
    definitions: DefinitionText,
}

impl ConfigFile {
    fn resolve(self, base_dir: Option<&Path>) -> Result<PictoConfig> {
        let resolve = |path: PathBuf| match base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path,
        };

        let page = self.page;
        let grid = GridSpec {
            cols: page.cols,
            rows: page.lines,
            orientation: page.orientation,
            paper: page.paper,
            page_margins: page.page_margins.with_defaults(DEFAULT_PAGE_MARGINS),
            margins: page.margins.with_defaults(DEFAULT_MARGINS),
            paddings: page.paddings.with_defaults(DEFAULT_PADDINGS),
            two_sided_offset: TwoSidedOffset {
                x_mm: page
                    .two_sided_offset_mm
                    .x
                    .unwrap_or(DEFAULT_TWO_SIDED_OFFSET_X_MM),
                y_mm: page
                    .two_sided_offset_mm
                    .y
                    .unwrap_or(DEFAULT_TWO_SIDED_OFFSET_Y_MM),
            },
        };

        let text = self.text;
        let mut definitions = text.definitions;
        definitions.font = definitions.font.map(resolve);
        let text = TextDefaults {
            font: FontFace::from_path(text.font.map(resolve).as_deref()),
            size_ratio: text.ratio.unwrap_or(DEFAULT_TEXT_RATIO),
            fixed_size: text.size,
            color: text.color.unwrap_or(Color::BLACK),
            top_aligned: text.top,
            size_compensation: text.size_compensation.unwrap_or(FONT_SIZE_COMPENSATION),
            definitions,
        };

        let entries = self
            .images
            .into_iter()
            .map(|mut entry| {
                entry.image = resolve(entry.image);
                if let Some(def) = entry.definition.as_mut() {
                    def.font = def.font.take().map(resolve);
                }
                entry
            })
            .collect();

        let config = PictoConfig {
            grid,
            text,
            entries,
        };
        config.validate()?;
        Ok(config)
    }
}

impl From<&PictoConfig> for ConfigFile {
    fn from(config: &PictoConfig) -> Self {
        let grid = &config.grid;
        let as_config = |m: Margins| MarginsConfig {
            top: Some(m.top),
            bottom: Some(m.bottom),
            left: Some(m.left),
            right: Some(m.right),
        };
        ConfigFile {
            page: PageSection {
                cols: grid.cols,
                lines: grid.rows,
                orientation: grid.orientation,
                paper: grid.paper,
                page_margins: as_config(grid.page_margins),
                margins: as_config(grid.margins),
                paddings: as_config(grid.paddings),
                two_sided_offset_mm: OffsetSection {
                    x: Some(grid.two_sided_offset.x_mm),
                    y: Some(grid.two_sided_offset.y_mm),
                },
            },
            text: TextSection {
                font: config.text.font.path().map(Path::to_path_buf),
                ratio: Some(config.text.size_ratio),
                size: config.text.fixed_size,
                color: Some(config.text.color),
                top: config.text.top_aligned,
                size_compensation: Some(config.text.size_compensation),
                definitions: config.text.definitions.clone(),
            },
            images: config.entries.clone(),
        }
    }
}
