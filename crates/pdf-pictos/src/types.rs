use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PictoError {
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("No font size fits {text:?} in {max_width:.2}x{max_height:.2}pt")]
    FontFit {
        text: String,
        max_width: f32,
        max_height: f32,
    },
    #[error("Unable to read image {}: {reason}", path.display())]
    ImageRead { path: PathBuf, reason: String },
    #[error("Image has unusable dimensions {width}x{height}")]
    ImageSize { width: f32, height: f32 },
    #[error("Unable to measure text {text:?}: {reason}")]
    TextMeasure { text: String, reason: String },
    #[error("Unable to wrap text {text:?}: {reason}")]
    Wrap { text: String, reason: String },
    #[error("Font error: {0}")]
    Font(String),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl PictoError {
    /// Errors that only affect the image of a single cell
    pub fn is_image_error(&self) -> bool {
        matches!(
            self,
            PictoError::ImageRead { .. } | PictoError::ImageSize { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PictoError>;

/// RGB text color.
///
/// Deserialized either from a well-known name (`"red"`) or from three
/// comma separated hexadecimal components (`"ff,80,00"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 128, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let color = match name.to_ascii_lowercase().as_str() {
            "black" => Color::BLACK,
            "white" => Color::WHITE,
            "red" => Color::RED,
            "green" => Color::GREEN,
            "blue" => Color::BLUE,
            "yellow" => Color::rgb(255, 215, 0),
            "orange" => Color::rgb(255, 140, 0),
            "purple" => Color::rgb(128, 0, 128),
            "pink" => Color::rgb(255, 105, 180),
            "brown" => Color::rgb(139, 69, 19),
            "grey" | "gray" => Color::rgb(128, 128, 128),
            _ => return None,
        };
        Some(color)
    }

    /// Components scaled to `0.0..=1.0`
    pub fn as_unit_floats(&self) -> (f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }
}

impl FromStr for Color {
    type Err = PictoError;

    fn from_str(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if let Some(color) = Color::from_name(raw) {
            return Ok(color);
        }

        let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(PictoError::Config(format!(
                "unable to decode color {raw} (format: rr,gg,bb)"
            )));
        }

        let mut rgb = [0u8; 3];
        for (slot, part) in rgb.iter_mut().zip(&parts) {
            *slot = u8::from_str_radix(part, 16).map_err(|_| {
                PictoError::Config(format!("unable to decode color component {part} in {raw}"))
            })?;
        }

        Ok(Color::rgb(rgb[0], rgb[1], rgb[2]))
    }
}

impl TryFrom<String> for Color {
    type Error = PictoError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x},{:02x},{:02x}", self.r, self.g, self.b)
    }
}

/// Sparse color overrides keyed by character index in reading order
pub type TextColors = BTreeMap<usize, Color>;

/// Horizontal alignment of wrapped text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
}

/// Font used to draw and measure text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum FontFace {
    /// Builtin Helvetica, used when no font file is configured
    #[default]
    Helvetica,
    /// TrueType/OpenType font file
    File(PathBuf),
}

impl FontFace {
    pub fn from_path(path: Option<&Path>) -> Self {
        match path {
            Some(path) => FontFace::File(path.to_path_buf()),
            None => FontFace::Helvetica,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            FontFace::Helvetica => None,
            FontFace::File(path) => Some(path),
        }
    }
}

/// Text printed on the back side of a picto, with per-entry overrides of
/// the document-wide definition settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefinitionText {
    pub text: String,
    pub text_colors: TextColors,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub borders: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_spacing_ratio: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<TextAlign>,
}

impl DefinitionText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// One picto: an image, its word and an optional definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub image: PathBuf,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub text_colors: TextColors,
    #[serde(default, rename = "def", skip_serializing_if = "Option::is_none")]
    pub definition: Option<DefinitionText>,
}

impl Entry {
    pub fn new(image: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_definition(mut self, definition: DefinitionText) -> Self {
        self.definition = Some(definition);
        self
    }

    /// True when the entry carries a non-blank definition
    pub fn has_definition(&self) -> bool {
        self.definition.as_ref().is_some_and(|def| !def.is_blank())
    }
}
