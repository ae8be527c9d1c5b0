use crate::backend::{DrawingBackend, ImageMetrics, TextMetrics, read_image_size};
use crate::constants::{
    BORDER_LINE_WIDTH, CUT_LINE_DASH, CUT_LINE_GAP, CUT_LINE_WIDTH, HELVETICA_CHAR_WIDTH_RATIO,
    TEXT_HEIGHT_RATIO,
};
use crate::geometry::{Point, Rect, Size};
use crate::options::PictoConfig;
use crate::render::{DrawCommand, render};
use crate::types::{Color, FontFace, PictoError, Result};
use lopdf::{Object, StringFormat};
use printpdf::{
    BuiltinFont, FontId, LineDashPattern, LinePoint, Mm, Op, ParsedFont, PdfDocument, PdfPage,
    PdfSaveOptions, Pt, RawImage, Rgb, TextItem, XObjectId, XObjectTransform,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Generate the picto document described by `config` and write it to
/// `output_path`
pub async fn generate_pdf(
    config: &PictoConfig,
    cut_lines: bool,
    output_path: impl AsRef<Path>,
) -> Result<()> {
    let config = config.clone();
    let output_path = output_path.as_ref().to_owned();

    // PDF generation is CPU-bound, spawn blocking
    let bytes =
        tokio::task::spawn_blocking(move || generate_pdf_bytes(&config, cut_lines)).await??;

    tokio::fs::write(&output_path, bytes).await?;

    log::info!("PDF written successfully to {}", output_path.display());
    Ok(())
}

/// Render `config` into PDF bytes
pub fn generate_pdf_bytes(config: &PictoConfig, cut_lines: bool) -> Result<Vec<u8>> {
    let backend = PdfBackend::for_config(config)?;
    render(
        &config.entries,
        &config.grid,
        &config.text,
        cut_lines,
        backend,
    )
}

struct LoadedFont {
    id: FontId,
    parsed: ParsedFont,
}

/// [`DrawingBackend`] writing a PDF document with printpdf
pub struct PdfBackend {
    doc: PdfDocument,
    fonts: HashMap<PathBuf, LoadedFont>,
    images: HashMap<PathBuf, (XObjectId, Size)>,
    pages: Vec<PdfPage>,
    page_size: Size,
    ops: Vec<Op>,
}

impl PdfBackend {
    pub fn new(title: &str) -> Self {
        Self {
            doc: PdfDocument::new(title),
            fonts: HashMap::new(),
            images: HashMap::new(),
            pages: Vec::new(),
            page_size: Size::default(),
            ops: Vec::new(),
        }
    }

    /// Backend with every font `config` may draw with already loaded
    pub fn for_config(config: &PictoConfig) -> Result<Self> {
        let mut backend = Self::new("Pictos");
        for face in config.font_faces() {
            if let FontFace::File(path) = face {
                backend.load_font(&path)?;
            }
        }
        Ok(backend)
    }

    /// Parse a TrueType/OpenType font file and register it with the document
    pub fn load_font(&mut self, path: &Path) -> Result<()> {
        if self.fonts.contains_key(path) {
            return Ok(());
        }

        let bytes = std::fs::read(path).map_err(|e| {
            PictoError::Font(format!("unable to read font {}: {e}", path.display()))
        })?;
        let mut warnings = Vec::new();
        let parsed = ParsedFont::from_bytes(&bytes, 0, &mut warnings)
            .ok_or_else(|| PictoError::Font(format!("unable to parse font {}", path.display())))?;
        let id = self.doc.add_font(&parsed);
        log::debug!("Loaded font {}", path.display());

        self.fonts
            .insert(path.to_path_buf(), LoadedFont { id, parsed });
        Ok(())
    }

    fn loaded_font(&self, path: &Path) -> Result<&LoadedFont> {
        self.fonts
            .get(path)
            .ok_or_else(|| PictoError::Font(format!("font {} is not loaded", path.display())))
    }

    fn image(&mut self, path: &Path) -> Result<(XObjectId, Size)> {
        if let Some(image) = self.images.get(path) {
            return Ok(image.clone());
        }

        let image_error = |reason: String| PictoError::ImageRead {
            path: path.to_path_buf(),
            reason,
        };
        let bytes = std::fs::read(path).map_err(|e| image_error(e.to_string()))?;
        let mut warnings = Vec::new();
        let raw = RawImage::decode_from_bytes(&bytes, &mut warnings).map_err(image_error)?;
        let size = Size::new(raw.width as f32, raw.height as f32);
        let id = self.doc.add_image(&raw);

        self.images.insert(path.to_path_buf(), (id.clone(), size));
        Ok((id, size))
    }

    /// Top-left origin point to PDF coordinates
    fn pdf_point(&self, point: Point) -> printpdf::Point {
        printpdf::Point {
            x: Pt(point.x),
            y: Pt(self.page_size.height - point.y),
        }
    }

    fn stroke(&mut self, points: Vec<printpdf::Point>, closed: bool) {
        self.ops.push(Op::DrawLine {
            line: printpdf::Line {
                points: points
                    .into_iter()
                    .map(|p| LinePoint { p, bezier: false })
                    .collect(),
                is_closed: closed,
            },
        });
    }

    fn draw_rect(&mut self, rect: &Rect) {
        let corners = vec![
            self.pdf_point(Point::new(rect.x, rect.y)),
            self.pdf_point(Point::new(rect.right(), rect.y)),
            self.pdf_point(Point::new(rect.right(), rect.bottom())),
            self.pdf_point(Point::new(rect.x, rect.bottom())),
        ];
        self.ops.push(Op::SaveGraphicsState);
        self.ops.push(Op::SetOutlineColor {
            col: pdf_color(Color::BLACK),
        });
        self.ops.push(Op::SetOutlineThickness {
            pt: Pt(BORDER_LINE_WIDTH),
        });
        self.stroke(corners, true);
        self.ops.push(Op::RestoreGraphicsState);
    }

    fn draw_cut_line(&mut self, from: Point, to: Point) {
        let points = vec![self.pdf_point(from), self.pdf_point(to)];
        self.ops.push(Op::SaveGraphicsState);
        self.ops.push(Op::SetOutlineColor {
            col: pdf_color(Color::BLACK),
        });
        self.ops.push(Op::SetOutlineThickness {
            pt: Pt(CUT_LINE_WIDTH),
        });
        self.ops.push(Op::SetLineDashPattern {
            dash: LineDashPattern {
                dash_1: Some(CUT_LINE_DASH),
                gap_1: Some(CUT_LINE_GAP),
                ..Default::default()
            },
        });
        self.stroke(points, false);
        self.ops.push(Op::RestoreGraphicsState);
    }

    fn draw_image(&mut self, path: &Path, rect: &Rect) -> Result<()> {
        let (id, pixels) = self.image(path)?;
        if pixels.width <= 0.0 || pixels.height <= 0.0 {
            return Err(PictoError::ImageSize {
                width: pixels.width,
                height: pixels.height,
            });
        }

        // At 72 dpi one pixel is one point
        self.ops.push(Op::UseXobject {
            id,
            transform: XObjectTransform {
                translate_x: Some(Pt(rect.x)),
                translate_y: Some(Pt(self.page_size.height - rect.bottom())),
                rotate: None,
                scale_x: Some(rect.width / pixels.width),
                scale_y: Some(rect.height / pixels.height),
                dpi: Some(72.0),
            },
        });
        Ok(())
    }

    fn draw_char(
        &mut self,
        ch: char,
        position: Point,
        font: &FontFace,
        size: f32,
        color: Color,
    ) -> Result<()> {
        let pos = self.pdf_point(position);
        let text = vec![TextItem::Text(ch.to_string())];

        let mut ops = vec![
            Op::StartTextSection,
            Op::SetFillColor {
                col: pdf_color(color),
            },
        ];
        match font {
            FontFace::Helvetica => {
                ops.push(Op::SetFontSizeBuiltinFont {
                    font: BuiltinFont::Helvetica,
                    size: Pt(size),
                });
                ops.push(Op::SetTextCursor { pos });
                ops.push(Op::WriteTextBuiltinFont {
                    items: text,
                    font: BuiltinFont::Helvetica,
                });
            }
            FontFace::File(path) => {
                let id = self.loaded_font(path)?.id.clone();
                ops.push(Op::SetFontSize {
                    font: id.clone(),
                    size: Pt(size),
                });
                ops.push(Op::SetTextCursor { pos });
                ops.push(Op::WriteText {
                    items: text,
                    font: id,
                });
            }
        }
        ops.push(Op::EndTextSection);

        self.ops.extend(ops);
        Ok(())
    }

    fn flush_page(&mut self) {
        if self.page_size == Size::default() && self.ops.is_empty() {
            return;
        }
        let ops = std::mem::take(&mut self.ops);
        self.pages.push(PdfPage::new(
            Mm::from(Pt(self.page_size.width)),
            Mm::from(Pt(self.page_size.height)),
            ops,
        ));
    }
}

impl TextMetrics for PdfBackend {
    fn measure_text_width(&self, text: &str, font: &FontFace, size: f32) -> Result<f32> {
        match font {
            FontFace::Helvetica => Ok(text.chars().map(helvetica_width).sum::<f32>() * size),
            FontFace::File(path) => {
                let font = &self.loaded_font(path)?.parsed;
                let units_per_em = font.font_metrics.units_per_em;
                if units_per_em == 0 {
                    return Err(PictoError::TextMeasure {
                        text: text.to_string(),
                        reason: format!("font {} has no units per em", path.display()),
                    });
                }

                // Characters missing from the font take no space
                let units: u32 = text
                    .chars()
                    .filter_map(|ch| font.lookup_glyph_index(ch as u32))
                    .map(|glyph| u32::from(font.get_horizontal_advance(glyph)))
                    .sum();
                Ok(units as f32 / f32::from(units_per_em) * size)
            }
        }
    }

    fn text_line_height(&self, _font: &FontFace, size: f32) -> f32 {
        size * TEXT_HEIGHT_RATIO
    }
}

impl ImageMetrics for PdfBackend {
    fn image_size(&self, path: &Path) -> Result<Size> {
        match self.images.get(path) {
            Some((_, size)) => Ok(*size),
            None => read_image_size(path),
        }
    }
}

impl DrawingBackend for PdfBackend {
    fn add_page(&mut self, size: Size) -> Result<()> {
        self.flush_page();
        self.page_size = size;
        Ok(())
    }

    fn draw(&mut self, command: &DrawCommand) -> Result<()> {
        match command {
            DrawCommand::Rect { rect } => self.draw_rect(rect),
            DrawCommand::CutLine { from, to } => self.draw_cut_line(*from, *to),
            DrawCommand::Image { path, rect } => self.draw_image(path, rect)?,
            DrawCommand::Char {
                ch,
                position,
                font,
                size,
                color,
            } => self.draw_char(*ch, *position, font, *size, *color)?,
        }
        Ok(())
    }

    fn finalize(mut self) -> Result<Vec<u8>> {
        self.flush_page();
        self.doc.pages = std::mem::take(&mut self.pages);

        let mut warnings = Vec::new();
        let bytes = self.doc.save(&PdfSaveOptions::default(), &mut warnings);
        log::debug!(
            "Saved {} pages ({} warnings)",
            self.doc.pages.len(),
            warnings.len()
        );

        with_content_id(&bytes)
    }
}

/// Replace the random trailer `/ID` printpdf writes with one derived from
/// the document itself, so identical input gives identical bytes
fn with_content_id(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut doc = lopdf::Document::load_mem(bytes)?;
    doc.trailer.remove(b"ID");

    let mut unidentified = Vec::new();
    doc.save_to(&mut unidentified)?;
    let id = content_digest(&unidentified);

    doc.trailer.set(
        "ID",
        Object::Array(vec![
            Object::String(id.clone(), StringFormat::Hexadecimal),
            Object::String(id, StringFormat::Hexadecimal),
        ]),
    );
    let mut output = Vec::with_capacity(unidentified.len() + 64);
    doc.save_to(&mut output)?;
    Ok(output)
}

/// 16 byte FNV-1a digest: two 64-bit passes with different offset bases
fn content_digest(bytes: &[u8]) -> Vec<u8> {
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    const OFFSETS: [u64; 2] = [0xcbf2_9ce4_8422_2325, 0x6c62_272e_07bb_0142];

    OFFSETS
        .iter()
        .flat_map(|&offset| {
            bytes
                .iter()
                .fold(offset, |hash, &b| (hash ^ u64::from(b)).wrapping_mul(PRIME))
                .to_be_bytes()
        })
        .collect()
}

fn pdf_color(color: Color) -> printpdf::Color {
    let (r, g, b) = color.as_unit_floats();
    printpdf::Color::Rgb(Rgb {
        r,
        g,
        b,
        icc_profile: None,
    })
}

/// Advance width of `ch` in builtin Helvetica, relative to the font size
fn helvetica_width(ch: char) -> f32 {
    let units: u16 = match ch {
        ' ' | '!' | ',' | '.' | '/' | ':' | ';' | '[' | '\\' | ']' | 'I' | 'f' | 't' => 278,
        '"' => 355,
        '#' | '$' | '0'..='9' | '?' | '_' => 556,
        '%' => 889,
        '&' | 'A' | 'B' | 'E' | 'K' | 'P' | 'S' | 'V' | 'X' | 'Y' => 667,
        '\'' => 191,
        '(' | ')' | '-' | '`' | 'r' => 333,
        '*' => 389,
        '+' | '<' | '=' | '>' | '~' => 584,
        '@' => 1015,
        'C' | 'D' | 'H' | 'N' | 'R' | 'U' | 'w' => 722,
        'F' | 'T' | 'Z' => 611,
        'G' | 'O' | 'Q' => 778,
        'J' | 'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' => 500,
        'L' => 556,
        'M' | 'm' => 833,
        'W' => 944,
        '^' => 469,
        'i' | 'j' | 'l' => 222,
        '{' | '}' => 334,
        '|' => 260,
        'a' | 'b' | 'd' | 'e' | 'g' | 'h' | 'n' | 'o' | 'p' | 'q' | 'u' => 556,
        _ => return HELVETICA_CHAR_WIDTH_RATIO,
    };
    f32::from(units) / 1000.0
}
