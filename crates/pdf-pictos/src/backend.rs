//! Seams between the layout engine and the document backend
//!
//! Layout only needs text metrics and image sizes; drawing happens through
//! [`DrawingBackend`] once a page's commands are known.

use crate::geometry::Size;
use crate::render::DrawCommand;
use crate::types::{FontFace, PictoError, Result};
use std::path::Path;

/// Text measurement provided by the backend
pub trait TextMetrics {
    /// Advance width of `text` in points
    fn measure_text_width(&self, text: &str, font: &FontFace, size: f32) -> Result<f32>;

    /// Height of one line of text in points
    fn text_line_height(&self, font: &FontFace, size: f32) -> f32;

    /// Split `text` into lines no wider than `max_width` where possible
    fn wrap_text(
        &self,
        text: &str,
        font: &FontFace,
        size: f32,
        max_width: f32,
    ) -> Result<Vec<String>> {
        wrap_words(self, text, font, size, max_width)
    }
}

/// Image dimension lookup provided by the backend
pub trait ImageMetrics {
    /// Pixel dimensions of the image at `path`
    fn image_size(&self, path: &Path) -> Result<Size>;
}

/// A document the renderer draws into
pub trait DrawingBackend: TextMetrics + ImageMetrics {
    fn add_page(&mut self, size: Size) -> Result<()>;

    fn draw(&mut self, command: &DrawCommand) -> Result<()>;

    /// Serialize the document
    fn finalize(self) -> Result<Vec<u8>>
    where
        Self: Sized;
}

/// Read image dimensions from the file header
pub fn read_image_size(path: &Path) -> Result<Size> {
    let (width, height) = image::image_dimensions(path).map_err(|e| PictoError::ImageRead {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(Size::new(width as f32, height as f32))
}

/// Greedy word wrap breaking at single spaces.
///
/// Each break consumes exactly one space of `text`; runs of spaces stay
/// inside lines. A word wider than `max_width` gets a line of its own.
pub fn wrap_words<M: TextMetrics + ?Sized>(
    metrics: &M,
    text: &str,
    font: &FontFace,
    size: f32,
    max_width: f32,
) -> Result<Vec<String>> {
    let measure = |candidate: &str| {
        metrics
            .measure_text_width(candidate, font, size)
            .map_err(|e| PictoError::Wrap {
                text: text.to_string(),
                reason: e.to_string(),
            })
    };

    let mut lines = Vec::new();
    let mut words = text.split(' ');
    let mut current = match words.next() {
        Some(word) => word.to_string(),
        None => return Ok(lines),
    };

    for word in words {
        let candidate = format!("{current} {word}");
        if measure(&candidate)? <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    lines.push(current);

    Ok(lines)
}


#[cfg(test)]
mod tests {
    use super::testing::FixedMetrics;
    use super::*;

    fn wrap(text: &str, max_width: f32) -> Vec<String> {
        // 1pt per character at size 2
        let metrics = FixedMetrics::default();
        wrap_words(&metrics, text, &FontFace::Helvetica, 2.0, max_width).unwrap()
    }

    #[test]
    fn test_wrap_fits_on_one_line() {
        assert_eq!(wrap("AB CD", 10.0), vec!["AB CD"]);
    }

    #[test]
    fn test_wrap_breaks_at_spaces() {
        assert_eq!(wrap("AB CD", 4.0), vec!["AB", "CD"]);
        assert_eq!(wrap("one two three four", 9.0), vec!["one two", "three", "four"]);
    }

    #[test]
    fn test_wrap_long_word_gets_own_line() {
        assert_eq!(wrap("a extraordinary b", 5.0), vec!["a", "extraordinary", "b"]);
    }

    #[test]
    fn test_wrap_keeps_double_spaces_inside_lines() {
        let lines = wrap("a  b", 2.0);
        assert_eq!(lines, vec!["a ", "b"]);
        // one space removed per break
        let kept: usize = lines.iter().map(|l| l.chars().count()).sum();
        assert_eq!(kept + lines.len() - 1, "a  b".chars().count());
    }

    #[test]
    fn test_wrap_reports_measure_failure() {
        let metrics = FixedMetrics {
            failing_measure: true,
            ..Default::default()
        };
        let err = wrap_words(&metrics, "a b", &FontFace::Helvetica, 2.0, 10.0).unwrap_err();
        assert!(matches!(err, PictoError::Wrap { .. }));
    }

    #[test]
    fn test_wrap_empty_text() {
        assert_eq!(wrap("", 10.0), vec![""]);
    }
}
