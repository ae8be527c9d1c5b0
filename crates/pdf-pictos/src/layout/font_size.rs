//! Caption font size search

use crate::backend::TextMetrics;
use crate::constants::{FONT_SIZE_STEP, MAX_FONT_SIZE};
use crate::geometry::Size;
use crate::options::TextDefaults;
use crate::types::{Entry, FontFace, PictoError, Result};

/// Probe `start`, `start - step`, ... and return the first size accepted by
/// `fits`, or `None` once sizes are no longer positive.
pub fn search_max_fitting_size(
    mut fits: impl FnMut(f32) -> bool,
    start: f32,
    step: f32,
) -> Option<f32> {
    if step <= 0.0 {
        return None;
    }

    let mut size = start;
    while size > 0.0 {
        if fits(size) {
            return Some(size);
        }
        size -= step;
    }
    None
}

/// Largest size at which `text` fits in `max_width` x `max_height`,
/// multiplied by `compensation`.
pub fn find_max_font_size<M: TextMetrics + ?Sized>(
    metrics: &M,
    font: &FontFace,
    text: &str,
    max_width: f32,
    max_height: f32,
    compensation: f32,
) -> Result<f32> {
    let mut failure = None;
    let found = search_max_fitting_size(
        |size| match metrics.measure_text_width(text, font, size) {
            Ok(width) => width < max_width && metrics.text_line_height(font, size) < max_height,
            Err(e) => {
                log::error!("Unable to measure {text:?} at size {size}: {e}");
                if failure.is_none() {
                    failure = Some(e);
                }
                false
            }
        },
        MAX_FONT_SIZE,
        FONT_SIZE_STEP,
    );

    match (found, failure) {
        (Some(size), _) => {
            let size = size * compensation;
            log::debug!("Setting font size {size}");
            Ok(size)
        }
        (None, Some(e)) => Err(e),
        (None, None) => Err(PictoError::FontFit {
            text: text.to_string(),
            max_width,
            max_height,
        }),
    }
}

/// Entry text with the most characters
pub fn longest_text(entries: &[Entry]) -> &str {
    entries
        .iter()
        .map(|e| e.text.as_str())
        .fold("", |longest, text| {
            if text.chars().count() > longest.chars().count() {
                text
            } else {
                longest
            }
        })
}

/// Caption font size shared by every picto cell.
///
/// A configured size is used verbatim; otherwise the longest caption is
/// fitted into the caption band of a cell.
pub fn caption_font_size<M: TextMetrics + ?Sized>(
    metrics: &M,
    text: &TextDefaults,
    entries: &[Entry],
    cell: Size,
) -> Result<f32> {
    if let Some(size) = text.fixed_size {
        log::debug!("Using configured font size {size}");
        return Ok(size);
    }

    find_max_font_size(
        metrics,
        &text.font,
        longest_text(entries),
        cell.width,
        cell.height * text.size_ratio,
        text.size_compensation,
    )
}
