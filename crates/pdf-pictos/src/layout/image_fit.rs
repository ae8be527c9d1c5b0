//! Aspect-preserving image placement inside a picto cell

use crate::geometry::{Margins, Size};
use crate::types::{PictoError, Result};

/// Size of `image` once scaled into a `cell` whose caption band takes
/// `caption_band` points of height.
///
/// The cell's shape picks the constraint tried first: landscape cells fill
/// the available height, portrait cells the available width. The other
/// axis is only used when the first attempt overflows.
pub fn fit_image(image: Size, cell: Size, caption_band: f32, paddings: &Margins) -> Result<Size> {
    let usable = |v: f32| v.is_finite() && v > 0.0;
    if !usable(image.width) || !usable(image.height) {
        return Err(PictoError::ImageSize {
            width: image.width,
            height: image.height,
        });
    }

    let max_width = (cell.width - paddings.left_right()).max(0.0);
    let max_height = (cell.height - caption_band - paddings.top_bottom()).max(0.0);

    let from_height = |h: f32| Size::new(image.width * h / image.height, h);
    let from_width = |w: f32| Size::new(w, image.height * w / image.width);

    let fitted = if cell.is_landscape() {
        let size = from_height(max_height);
        if size.width > max_width {
            from_width(max_width)
        } else {
            size
        }
    } else {
        let size = from_width(max_width);
        if size.height > max_height {
            from_height(max_height)
        } else {
            size
        }
    };

    Ok(fitted)
}
