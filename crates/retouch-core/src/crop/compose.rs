//! Mapping a finished UI crop onto the true original.
//!
//! The displayed base can be a down-scaled preview of the original, or the
//! output of an earlier crop rendered at some resolution. The processing
//! service only understands original pixels, so every commit is composed back
//! into that space here.

use crate::error::ValidationError;
use crate::geometry::{Dimensions, DisplayRect, OriginalRect};

/// Compose `ui` (drawn on a base of size `base`) into true-original space.
///
/// * No committed crop: the base shows the whole original, scaled.
/// * Committed crop: the base shows exactly `committed`, scaled to `base`.
///
/// The result is clamped to the original's bounds and must be at least
/// `min_size` on both sides.
pub fn compose_crop(
    ui: &DisplayRect,
    base: Dimensions,
    original: Dimensions,
    committed: Option<&OriginalRect>,
    min_size: u32,
) -> Result<OriginalRect, ValidationError> {
    if !base.is_valid() || !original.is_valid() {
        return Err(ValidationError::MissingDimensions);
    }

    // Region of the original that the base image depicts.
    let shown = committed
        .copied()
        .unwrap_or_else(|| OriginalRect::full(original));

    let scale_x = shown.width as f64 / base.width as f64;
    let scale_y = shown.height as f64 / base.height as f64;

    let left = shown.left as f64 + ui.left as f64 * scale_x;
    let top = shown.top as f64 + ui.top as f64 * scale_y;
    let width = ui.width as f64 * scale_x;
    let height = ui.height as f64 * scale_y;

    let left = (left.round() as u32).min(original.width);
    let top = (top.round() as u32).min(original.height);
    let width = (width.round() as u32).min(original.width - left);
    let height = (height.round() as u32).min(original.height - top);

    let rect = OriginalRect::new(left, top, width, height);
    if !rect.meets_minimum(min_size) {
        return Err(ValidationError::CropTooSmall {
            width,
            height,
            min: min_size,
        });
    }
    Ok(rect)
}
