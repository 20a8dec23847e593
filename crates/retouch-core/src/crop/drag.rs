//! Resize and move math for the crop rectangle.
//!
//! Work happens in floating point on a per-axis "anchored span": the edge that
//! stays fixed, the direction the rectangle extends from it, and its length.
//! Dragging an edge past its opposite simply flips the direction, which is the
//! negative-size normalization step.

use crate::geometry::{Dimensions, DisplayRect, Vector};

use super::Handle;

/// Limits applied to every drag step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragConstraints {
    /// Displayed base image size; the rectangle never leaves it.
    pub bounds: Dimensions,
    /// Locked width / height, if any.
    pub ratio: Option<f64>,
    /// Minimum side in image pixels (screen minimum divided by zoom).
    pub min_size: f64,
}

/// One axis of the rectangle relative to its fixed edge.
#[derive(Debug, Clone, Copy)]
struct Span {
    anchor: f64,
    /// +1.0 when the span extends toward larger coordinates.
    dir: f64,
    len: f64,
}

impl Span {
    /// Span whose near edge stays at `start`.
    fn fixed(start: f64, len: f64) -> Self {
        Self {
            anchor: start,
            dir: 1.0,
            len,
        }
    }

    /// Span between a fixed edge and a dragged edge.
    fn dragged(anchor: f64, moving: f64, default_dir: f64) -> Self {
        let offset = moving - anchor;
        let dir = if offset == 0.0 {
            default_dir
        } else {
            offset.signum()
        };
        Self {
            anchor,
            dir,
            len: offset.abs(),
        }
    }

    fn start(&self) -> f64 {
        if self.dir > 0.0 {
            self.anchor
        } else {
            self.anchor - self.len
        }
    }

    /// Room between the anchor and the image edge in the span's direction.
    fn room(&self, extent: f64) -> f64 {
        if self.dir > 0.0 {
            extent - self.anchor
        } else {
            self.anchor
        }
        .max(0.0)
    }
}

/// Apply a drag `delta` (image pixels) on `handle` to the rectangle captured at
/// drag start.
pub fn drag_rect(
    initial: &DisplayRect,
    handle: Handle,
    delta: Vector,
    constraints: &DragConstraints,
) -> DisplayRect {
    if handle == Handle::Move {
        return translate(initial, delta, constraints.bounds);
    }

    let left = initial.left as f64;
    let top = initial.top as f64;
    let right = initial.right() as f64;
    let bottom = initial.bottom() as f64;

    let mut x = if handle.moves_left() {
        Span::dragged(right, left + delta.x, -1.0)
    } else if handle.moves_right() {
        Span::dragged(left, right + delta.x, 1.0)
    } else {
        Span::fixed(left, initial.width as f64)
    };
    let mut y = if handle.moves_top() {
        Span::dragged(bottom, top + delta.y, -1.0)
    } else if handle.moves_bottom() {
        Span::dragged(top, bottom + delta.y, 1.0)
    } else {
        Span::fixed(top, initial.height as f64)
    };

    // Top and bottom handles drive the width; everything else drives height.
    let height_driven = matches!(handle, Handle::Top | Handle::Bottom);
    if let Some(ratio) = constraints.ratio {
        if height_driven {
            x.len = y.len * ratio;
        } else {
            y.len = x.len / ratio;
        }
    }

    let min = constraints.min_size;
    if x.len < min {
        x.len = min;
        if let Some(ratio) = constraints.ratio {
            y.len = x.len / ratio;
        }
    }
    if y.len < min {
        y.len = min;
        if let Some(ratio) = constraints.ratio {
            x.len = y.len * ratio;
        }
    }

    let room_x = x.room(constraints.bounds.width as f64);
    let room_y = y.room(constraints.bounds.height as f64);
    match constraints.ratio {
        Some(ratio) => {
            x.len = x.len.min(room_x).min(room_y * ratio);
            y.len = x.len / ratio;
        }
        None => {
            x.len = x.len.min(room_x);
            y.len = y.len.min(room_y);
        }
    }

    round_into(x, y, constraints.bounds)
}

fn translate(initial: &DisplayRect, delta: Vector, bounds: Dimensions) -> DisplayRect {
    let width = initial.width.min(bounds.width);
    let height = initial.height.min(bounds.height);
    let max_left = (bounds.width - width) as f64;
    let max_top = (bounds.height - height) as f64;
    let left = (initial.left as f64 + delta.x).round().clamp(0.0, max_left);
    let top = (initial.top as f64 + delta.y).round().clamp(0.0, max_top);
    DisplayRect::new(left as u32, top as u32, width, height)
}

fn round_into(x: Span, y: Span, bounds: Dimensions) -> DisplayRect {
    let max_left = bounds.width.saturating_sub(1) as f64;
    let max_top = bounds.height.saturating_sub(1) as f64;
    let left = x.start().round().clamp(0.0, max_left) as u32;
    let top = y.start().round().clamp(0.0, max_top) as u32;
    let width = (x.len.round() as u32).clamp(1, bounds.width.saturating_sub(left).max(1));
    let height = (y.len.round() as u32).clamp(1, bounds.height.saturating_sub(top).max(1));
    DisplayRect::new(left, top, width, height)
}

/// Re-shape an existing rectangle to `ratio` without a drag.
///
/// Keeps the top-left corner and the current width; if the new height would
/// overflow the image, keeps the height instead. Shrinks as a last resort.
pub fn refit_to_ratio(rect: &DisplayRect, ratio: f64, bounds: Dimensions) -> DisplayRect {
    let left = rect.left as f64;
    let top = rect.top as f64;
    let room_x = (bounds.width as f64 - left).max(1.0);
    let room_y = (bounds.height as f64 - top).max(1.0);

    let mut width = rect.width as f64;
    let mut height = width / ratio;
    if height > room_y {
        height = (rect.height as f64).min(room_y);
        width = height * ratio;
    }
    if width > room_x {
        width = room_x;
        height = width / ratio;
    }

    round_into(Span::fixed(left, width), Span::fixed(top, height), bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn free(bounds: Dimensions) -> DragConstraints {
        DragConstraints {
            bounds,
            ratio: None,
            min_size: 20.0,
        }
    }

    fn locked(bounds: Dimensions, ratio: f64) -> DragConstraints {
        DragConstraints {
            bounds,
            ratio: Some(ratio),
            min_size: 20.0,
        }
    }

    const BIG: Dimensions = Dimensions::new(1000, 1000);

    #[test]
    fn test_bottom_right_square_lock() {
        let initial = DisplayRect::new(0, 0, 300, 200);
        let out = drag_rect(
            &initial,
            Handle::BottomRight,
            Vector::new(50.0, 10.0),
            &locked(BIG, 1.0),
        );
        assert_eq!(out.width, out.height);
        assert_eq!(out, DisplayRect::new(0, 0, 350, 350));
    }

    #[test]
    fn test_square_lock_clamped_to_bounds() {
        let initial = DisplayRect::new(0, 0, 300, 200);
        let bounds = Dimensions::new(400, 300);
        let out = drag_rect(
            &initial,
            Handle::BottomRight,
            Vector::new(50.0, 10.0),
            &locked(bounds, 1.0),
        );
        assert_eq!(out.width, out.height);
        assert!(out.fits_within(bounds));
        assert_eq!(out, DisplayRect::new(0, 0, 300, 300));
    }

    #[test]
    fn test_top_left_keeps_bottom_right_fixed() {
        let initial = DisplayRect::new(100, 100, 400, 300);
        let out = drag_rect(
            &initial,
            Handle::TopLeft,
            Vector::new(100.0, 0.0),
            &locked(BIG, 1.0),
        );
        assert_eq!(out, DisplayRect::new(200, 100, 300, 300));
        assert_eq!(out.right(), initial.right());
        assert_eq!(out.bottom(), initial.bottom());
    }

    #[test]
    fn test_edge_handle_moves_one_edge() {
        let initial = DisplayRect::new(100, 100, 400, 300);
        let out = drag_rect(
            &initial,
            Handle::Right,
            Vector::new(-50.0, 999.0),
            &free(BIG),
        );
        assert_eq!(out, DisplayRect::new(100, 100, 350, 300));
    }

    #[test]
    fn test_top_handle_with_ratio_drives_width() {
        let initial = DisplayRect::new(100, 100, 400, 300);
        let out = drag_rect(
            &initial,
            Handle::Top,
            Vector::new(0.0, 60.0),
            &locked(BIG, 2.0),
        );
        assert_eq!(out, DisplayRect::new(100, 160, 480, 240));
    }

    #[test]
    fn test_drag_past_opposite_edge_flips() {
        let initial = DisplayRect::new(100, 100, 100, 100);
        let out = drag_rect(
            &initial,
            Handle::Left,
            Vector::new(150.0, 0.0),
            &free(BIG),
        );
        assert_eq!(out, DisplayRect::new(200, 100, 50, 100));
    }

    #[test]
    fn test_min_size_enforced() {
        let initial = DisplayRect::new(100, 100, 100, 100);
        let out = drag_rect(
            &initial,
            Handle::BottomRight,
            Vector::new(-95.0, -95.0),
            &free(BIG),
        );
        assert_eq!(out, DisplayRect::new(100, 100, 20, 20));
    }

    #[test]
    fn test_min_size_rederives_ratio() {
        let initial = DisplayRect::new(100, 100, 200, 100);
        let out = drag_rect(
            &initial,
            Handle::Bottom,
            Vector::new(0.0, -95.0),
            &locked(BIG, 2.0),
        );
        assert_eq!(out, DisplayRect::new(100, 100, 40, 20));
    }

    #[test]
    fn test_free_resize_clamped_to_bounds() {
        let initial = DisplayRect::new(800, 800, 100, 100);
        let out = drag_rect(
            &initial,
            Handle::BottomRight,
            Vector::new(500.0, 500.0),
            &free(BIG),
        );
        assert_eq!(out, DisplayRect::new(800, 800, 200, 200));
    }

    #[test]
    fn test_move_translates_without_resizing() {
        let initial = DisplayRect::new(100, 100, 200, 150);
        let out = drag_rect(&initial, Handle::Move, Vector::new(30.4, -20.6), &free(BIG));
        assert_eq!(out, DisplayRect::new(130, 79, 200, 150));
    }

    #[test]
    fn test_move_stops_at_edges() {
        let initial = DisplayRect::new(100, 100, 200, 150);
        let out = drag_rect(
            &initial,
            Handle::Move,
            Vector::new(5000.0, -5000.0),
            &free(BIG),
        );
        assert_eq!(out, DisplayRect::new(800, 0, 200, 150));
    }

    #[test]
    fn test_refit_width_first() {
        let rect = DisplayRect::new(0, 0, 400, 300);
        let out = refit_to_ratio(&rect, 1.0, BIG);
        assert_eq!(out, DisplayRect::new(0, 0, 400, 400));
    }

    #[test]
    fn test_refit_pivots_to_height_when_overflowing() {
        let rect = DisplayRect::new(0, 0, 1000, 500);
        let out = refit_to_ratio(&rect, 1.0, Dimensions::new(1000, 500));
        assert_eq!(out, DisplayRect::new(0, 0, 500, 500));
    }

    #[test]
    fn test_refit_keeps_width_for_wide_ratio() {
        let rect = DisplayRect::new(900, 0, 100, 1000);
        let out = refit_to_ratio(&rect, 16.0 / 9.0, Dimensions::new(1000, 1000));
        assert_eq!(out.left, 900);
        assert_eq!(out.width, 100);
        assert_eq!(out.height, 56);
    }
}
