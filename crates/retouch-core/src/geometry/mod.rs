//! Geometry utilities shared by the viewport and crop engines.
//!
//! # Coordinate Spaces
//!
//! Four spaces take part in an editing session:
//!
//! - **Canvas**: on-screen pixels of the drawing surface.
//! - **Display**: native pixels of the base image currently shown on the
//!   canvas. A canvas point maps here through the viewport zoom and pan.
//! - **Preview**: a down-scaled stand-in for the original. It is just a
//!   display base whose dimensions differ from the original.
//! - **Original**: native pixels of the full-resolution source file.
//!
//! Rectangles carry their space in the type ([`DisplayRect`] vs
//! [`OriginalRect`]), so a display rectangle can never be sent to the
//! processing service by accident.

mod aspect;
mod space;

pub use aspect::AspectRatio;
pub use space::{
    Dimensions, DisplayRect, DisplaySpace, OriginalRect, OriginalSpace, Point, Rect, Vector,
};

/// Convert a canvas point to display-image coordinates.
///
/// Formula: `(canvas - pan) / zoom`
#[inline]
pub fn to_image_space(canvas: Point, pan: Vector, zoom: f64) -> Point {
    Point::new((canvas.x - pan.x) / zoom, (canvas.y - pan.y) / zoom)
}

/// Convert a display-image point back to canvas coordinates.
///
/// Inverse of [`to_image_space`].
#[inline]
pub fn to_canvas_space(image: Point, pan: Vector, zoom: f64) -> Point {
    Point::new(image.x * zoom + pan.x, image.y * zoom + pan.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_transform() {
        let p = Point::new(12.0, 34.0);
        assert_eq!(to_image_space(p, Vector::ZERO, 1.0), p);
        assert_eq!(to_canvas_space(p, Vector::ZERO, 1.0), p);
    }

    #[test]
    fn test_zoomed_and_panned() {
        let canvas = Point::new(110.0, 70.0);
        let image = to_image_space(canvas, Vector::new(10.0, 20.0), 2.0);
        assert_eq!(image, Point::new(50.0, 25.0));
    }

    #[test]
    fn test_canvas_space_inverts_image_space() {
        let pan = Vector::new(-35.5, 12.25);
        let zoom = 0.4;
        let canvas = Point::new(300.0, 200.0);
        let back = to_canvas_space(to_image_space(canvas, pan, zoom), pan, zoom);
        assert!((back.x - canvas.x).abs() < 1e-9);
        assert!((back.y - canvas.y).abs() < 1e-9);
    }
}
