//! Zoom and pan state of the editing canvas.
//!
//! Zoom is screen pixels per display-image pixel. The pan offset is the canvas
//! position of the image's top-left corner.

use crate::geometry::{to_image_space, Dimensions, Point, Vector};

/// Viewport controller: owns zoom level and pan offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    zoom: f64,
    pan: Vector,
    min_zoom: f64,
    max_zoom: f64,
    sensitivity: f64,
}

impl Viewport {
    /// Create a viewport at 100% zoom with no pan.
    ///
    /// `min_zoom` must be positive; [`crate::EditorConfig::validate`] checks it.
    pub fn new(min_zoom: f64, max_zoom: f64, sensitivity: f64) -> Self {
        Self {
            zoom: 1.0_f64.clamp(min_zoom, max_zoom),
            pan: Vector::ZERO,
            min_zoom,
            max_zoom,
            sensitivity,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan_offset(&self) -> Vector {
        self.pan
    }

    /// Map a canvas point into display-image coordinates.
    pub fn to_image(&self, canvas: Point) -> Point {
        to_image_space(canvas, self.pan, self.zoom)
    }

    /// Inscribe the image in the container and center it.
    pub fn fit_to_container(&mut self, image: Dimensions, container: Dimensions) {
        if !image.is_valid() || !container.is_valid() {
            return;
        }
        let scale_x = container.width as f64 / image.width as f64;
        let scale_y = container.height as f64 / image.height as f64;
        self.zoom = scale_x.min(scale_y).clamp(self.min_zoom, self.max_zoom);

        let shown_w = image.width as f64 * self.zoom;
        let shown_h = image.height as f64 * self.zoom;
        self.pan = Vector::new(
            (container.width as f64 - shown_w) / 2.0,
            (container.height as f64 - shown_h) / 2.0,
        );
    }

    /// Wheel zoom anchored at `canvas`: the image point under the cursor stays
    /// put on screen.
    pub fn zoom_at(&mut self, canvas: Point, wheel_delta: f64) {
        let anchor = self.to_image(canvas);
        let zoom = (self.zoom * (1.0 - wheel_delta * self.sensitivity))
            .clamp(self.min_zoom, self.max_zoom);
        if !zoom.is_finite() {
            return;
        }
        self.zoom = zoom;
        self.pan = Vector::new(canvas.x - anchor.x * zoom, canvas.y - anchor.y * zoom);
    }

    /// Shift the view. Panning past the image edges is allowed.
    pub fn pan(&mut self, delta: Vector) {
        self.pan += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(0.1, 10.0, 0.001)
    }

    #[test]
    fn test_fit_wide_image_letterboxes_vertically() {
        let mut vp = viewport();
        vp.fit_to_container(Dimensions::new(2000, 1000), Dimensions::new(1000, 1000));
        assert_eq!(vp.zoom(), 0.5);
        assert_eq!(vp.pan_offset(), Vector::new(0.0, 250.0));
    }

    #[test]
    fn test_fit_tall_image_letterboxes_horizontally() {
        let mut vp = viewport();
        vp.fit_to_container(Dimensions::new(500, 1000), Dimensions::new(800, 500));
        assert_eq!(vp.zoom(), 0.5);
        assert_eq!(vp.pan_offset(), Vector::new(275.0, 0.0));
    }

    #[test]
    fn test_fit_respects_zoom_limits() {
        let mut vp = viewport();
        vp.fit_to_container(Dimensions::new(10, 10), Dimensions::new(1000, 1000));
        assert_eq!(vp.zoom(), 10.0);
        assert_eq!(vp.pan_offset(), Vector::new(450.0, 450.0));
    }

    #[test]
    fn test_fit_ignores_empty_container() {
        let mut vp = viewport();
        vp.fit_to_container(Dimensions::new(100, 100), Dimensions::new(0, 300));
        assert_eq!(vp.zoom(), 1.0);
    }

    #[test]
    fn test_zoom_in_with_negative_delta() {
        let mut vp = viewport();
        vp.zoom_at(Point::new(0.0, 0.0), -100.0);
        assert!((vp.zoom() - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_zoom_keeps_cursor_point_fixed() {
        let mut vp = viewport();
        vp.pan(Vector::new(37.0, -12.0));
        let cursor = Point::new(420.0, 310.0);
        let before = vp.to_image(cursor);
        vp.zoom_at(cursor, 250.0);
        let after = vp.to_image(cursor);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_clamps_to_limits() {
        let mut vp = viewport();
        vp.zoom_at(Point::new(10.0, 10.0), -1_000_000.0);
        assert_eq!(vp.zoom(), 10.0);
        vp.zoom_at(Point::new(10.0, 10.0), 999.0);
        assert!(vp.zoom() >= 0.1);
    }

    #[test]
    fn test_pan_is_unbounded() {
        let mut vp = viewport();
        vp.pan(Vector::new(-5000.0, 9000.0));
        vp.pan(Vector::new(1.0, 1.0));
        assert_eq!(vp.pan_offset(), Vector::new(-4999.0, 9001.0));
    }
}
