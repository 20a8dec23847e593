//! Crop rectangle handles and hit-testing.

use serde::{Deserialize, Serialize};

use crate::geometry::{DisplayRect, Point};

/// A grab point on the crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Handle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
    /// The rectangle interior: translates without resizing.
    Move,
}

impl Handle {
    /// Corners come first so they win over edges on small rectangles.
    pub const RESIZE: [Handle; 8] = [
        Handle::TopLeft,
        Handle::TopRight,
        Handle::BottomRight,
        Handle::BottomLeft,
        Handle::Top,
        Handle::Right,
        Handle::Bottom,
        Handle::Left,
    ];

    /// Wire name, as serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            Handle::TopLeft => "topLeft",
            Handle::Top => "top",
            Handle::TopRight => "topRight",
            Handle::Right => "right",
            Handle::BottomRight => "bottomRight",
            Handle::Bottom => "bottom",
            Handle::BottomLeft => "bottomLeft",
            Handle::Left => "left",
            Handle::Move => "move",
        }
    }

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            Handle::TopLeft | Handle::TopRight | Handle::BottomRight | Handle::BottomLeft
        )
    }

    pub fn moves_left(self) -> bool {
        matches!(self, Handle::TopLeft | Handle::Left | Handle::BottomLeft)
    }

    pub fn moves_right(self) -> bool {
        matches!(self, Handle::TopRight | Handle::Right | Handle::BottomRight)
    }

    pub fn moves_top(self) -> bool {
        matches!(self, Handle::TopLeft | Handle::Top | Handle::TopRight)
    }

    pub fn moves_bottom(self) -> bool {
        matches!(self, Handle::BottomLeft | Handle::Bottom | Handle::BottomRight)
    }

    /// Where this handle sits on `rect`. `Move` maps to the center.
    pub fn position(self, rect: &DisplayRect) -> Point {
        let left = rect.left as f64;
        let top = rect.top as f64;
        let right = rect.right() as f64;
        let bottom = rect.bottom() as f64;
        let mid_x = (left + right) / 2.0;
        let mid_y = (top + bottom) / 2.0;

        match self {
            Handle::TopLeft => Point::new(left, top),
            Handle::Top => Point::new(mid_x, top),
            Handle::TopRight => Point::new(right, top),
            Handle::Right => Point::new(right, mid_y),
            Handle::BottomRight => Point::new(right, bottom),
            Handle::Bottom => Point::new(mid_x, bottom),
            Handle::BottomLeft => Point::new(left, bottom),
            Handle::Left => Point::new(left, mid_y),
            Handle::Move => Point::new(mid_x, mid_y),
        }
    }
}

/// Find the handle under `point` (display-image coordinates).
///
/// `tolerance` is in image pixels; callers divide the screen tolerance by the
/// zoom so handles feel the same size at any zoom level.
pub fn hit_test(rect: &DisplayRect, point: Point, tolerance: f64) -> Option<Handle> {
    let hit = Handle::RESIZE.into_iter().find(|handle| {
        let at = handle.position(rect);
        let dx = point.x - at.x;
        let dy = point.y - at.y;
        (dx * dx + dy * dy).sqrt() <= tolerance
    });
    if hit.is_some() {
        return hit;
    }

    let inside = point.x >= rect.left as f64
        && point.x <= rect.right() as f64
        && point.y >= rect.top as f64
        && point.y <= rect.bottom() as f64;
    inside.then_some(Handle::Move)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> DisplayRect {
        DisplayRect::new(100, 100, 200, 100)
    }

    #[test]
    fn test_handle_names() {
        assert_eq!(Handle::BottomRight.as_str(), "bottomRight");
        assert_eq!(Handle::Move.as_str(), "move");
    }

    #[test]
    fn test_hits_corners() {
        assert_eq!(
            hit_test(&rect(), Point::new(103.0, 98.0), 10.0),
            Some(Handle::TopLeft)
        );
        assert_eq!(
            hit_test(&rect(), Point::new(300.0, 200.0), 10.0),
            Some(Handle::BottomRight)
        );
    }

    #[test]
    fn test_hits_edge_midpoints() {
        assert_eq!(
            hit_test(&rect(), Point::new(200.0, 95.0), 10.0),
            Some(Handle::Top)
        );
        assert_eq!(
            hit_test(&rect(), Point::new(96.0, 150.0), 10.0),
            Some(Handle::Left)
        );
    }

    #[test]
    fn test_interior_is_move() {
        assert_eq!(
            hit_test(&rect(), Point::new(150.0, 130.0), 10.0),
            Some(Handle::Move)
        );
    }

    #[test]
    fn test_outside_misses() {
        assert_eq!(hit_test(&rect(), Point::new(50.0, 50.0), 10.0), None);
        assert_eq!(hit_test(&rect(), Point::new(320.0, 150.0), 10.0), None);
    }

    #[test]
    fn test_tolerance_scales_with_zoom() {
        // 10 screen px at 4x zoom is 2.5 image px.
        let point = Point::new(100.0, 94.0);
        assert_eq!(hit_test(&rect(), point, 10.0 / 1.0), Some(Handle::TopLeft));
        assert_eq!(hit_test(&rect(), point, 10.0 / 4.0), None);
    }

    #[test]
    fn test_handle_edges() {
        assert!(Handle::TopLeft.moves_left() && Handle::TopLeft.moves_top());
        assert!(!Handle::Top.moves_left() && !Handle::Top.moves_right());
        assert!(Handle::Right.moves_right() && !Handle::Right.is_corner());
        assert!(!Handle::Move.moves_left() && !Handle::Move.moves_bottom());
    }
}
