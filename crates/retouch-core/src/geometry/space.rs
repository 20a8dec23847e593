//! Points, vectors, dimensions and space-tagged rectangles.

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, AddAssign, Sub};

use serde::{Deserialize, Serialize};

/// A point in canvas or image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A displacement, e.g. a pan offset or a drag delta.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Sub for Point {
    type Output = Vector;

    fn sub(self, rhs: Point) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add<Vector> for Point {
    type Output = Point;

    fn add(self, rhs: Vector) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Vector) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

/// Pixel size of an image instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Both sides are non-zero.
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Width divided by height.
    pub fn aspect_ratio(self) -> f64 {
        self.width as f64 / self.height.max(1) as f64
    }

    /// Scale down so the longest edge is at most `max_edge`, preserving the
    /// aspect ratio. Dimensions that already fit are returned unchanged.
    pub fn fit_within(self, max_edge: u32) -> Dimensions {
        if max_edge == 0 || (self.width <= max_edge && self.height <= max_edge) {
            return self;
        }
        if self.width >= self.height {
            let height = (self.height as f64 * max_edge as f64 / self.width as f64).round();
            Dimensions::new(max_edge, (height as u32).max(1))
        } else {
            let width = (self.width as f64 * max_edge as f64 / self.height as f64).round();
            Dimensions::new((width as u32).max(1), max_edge)
        }
    }

    /// Swap width and height (90° / 270° orientation).
    pub fn transposed(self) -> Dimensions {
        Dimensions::new(self.height, self.width)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Marker for rectangles drawn against the currently displayed base image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplaySpace;

/// Marker for rectangles in the full-resolution original's pixel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OriginalSpace;

/// An integer pixel rectangle tagged with the space it lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Rect<S> {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
    #[serde(skip)]
    space: PhantomData<S>,
}

/// A rectangle in displayed-base-image pixels.
pub type DisplayRect = Rect<DisplaySpace>;

/// A rectangle in true-original pixels.
pub type OriginalRect = Rect<OriginalSpace>;

impl<S> Rect<S> {
    pub const fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
            space: PhantomData,
        }
    }

    /// Rectangle covering an entire image.
    pub const fn full(dims: Dimensions) -> Self {
        Self::new(0, 0, dims.width, dims.height)
    }

    pub fn right(&self) -> u32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.top + self.height
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// Whether the rectangle lies entirely inside an image of `bounds`.
    pub fn fits_within(&self, bounds: Dimensions) -> bool {
        self.right() <= bounds.width && self.bottom() <= bounds.height
    }

    /// Whether both sides are at least `min` pixels.
    pub fn meets_minimum(&self, min: u32) -> bool {
        self.width >= min && self.height >= min
    }
}

impl<S> fmt::Display for Rect<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}+{}+{}",
            self.width, self.height, self.left, self.top
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_within_landscape() {
        let dims = Dimensions::new(6000, 4000).fit_within(2560);
        assert_eq!(dims, Dimensions::new(2560, 1707));
    }

    #[test]
    fn test_fit_within_portrait() {
        let dims = Dimensions::new(3000, 6000).fit_within(1000);
        assert_eq!(dims, Dimensions::new(500, 1000));
    }

    #[test]
    fn test_fit_within_already_small() {
        let dims = Dimensions::new(800, 600);
        assert_eq!(dims.fit_within(2560), dims);
    }

    #[test]
    fn test_rect_edges() {
        let rect = DisplayRect::new(10, 20, 30, 40);
        assert_eq!(rect.right(), 40);
        assert_eq!(rect.bottom(), 60);
        assert!(rect.fits_within(Dimensions::new(40, 60)));
        assert!(!rect.fits_within(Dimensions::new(39, 60)));
    }

    #[test]
    fn test_rect_display() {
        let rect = OriginalRect::new(1, 2, 3, 4);
        assert_eq!(rect.to_string(), "3x4+1+2");
    }

    #[test]
    fn test_point_vector_ops() {
        let a = Point::new(5.0, 7.0);
        let b = Point::new(2.0, 10.0);
        assert_eq!(a - b, Vector::new(3.0, -3.0));
        assert_eq!(b + Vector::new(3.0, -3.0), a);

        let mut pan = Vector::new(1.0, 1.0);
        pan += Vector::new(-2.0, 0.5);
        assert_eq!(pan, Vector::new(-1.0, 1.5));
    }
}
