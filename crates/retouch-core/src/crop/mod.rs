//! Crop region engine.
//!
//! Owns the in-progress crop rectangle while crop mode is active. The
//! rectangle lives in display space (pixels of the base image on screen);
//! [`compose_crop`] turns a finished selection into original space.
//!
//! # Interaction
//!
//! ```text
//! Idle --pointer down on handle/interior--> Dragging --pointer up--> Idle
//! ```
//!
//! Every move during a drag recomputes the rectangle from the one captured at
//! drag start, so rounding never accumulates.

mod compose;
mod drag;
mod handle;

pub use compose::compose_crop;
pub use drag::{drag_rect, refit_to_ratio, DragConstraints};
pub use handle::{hit_test, Handle};

use crate::geometry::{AspectRatio, Dimensions, DisplayRect, Point};

#[derive(Debug, Clone, PartialEq)]
enum DragState {
    Idle,
    Dragging {
        handle: Handle,
        /// Pointer position at drag start, in image pixels.
        origin: Point,
        initial: DisplayRect,
    },
}

/// What the engine needs to know about the canvas for one pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropContext {
    /// Displayed base image size.
    pub base: Dimensions,
    /// True original size, for the "original" aspect ratio.
    pub original: Dimensions,
    pub zoom: f64,
    pub min_size_screen: f64,
    pub handle_tolerance_screen: f64,
}

impl CropContext {
    fn constraints(&self, aspect: AspectRatio) -> DragConstraints {
        DragConstraints {
            bounds: self.base,
            ratio: aspect.resolve(self.original),
            min_size: self.min_size_screen / self.zoom,
        }
    }
}

/// Interactive crop state for one crop-mode session.
#[derive(Debug, Clone, PartialEq)]
pub struct CropEngine {
    region: Option<DisplayRect>,
    aspect: AspectRatio,
    drag: DragState,
}

impl Default for CropEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CropEngine {
    pub fn new() -> Self {
        Self {
            region: None,
            aspect: AspectRatio::Freeform,
            drag: DragState::Idle,
        }
    }

    /// Current UI crop region, if crop mode is active.
    pub fn region(&self) -> Option<DisplayRect> {
        self.region
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect
    }

    pub fn is_active(&self) -> bool {
        self.region.is_some()
    }

    pub fn active_handle(&self) -> Option<Handle> {
        match self.drag {
            DragState::Dragging { handle, .. } => Some(handle),
            DragState::Idle => None,
        }
    }

    /// Enter crop mode with the whole base selected, shaped to the active ratio.
    pub fn begin(&mut self, base: Dimensions, original: Dimensions) {
        let full = DisplayRect::full(base);
        self.region = Some(match self.aspect.resolve(original) {
            Some(ratio) => refit_to_ratio(&full, ratio, base),
            None => full,
        });
        self.drag = DragState::Idle;
    }

    /// Leave crop mode, discarding the region.
    pub fn cancel(&mut self) {
        self.region = None;
        self.drag = DragState::Idle;
    }

    /// Change the ratio; an existing region is re-shaped in place unless a
    /// drag is in progress (the next move picks the ratio up).
    pub fn set_aspect_ratio(&mut self, aspect: AspectRatio, base: Dimensions, original: Dimensions) {
        self.aspect = aspect;
        if self.drag != DragState::Idle {
            return;
        }
        if let (Some(region), Some(ratio)) = (self.region, aspect.resolve(original)) {
            self.region = Some(refit_to_ratio(&region, ratio, base));
        }
    }

    /// Start a drag if `point` (image pixels) hits a handle or the interior.
    pub fn pointer_down(&mut self, point: Point, ctx: &CropContext) -> Option<Handle> {
        let region = self.region?;
        let tolerance = ctx.handle_tolerance_screen / ctx.zoom;
        let handle = hit_test(&region, point, tolerance)?;
        self.drag = DragState::Dragging {
            handle,
            origin: point,
            initial: region,
        };
        Some(handle)
    }

    /// Update the region for a pointer at `point` (image pixels). Returns the
    /// new region while dragging.
    pub fn pointer_move(&mut self, point: Point, ctx: &CropContext) -> Option<DisplayRect> {
        let DragState::Dragging {
            handle,
            origin,
            initial,
        } = self.drag
        else {
            return None;
        };
        let rect = drag_rect(&initial, handle, point - origin, &ctx.constraints(self.aspect));
        self.region = Some(rect);
        Some(rect)
    }

    /// End the drag. Returns whether a drag was in progress.
    pub fn pointer_up(&mut self) -> bool {
        let was_dragging = self.drag != DragState::Idle;
        self.drag = DragState::Idle;
        was_dragging
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(zoom: f64) -> CropContext {
        CropContext {
            base: Dimensions::new(1000, 500),
            original: Dimensions::new(2000, 1000),
            zoom,
            min_size_screen: 20.0,
            handle_tolerance_screen: 10.0,
        }
    }

    #[test]
    fn test_begin_selects_whole_base() {
        let mut engine = CropEngine::new();
        engine.begin(Dimensions::new(1000, 500), Dimensions::new(2000, 1000));
        assert_eq!(engine.region(), Some(DisplayRect::new(0, 0, 1000, 500)));
        assert!(engine.is_active());
    }

    #[test]
    fn test_begin_applies_active_ratio() {
        let mut engine = CropEngine::new();
        engine.set_aspect_ratio(
            AspectRatio::Square,
            Dimensions::new(1000, 500),
            Dimensions::new(2000, 1000),
        );
        engine.begin(Dimensions::new(1000, 500), Dimensions::new(2000, 1000));
        assert_eq!(engine.region(), Some(DisplayRect::new(0, 0, 500, 500)));
    }

    #[test]
    fn test_original_ratio_uses_true_original() {
        // Base is a cropped 400x400 square; original is 2:1.
        let mut engine = CropEngine::new();
        engine.begin(Dimensions::new(400, 400), Dimensions::new(2000, 1000));
        engine.set_aspect_ratio(
            AspectRatio::Original,
            Dimensions::new(400, 400),
            Dimensions::new(2000, 1000),
        );
        assert_eq!(engine.region(), Some(DisplayRect::new(0, 0, 400, 200)));
    }

    #[test]
    fn test_drag_corner_through_engine() {
        let mut engine = CropEngine::new();
        engine.begin(Dimensions::new(1000, 500), Dimensions::new(2000, 1000));
        let c = ctx(1.0);

        assert_eq!(
            engine.pointer_down(Point::new(998.0, 499.0), &c),
            Some(Handle::BottomRight)
        );
        engine.pointer_move(Point::new(800.0, 300.0), &c);
        engine.pointer_move(Point::new(600.0, 250.0), &c);
        assert!(engine.pointer_up());

        assert_eq!(engine.region(), Some(DisplayRect::new(0, 0, 602, 251)));
        assert_eq!(engine.active_handle(), None);
    }

    #[test]
    fn test_drag_delta_is_zoom_independent() {
        // Points are already in image space; zoom only changes tolerances.
        let mut a = CropEngine::new();
        let mut b = CropEngine::new();
        for engine in [&mut a, &mut b] {
            engine.begin(Dimensions::new(1000, 500), Dimensions::new(2000, 1000));
        }
        a.pointer_down(Point::new(500.0, 250.0), &ctx(1.0));
        b.pointer_down(Point::new(500.0, 250.0), &ctx(4.0));
        a.pointer_move(Point::new(400.0, 200.0), &ctx(1.0));
        b.pointer_move(Point::new(400.0, 200.0), &ctx(4.0));
        assert_eq!(a.region(), b.region());
    }

    #[test]
    fn test_min_size_shrinks_with_zoom() {
        let mut engine = CropEngine::new();
        engine.begin(Dimensions::new(1000, 500), Dimensions::new(2000, 1000));
        let c = ctx(4.0);
        engine.pointer_down(Point::new(1000.0, 500.0), &c);
        engine.pointer_move(Point::new(0.0, 0.0), &c);
        // 20 screen px at 4x is 5 image px.
        assert_eq!(engine.region(), Some(DisplayRect::new(0, 0, 5, 5)));
    }

    #[test]
    fn test_miss_does_not_start_drag() {
        let mut engine = CropEngine::new();
        engine.begin(Dimensions::new(1000, 500), Dimensions::new(2000, 1000));
        engine.pointer_move(Point::new(10.0, 10.0), &ctx(1.0));
        assert_eq!(engine.pointer_down(Point::new(-50.0, -50.0), &ctx(1.0)), None);
        assert!(engine.pointer_move(Point::new(10.0, 10.0), &ctx(1.0)).is_none());
        assert!(!engine.pointer_up());
    }

    #[test]
    fn test_ratio_change_deferred_while_dragging() {
        let mut engine = CropEngine::new();
        let base = Dimensions::new(1000, 500);
        let original = Dimensions::new(2000, 1000);
        engine.begin(base, original);
        engine.pointer_down(Point::new(500.0, 250.0), &ctx(1.0));
        engine.set_aspect_ratio(AspectRatio::Square, base, original);
        assert_eq!(engine.region(), Some(DisplayRect::new(0, 0, 1000, 500)));
        assert_eq!(engine.aspect_ratio(), AspectRatio::Square);
    }

    #[test]
    fn test_cancel_clears_region() {
        let mut engine = CropEngine::new();
        engine.begin(Dimensions::new(100, 100), Dimensions::new(100, 100));
        engine.cancel();
        assert_eq!(engine.region(), None);
        assert!(!engine.is_active());
    }
}
