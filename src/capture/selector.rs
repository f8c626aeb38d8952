//! Drag-to-select state for the region selector overlay.

use super::region::{PixelRect, Point, SelectionRect, Size};

/// One tick of a pointer drag, as delivered by the host's gesture stream.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DragEvent {
    /// Where the gesture started. Fixed for a well-behaved event source.
    pub start_location: Point,
    /// Where the pointer is now.
    pub location: Point,
}

impl DragEvent {
    pub fn new(start_location: Point, location: Point) -> Self {
        Self {
            start_location,
            location,
        }
    }
}

/// Tracks the two points of an in-progress or finished drag.
///
/// The rectangle is derived on demand and never cached.
#[derive(Debug, Clone, Default)]
pub struct RegionSelector {
    start_location: Point,
    current_location: Point,
    dragging: bool,
}

impl RegionSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new gesture, collapsing the selection onto `start`.
    pub fn begin(&mut self, start: Point) {
        self.start_location = start;
        self.current_location = start;
        self.dragging = true;
        log::debug!("[SELECT] Gesture began at ({}, {})", start.x, start.y);
    }

    /// Applies one drag update.
    ///
    /// Both points are overwritten on every tick, the start included. An
    /// event source that reports a drifting start therefore moves the
    /// anchor with it.
    pub fn on_drag_change(&mut self, event: DragEvent) {
        self.start_location = event.start_location;
        self.current_location = event.location;
        self.dragging = true;
    }

    /// Marks the gesture finished. The last rectangle stays selected.
    pub fn end(&mut self) {
        if self.dragging {
            let rect = self.rect();
            log::info!(
                "[SELECT] Selected {}x{} at {},{}",
                rect.width,
                rect.height,
                rect.x,
                rect.y
            );
        }
        self.dragging = false;
    }

    /// Returns both points to the origin.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn start_location(&self) -> Point {
        self.start_location
    }

    pub fn current_location(&self) -> Point {
        self.current_location
    }

    /// Current selection in view space.
    pub fn rect(&self) -> SelectionRect {
        SelectionRect::from_points(self.start_location, self.current_location)
    }

    /// Current selection mapped onto image pixels. See
    /// [`SelectionRect::to_pixel_rect`].
    pub fn pixel_rect(&self, view: Size, image_size: (u32, u32)) -> Option<PixelRect> {
        self.rect().to_pixel_rect(view, image_size)
    }
}
