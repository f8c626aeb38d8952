//! Region selection domain — public API.
//!
//! This module owns the drag-to-select overlay: the gesture state, the
//! rectangle geometry, cropping, and overlay compositing.
//! External code should only use the items re-exported here.

mod overlay;
mod region;
mod selector;

pub use overlay::{render_overlay, render_overlay_base64, DebugReadout, OverlayStyle};
pub use region::{crop_to_png_bytes, fit_rect, CropError, PixelRect, Point, SelectionRect, Size};
pub use selector::{DragEvent, RegionSelector};
