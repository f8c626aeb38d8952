//! Selection geometry and region cropping — functional core.
//!
//! This module has zero infrastructure dependencies.
//! Points in, rectangles out; pixels in, PNG bytes out.

use crate::codec::{self, CodecError};
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// A screen-space coordinate on the displayed image surface.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height of a view, in screen-space units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Rectangle spanned by two drag points.
///
/// Always normalized: `width` and `height` are never negative, and the
/// origin is the top-left corner regardless of drag direction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectionRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SelectionRect {
    /// Builds the rectangle spanned by `start` and `current`.
    pub fn from_points(start: Point, current: Point) -> Self {
        Self {
            x: start.x.min(current.x),
            y: start.y.min(current.y),
            width: (current.x - start.x).abs(),
            height: (current.y - start.y).abs(),
        }
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// Zero-area rectangles are valid selections that reveal nothing.
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Maps this view-space rectangle onto the pixels of an image that is
    /// displayed aspect-fit inside a view of `view` size.
    ///
    /// The result is clamped to the image bounds. Returns `None` when
    /// nothing of the selection lands on the image.
    pub fn to_pixel_rect(&self, view: Size, image_size: (u32, u32)) -> Option<PixelRect> {
        let (img_w, img_h) = image_size;
        if img_w == 0 || img_h == 0 {
            return None;
        }

        let frame = fit_rect(view, image_size);
        if !frame.has_area() {
            return None;
        }
        let scale = frame.width / f64::from(img_w);

        let to_px = |value: f64, offset: f64, limit: u32| -> f64 {
            ((value - offset) / scale).clamp(0.0, f64::from(limit))
        };

        let left = to_px(self.x, frame.x, img_w).floor();
        let top = to_px(self.y, frame.y, img_h).floor();
        let right = to_px(self.max_x(), frame.x, img_w).ceil();
        let bottom = to_px(self.max_y(), frame.y, img_h).ceil();

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let rect = PixelRect {
            x: left as u32,
            y: top as u32,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        };

        (rect.width > 0 && rect.height > 0).then_some(rect)
    }
}

/// Integer pixel rectangle inside a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Frame an image of `image_size` occupies when scaled to fit `view`
/// and centered, preserving its aspect ratio.
pub fn fit_rect(view: Size, image_size: (u32, u32)) -> SelectionRect {
    let (img_w, img_h) = (f64::from(image_size.0), f64::from(image_size.1));
    if img_w <= 0.0 || img_h <= 0.0 || view.width <= 0.0 || view.height <= 0.0 {
        return SelectionRect::default();
    }

    let scale = (view.width / img_w).min(view.height / img_h);
    let width = img_w * scale;
    let height = img_h * scale;

    SelectionRect {
        x: (view.width - width) / 2.0,
        y: (view.height - height) / 2.0,
        width,
        height,
    }
}

/// Crops a `DynamicImage` to the given pixel rectangle and returns PNG bytes.
///
/// This is a pure function with no side effects.
pub fn crop_to_png_bytes(image: &DynamicImage, rect: PixelRect) -> Result<Vec<u8>, CropError> {
    if rect.width == 0 || rect.height == 0 {
        return Err(CropError::ZeroDimension);
    }

    let (img_width, img_height) = (image.width(), image.height());

    let fits_x = rect.x.checked_add(rect.width).is_some_and(|r| r <= img_width);
    let fits_y = rect.y.checked_add(rect.height).is_some_and(|b| b <= img_height);
    if !fits_x || !fits_y {
        return Err(CropError::OutOfBounds {
            requested: rect,
            image_size: (img_width, img_height),
        });
    }

    let cropped = image.crop_imm(rect.x, rect.y, rect.width, rect.height);
    Ok(codec::encode_png(&cropped)?)
}

#[derive(Debug, thiserror::Error)]
pub enum CropError {
    #[error("Crop rectangle has zero width or height")]
    ZeroDimension,

    #[error(
        "Crop rectangle ({},{},{},{}) exceeds image bounds ({}x{})",
        requested.x, requested.y, requested.width, requested.height,
        image_size.0, image_size.1
    )]
    OutOfBounds {
        requested: PixelRect,
        image_size: (u32, u32),
    },

    #[error(transparent)]
    Encoding(#[from] CodecError),
}
