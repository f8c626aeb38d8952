//! Selection overlay compositing.
//!
//! The whole image is dimmed; the selected region is revealed at full
//! opacity through a rounded-rectangle mask. An optional readout reports
//! the selection's integer geometry.

use super::region::{PixelRect, SelectionRect};
use crate::codec::{self, CodecError};
use image::{DynamicImage, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Visual parameters of the overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    /// Opacity of the black layer over unselected pixels, 0.0..=1.0.
    pub dim_opacity: f32,
    /// Corner radius of the reveal mask, in pixels.
    pub corner_radius: f32,
    /// Whether hosts should show the geometry readout.
    pub debug_readout: bool,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            dim_opacity: 0.4,
            corner_radius: 5.0,
            debug_readout: true,
        }
    }
}

impl OverlayStyle {
    /// Readout for `rect`, or `None` when the readout is switched off.
    pub fn readout(&self, rect: &SelectionRect) -> Option<DebugReadout> {
        self.debug_readout.then(|| DebugReadout::from_rect(rect))
    }
}

/// Integer-truncated geometry of a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugReadout {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl DebugReadout {
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_rect(rect: &SelectionRect) -> Self {
        Self {
            x: rect.x as i64,
            y: rect.y as i64,
            width: rect.width as i64,
            height: rect.height as i64,
        }
    }
}

impl fmt::Display for DebugReadout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "x: {}", self.x)?;
        writeln!(f, "y: {}", self.y)?;
        writeln!(f, "width: {}", self.width)?;
        write!(f, "height: {}", self.height)
    }
}

/// Composites the overlay for `base`.
///
/// With `selection == None` the whole frame is dimmed.
pub fn render_overlay(
    base: &DynamicImage,
    selection: Option<PixelRect>,
    style: &OverlayStyle,
) -> RgbaImage {
    let keep = 1.0 - style.dim_opacity.clamp(0.0, 1.0);
    let mut frame = base.to_rgba8();

    for (x, y, pixel) in frame.enumerate_pixels_mut() {
        let revealed = selection.is_some_and(|rect| in_rounded_rect(x, y, rect, style.corner_radius));
        if !revealed {
            *pixel = dim(*pixel, keep);
        }
    }

    frame
}

/// Renders the overlay and encodes it as base64 PNG for webview hosts.
pub fn render_overlay_base64(
    base: &DynamicImage,
    selection: Option<PixelRect>,
    style: &OverlayStyle,
) -> Result<String, CodecError> {
    let start = std::time::Instant::now();
    let frame = DynamicImage::ImageRgba8(render_overlay(base, selection, style));
    let encoded = codec::encode_base64_png(&frame)?;

    log::debug!(
        "[OVERLAY] Rendered {}x{} frame in {}ms ({} base64 chars)",
        frame.width(),
        frame.height(),
        start.elapsed().as_millis(),
        encoded.len()
    );
    Ok(encoded)
}

fn dim(pixel: Rgba<u8>, keep: f32) -> Rgba<u8> {
    let [r, g, b, a] = pixel.0;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let scale = |c: u8| (f32::from(c) * keep).round() as u8;
    Rgba([scale(r), scale(g), scale(b), a])
}

/// Whether the center of pixel (x, y) lies inside `rect` with rounded corners.
fn in_rounded_rect(x: u32, y: u32, rect: PixelRect, radius: f32) -> bool {
    if rect.width == 0 || rect.height == 0 {
        return false;
    }

    let left = rect.x as f32;
    let top = rect.y as f32;
    let right = left + rect.width as f32;
    let bottom = top + rect.height as f32;

    let px = x as f32 + 0.5;
    let py = y as f32 + 0.5;
    if px < left || px > right || py < top || py > bottom {
        return false;
    }

    let r = radius.max(0.0).min(rect.width.min(rect.height) as f32 / 2.0);
    let cx = px.clamp(left + r, right - r);
    let cy = py.clamp(top + r, bottom - r);
    let (dx, dy) = (px - cx, py - cy);
    dx * dx + dy * dy <= r * r
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255])))
    }

    #[test]
    fn no_selection_dims_everything() {
        let frame = render_overlay(&white(4, 4), None, &OverlayStyle::default());
        // 255 * 0.6 = 153
        assert!(frame.pixels().all(|p| p.0 == [153, 153, 153, 255]));
    }

    #[test]
    fn selection_is_revealed_at_full_opacity() {
        let style = OverlayStyle {
            corner_radius: 0.0,
            ..OverlayStyle::default()
        };
        let frame = render_overlay(&white(20, 20), Some(PixelRect::new(5, 5, 10, 10)), &style);
        assert_eq!(frame.get_pixel(5, 5).0, [255, 255, 255, 255]);
        assert_eq!(frame.get_pixel(14, 14).0, [255, 255, 255, 255]);
        assert_eq!(frame.get_pixel(4, 5).0, [153, 153, 153, 255]);
        assert_eq!(frame.get_pixel(15, 14).0, [153, 153, 153, 255]);
    }

    #[test]
    fn rounded_corners_stay_dimmed() {
        let frame = render_overlay(
            &white(40, 40),
            Some(PixelRect::new(10, 10, 20, 20)),
            &OverlayStyle::default(),
        );
        // Corner pixel lies outside the 5px arc; edge midpoint lies inside.
        assert_eq!(frame.get_pixel(10, 10).0, [153, 153, 153, 255]);
        assert_eq!(frame.get_pixel(20, 10).0, [255, 255, 255, 255]);
        assert_eq!(frame.get_pixel(20, 20).0, [255, 255, 255, 255]);
    }

    #[test]
    fn zero_area_selection_reveals_nothing() {
        let frame = render_overlay(
            &white(8, 8),
            Some(PixelRect::new(3, 3, 0, 4)),
            &OverlayStyle::default(),
        );
        assert!(frame.pixels().all(|p| p.0 == [153, 153, 153, 255]));
    }

    #[test]
    fn readout_truncates_toward_zero() {
        let rect = SelectionRect {
            x: 10.9,
            y: 0.2,
            width: 39.99,
            height: 70.5,
        };
        let readout = DebugReadout::from_rect(&rect);
        assert_eq!(readout, DebugReadout { x: 10, y: 0, width: 39, height: 70 });
        assert_eq!(readout.to_string(), "x: 10\ny: 0\nwidth: 39\nheight: 70");
    }

    #[test]
    fn readout_respects_style_switch() {
        let rect = SelectionRect::default();
        let off = OverlayStyle {
            debug_readout: false,
            ..OverlayStyle::default()
        };
        assert!(off.readout(&rect).is_none());
        assert!(OverlayStyle::default().readout(&rect).is_some());
    }

    #[test]
    fn base64_preview_is_png() {
        use base64::{engine::general_purpose::STANDARD, Engine};
        let encoded = render_overlay_base64(&white(4, 4), None, &OverlayStyle::default()).unwrap();
        let raw = STANDARD.decode(encoded).unwrap();
        assert_eq!(&raw[..4], &[0x89, 0x50, 0x4E, 0x47]);
    }
}
