//! The persistent drawing bitmap
//!
//! Strokes are rendered incrementally as capsules (round caps and joins)
//! between consecutive points. Only the resulting pixels persist.

use std::path::Path;

use glam::Vec2;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

use super::brush::BrushConfig;
use super::encode::{decode_data_uri, encode_data_uri};
use super::input::{InputDisposition, PointerEvent, SurfaceRect, TouchEvent};
use crate::consts::{BACKGROUND_RGB, FOREGROUND_RGB, SURFACE_SIZE};
use crate::error::SurfaceError;

/// Slack on the coverage test so pixel centers exactly on the brush edge
/// are painted the same way along the whole stroke.
const COVERAGE_EPSILON: f32 = 1e-3;

/// Where a composited image landed on the bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Stroke in progress. Width and color are fixed when the stroke begins.
#[derive(Debug, Clone, Copy)]
struct ActiveStroke {
    last: Vec2,
    radius: f32,
    color: Rgb<u8>,
}

/// Fixed-size, always-opaque drawing surface
#[derive(Debug, Clone)]
pub struct RasterSurface {
    bitmap: RgbImage,
    brush: BrushConfig,
    foreground: [u8; 3],
    background: [u8; 3],
    stroke: Option<ActiveStroke>,
}

impl Default for RasterSurface {
    fn default() -> Self {
        Self::new(SURFACE_SIZE, SURFACE_SIZE)
    }
}

impl RasterSurface {
    /// Create a surface filled with the background color
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_palette(width, height, FOREGROUND_RGB, BACKGROUND_RGB)
    }

    pub fn with_palette(width: u32, height: u32, foreground: [u8; 3], background: [u8; 3]) -> Self {
        Self {
            bitmap: RgbImage::from_pixel(width.max(1), height.max(1), Rgb(background)),
            brush: BrushConfig::default(),
            foreground,
            background,
            stroke: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }

    pub fn brush(&self) -> BrushConfig {
        self.brush
    }

    /// Replace the brush. A stroke already in progress keeps its own settings.
    pub fn set_brush(&mut self, brush: BrushConfig) {
        self.brush = brush;
    }

    pub fn brush_mut(&mut self) -> &mut BrushConfig {
        &mut self.brush
    }

    pub fn is_drawing(&self) -> bool {
        self.stroke.is_some()
    }

    pub fn bitmap(&self) -> &RgbImage {
        &self.bitmap
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x < self.width() && y < self.height() {
            Some(self.bitmap.get_pixel(x, y).0)
        } else {
            None
        }
    }

    /// True when every pixel is the background color
    pub fn is_blank(&self) -> bool {
        self.bitmap.pixels().all(|p| p.0 == self.background)
    }

    /// Fill with background and drop any in-progress stroke
    pub fn reset(&mut self) {
        let bg = Rgb(self.background);
        for p in self.bitmap.pixels_mut() {
            *p = bg;
        }
        self.stroke = None;
    }

    /// Start a stroke at a surface-local point. No-op if already drawing.
    pub fn begin_stroke(&mut self, point: Vec2) {
        if self.stroke.is_some() {
            return;
        }
        self.stroke = Some(ActiveStroke {
            last: point,
            radius: self.brush.width() as f32 / 2.0,
            color: Rgb(self.brush.color(self.foreground, self.background)),
        });
    }

    /// Render a segment from the previous point. No-op if not drawing.
    pub fn extend_stroke(&mut self, point: Vec2) {
        let Some(stroke) = self.stroke else {
            return;
        };
        self.paint_segment(stroke.last, point, stroke.radius, stroke.color);
        if let Some(active) = self.stroke.as_mut() {
            active.last = point;
        }
    }

    pub fn end_stroke(&mut self) {
        self.stroke = None;
    }

    /// Apply a pointer event given where the surface sits in the viewport
    pub fn handle_pointer(&mut self, event: PointerEvent, rect: &SurfaceRect) -> InputDisposition {
        match event {
            PointerEvent::Down(p) => self.begin_stroke(rect.to_local(p)),
            PointerEvent::Move(p) => self.extend_stroke(rect.to_local(p)),
            PointerEvent::Up | PointerEvent::Leave => self.end_stroke(),
        }
        InputDisposition::Default
    }

    /// Touch is treated as pointer input on the primary contact.
    /// Default scroll/zoom handling is always suppressed.
    pub fn handle_touch(&mut self, event: &TouchEvent, rect: &SurfaceRect) -> InputDisposition {
        if let Some(pointer) = event.to_pointer() {
            self.handle_pointer(pointer, rect);
        }
        InputDisposition::PreventDefault
    }

    /// Clear to background, then draw `image` scaled to fit and centered
    pub fn composite_image(&mut self, image: &DynamicImage) -> Placement {
        self.reset();
        let (src_w, src_h) = image.dimensions();
        if src_w == 0 || src_h == 0 {
            return Placement { x: 0, y: 0, width: 0, height: 0 };
        }

        let (w, h) = (self.width(), self.height());
        let scale = (w as f32 / src_w as f32).min(h as f32 / src_h as f32);
        let dst_w = ((src_w as f32 * scale).round() as u32).clamp(1, w);
        let dst_h = ((src_h as f32 * scale).round() as u32).clamp(1, h);
        let x = (w - dst_w) / 2;
        let y = (h - dst_h) / 2;

        let scaled = imageops::resize(&image.to_rgba8(), dst_w, dst_h, FilterType::Triangle);
        let [r, g, b] = self.background;
        let mut canvas = RgbaImage::from_pixel(w, h, Rgba([r, g, b, 0xFF]));
        imageops::overlay(&mut canvas, &scaled, x as i64, y as i64);
        self.bitmap = DynamicImage::ImageRgba8(canvas).into_rgb8();

        log::debug!("Composited {src_w}x{src_h} image at ({x},{y}) as {dst_w}x{dst_h}");
        Placement { x, y, width: dst_w, height: dst_h }
    }

    /// Decode image bytes, or `data:` URI text, and composite them.
    /// On decode failure the bitmap is left untouched.
    pub fn composite_encoded(&mut self, bytes: &[u8]) -> Result<Placement, SurfaceError> {
        let raw;
        let bytes = if bytes.starts_with(b"data:") {
            let uri = std::str::from_utf8(bytes).map_err(|e| SurfaceError::Decode(e.to_string()))?;
            raw = decode_data_uri(uri.trim())?;
            raw.as_slice()
        } else {
            bytes
        };
        let image = image::load_from_memory(bytes).map_err(|e| SurfaceError::Decode(e.to_string()))?;
        Ok(self.composite_image(&image))
    }

    /// PNG bytes of the current bitmap
    pub fn export_png(&self) -> Result<Vec<u8>, SurfaceError> {
        let mut cursor = std::io::Cursor::new(Vec::new());
        self.bitmap
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| SurfaceError::Encode(e.to_string()))?;
        Ok(cursor.into_inner())
    }

    /// The bitmap as a PNG data URI, the payload sent to the classifier
    pub fn export_encoded(&self) -> Result<String, SurfaceError> {
        self.export_png().map(|png| encode_data_uri(&png))
    }

    /// Write the bitmap as a PNG file
    pub fn save_png(&self, path: &Path) -> Result<(), SurfaceError> {
        let png = self.export_png()?;
        std::fs::write(path, png)?;
        Ok(())
    }

    /// Copy into a 0x00RRGGBB buffer (window presentation)
    pub fn blit_argb(&self, dst: &mut [u32], dst_width: usize, origin: (usize, usize)) {
        let (ox, oy) = origin;
        for (x, y, p) in self.bitmap.enumerate_pixels() {
            let (dx, dy) = (ox + x as usize, oy + y as usize);
            if dx >= dst_width {
                continue;
            }
            let idx = dy * dst_width + dx;
            if let Some(slot) = dst.get_mut(idx) {
                let [r, g, b] = p.0;
                *slot = (r as u32) << 16 | (g as u32) << 8 | b as u32;
            }
        }
    }

    /// Fill every pixel whose center lies within `radius` of segment a-b
    fn paint_segment(&mut self, a: Vec2, b: Vec2, radius: f32, color: Rgb<u8>) {
        let (w, h) = (self.width() as f32, self.height() as f32);
        let min = (a.min(b) - Vec2::splat(radius)).floor().max(Vec2::ZERO);
        let max = (a.max(b) + Vec2::splat(radius)).ceil().min(Vec2::new(w, h));
        if min.x >= max.x || min.y >= max.y {
            return;
        }

        for y in min.y as u32..max.y as u32 {
            for x in min.x as u32..max.x as u32 {
                let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                if distance_to_segment(center, a, b) <= radius + COVERAGE_EPSILON {
                    self.bitmap.put_pixel(x, y, color);
                }
            }
        }
    }
}

#[inline]
fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len2 = ab.length_squared();
    let t = if len2 == 0.0 {
        0.0
    } else {
        ((p - a).dot(ab) / len2).clamp(0.0, 1.0)
    };
    (a + ab * t).distance(p)
}
