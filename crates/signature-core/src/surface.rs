//! Signature capture surface
//!
//! A `SignaturePad` records strokes as polylines in canvas pixel space and
//! rasterizes them onto a transparent RGBA canvas on export. Strokes are drawn
//! as round-capped segments with a fixed pen width.

use crate::data_uri;
use crate::error::CompositeError;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

/// Only lossless PNG export is supported.
pub const PNG_MIME: &str = "image/png";

const INK: [u8; 3] = [0, 0, 0];

/// Capture widget contract consumed by the compositor
pub trait SignatureSource: Send + Sync {
    /// Remove every stroke from the surface
    fn clear(&self);

    /// True when no stroke has been drawn since the last clear
    fn is_empty(&self) -> bool;

    /// Export the surface as a `data:` URI in the given media type
    fn to_data_url(&self, mime: &str) -> Result<String, CompositeError>;
}

/// A point in canvas pixel coordinates (origin top-left)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One continuous pen-down movement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub points: Vec<Point>,
}

/// Raw RGBA8 raster produced from the recorded strokes
#[derive(Debug, Clone)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Raster {
    fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    /// Alpha value at (x, y)
    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        self.pixels[((y * self.width + x) * 4 + 3) as usize]
    }

    /// Blend the pen color into one pixel, keeping the strongest coverage
    fn cover(&mut self, x: u32, y: u32, color: [u8; 3], coverage: f32) {
        let idx = ((y * self.width + x) * 4) as usize;
        let alpha = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
        if alpha > self.pixels[idx + 3] {
            self.pixels[idx..idx + 3].copy_from_slice(&color);
            self.pixels[idx + 3] = alpha;
        }
    }
}

/// In-memory signature canvas
#[derive(Debug, Clone)]
pub struct SignaturePad {
    width: u32,
    height: u32,
    pen_width: f32,
    strokes: Vec<Stroke>,
}

impl SignaturePad {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pen_width: 2.5,
            strokes: Vec::new(),
        }
    }

    pub fn with_pen_width(mut self, pen_width: f32) -> Self {
        self.pen_width = pen_width;
        self
    }

    pub fn pen_width(&self) -> f32 {
        self.pen_width
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Total points across every stroke
    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(|s| s.points.len()).sum()
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    /// Start a new stroke at `point`
    pub fn begin_stroke(&mut self, point: Point) {
        self.strokes.push(Stroke {
            points: vec![point],
        });
    }

    /// Extend the current stroke, starting one if none exists
    pub fn add_point(&mut self, point: Point) {
        match self.strokes.last_mut() {
            Some(stroke) => stroke.points.push(point),
            None => self.begin_stroke(point),
        }
    }

    /// Append a complete stroke; returns false when `points` is empty
    pub fn add_stroke(&mut self, points: Vec<Point>) -> bool {
        if points.is_empty() {
            return false;
        }
        self.strokes.push(Stroke { points });
        true
    }

    /// Render all strokes onto a transparent canvas
    pub fn rasterize(&self) -> Raster {
        let mut raster = Raster::transparent(self.width, self.height);
        let radius = (self.pen_width / 2.0).max(0.5);

        for stroke in &self.strokes {
            match stroke.points.as_slice() {
                [] => {}
                [only] => self.stamp_segment(&mut raster, *only, *only, radius),
                points => {
                    for pair in points.windows(2) {
                        self.stamp_segment(&mut raster, pair[0], pair[1], radius);
                    }
                }
            }
        }

        raster
    }

    /// Encode the rendered canvas as an 8-bit RGBA PNG
    pub fn to_png(&self) -> Result<Vec<u8>, CompositeError> {
        let raster = self.rasterize();
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, raster.width, raster.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder
                .write_header()
                .map_err(|e| CompositeError::ImageEncode(e.to_string()))?;
            writer
                .write_image_data(&raster.pixels)
                .map_err(|e| CompositeError::ImageEncode(e.to_string()))?;
            writer
                .finish()
                .map_err(|e| CompositeError::ImageEncode(e.to_string()))?;
        }
        Ok(out)
    }

    pub fn to_data_url(&self, mime: &str) -> Result<String, CompositeError> {
        if mime != PNG_MIME {
            return Err(CompositeError::UnsupportedMimeType(mime.to_string()));
        }
        let png = self.to_png()?;
        Ok(data_uri::encode(PNG_MIME, &png))
    }

    /// Fill every pixel within `radius` of the segment a-b
    fn stamp_segment(&self, raster: &mut Raster, a: Point, b: Point, radius: f32) {
        if self.width == 0 || self.height == 0 {
            return;
        }

        let min_x = (a.x.min(b.x) - radius - 1.0).floor().max(0.0) as u32;
        let min_y = (a.y.min(b.y) - radius - 1.0).floor().max(0.0) as u32;
        let max_x = (a.x.max(b.x) + radius + 1.0).ceil().min((self.width - 1) as f32);
        let max_y = (a.y.max(b.y) + radius + 1.0).ceil().min((self.height - 1) as f32);
        if max_x < 0.0 || max_y < 0.0 {
            return;
        }
        let (max_x, max_y) = (max_x as u32, max_y as u32);

        for py in min_y..=max_y {
            for px in min_x..=max_x {
                let center = Point::new(px as f32 + 0.5, py as f32 + 0.5);
                let distance = distance_to_segment(center, a, b);
                // One pixel of linear falloff at the pen edge
                let coverage = radius + 0.5 - distance;
                if coverage > 0.0 {
                    raster.cover(px, py, INK, coverage);
                }
            }
        }
    }
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.x + t * dx, a.y + t * dy);
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}

/// Thread-safe handle to a pad shared between an adapter and the compositor
#[derive(Debug, Clone)]
pub struct SharedSignaturePad {
    inner: Arc<Mutex<SignaturePad>>,
}

impl SharedSignaturePad {
    pub fn new(pad: SignaturePad) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pad)),
        }
    }

    /// Lock the pad for direct stroke edits
    pub fn lock(&self) -> MutexGuard<'_, SignaturePad> {
        // A panic mid-edit leaves at worst a partial stroke
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SignatureSource for SharedSignaturePad {
    fn clear(&self) {
        self.lock().clear();
    }

    fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn to_data_url(&self, mime: &str) -> Result<String, CompositeError> {
        // Snapshot so encoding does not hold the lock
        let pad = self.lock().clone();
        pad.to_data_url(mime)
    }
}
