// MIT/Apache2 License

//! A software rendering context that draws into an in-memory RGBA buffer.
//!
//! This is mostly useful for headless hosts and for checking what a scene actually looks like. Coverage is
//! binary: a pixel is painted if its center lies inside the shape, and strokes are one pixel wide.

mod store;

pub use store::*;

use crate::{
    path::{path_from_arc, path_to_lines, path_to_points},
    Color, Error, Image, RenderContext,
};
use lyon_geom::{vector, Angle, Arc, LineSegment, Point};
use lyon_path::Path;
use std::{cmp::Ordering, fmt};
use tinyvec::TinyVec;

/// An RGBA8 pixel buffer that implements [`RenderContext`].
///
/// Images are looked up in the buffer's [`BitmapStore`]. Give every buffer that should be able to draw the same
/// images a clone of the same store.
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
    fill_color: Color,
    stroke_color: Color,
    // the current path, one entry per arc
    path: Vec<Path>,
    store: BitmapStore,
}

impl PixelBuffer {
    /// Create a transparent buffer with its own, empty image store.
    #[inline]
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_store(width, height, BitmapStore::new())
    }

    /// Create a transparent buffer that draws images from `store`.
    #[inline]
    pub fn with_store(width: u32, height: u32, store: BitmapStore) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
            fill_color: Color::BLACK,
            stroke_color: Color::BLACK,
            path: Vec::new(),
            store,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn store(&self) -> &BitmapStore {
        &self.store
    }

    /// The raw RGBA bytes, row by row.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the pixel at (x, y), or `None` if it is out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let offset = self.offset(x, y);
        let mut pixel = [0; 4];
        pixel.copy_from_slice(&self.data[offset..offset + 4]);
        Some(pixel)
    }

    /// Reset every pixel to transparent.
    #[inline]
    pub fn clear(&mut self) {
        self.data.iter_mut().for_each(|b| *b = 0);
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Source-over composite `src` onto the pixel at (x, y).
    #[inline]
    fn blend(&mut self, x: u32, y: u32, src: [u8; 4]) {
        let offset = self.offset(x, y);
        let dst = &mut self.data[offset..offset + 4];

        match src[3] {
            0 => {}
            0xFF => dst.copy_from_slice(&src),
            alpha => {
                let alpha = alpha as f32 / 255.0;
                let rest = 1.0 - alpha;
                for i in 0..3 {
                    dst[i] = (src[i] as f32 * alpha + dst[i] as f32 * rest).round() as u8;
                }
                dst[3] = ((alpha + (dst[3] as f32 / 255.0) * rest) * 255.0).round() as u8;
            }
        }
    }

    /// The pixel columns in `[0, width)` whose centers lie in `[from, to)`.
    #[inline]
    fn column_span(&self, from: f32, to: f32) -> (u32, u32) {
        span(from, to, self.width)
    }

    #[inline]
    fn row_span(&self, from: f32, to: f32) -> (u32, u32) {
        span(from, to, self.height)
    }

    /// Paint a one-pixel-wide line for each segment. Pixels shared between segments are only painted once.
    fn paint_lines(&mut self, lines: impl IntoIterator<Item = LineSegment<f32>>, color: Color) {
        let mut pixels: Vec<(u32, u32)> = lines
            .into_iter()
            .flat_map(|line| rasterize_line(line, self.width, self.height))
            .collect();
        pixels.sort_unstable();
        pixels.dedup();

        let color = rgba(color);
        pixels
            .into_iter()
            .for_each(|(x, y)| self.blend(x, y, color));
    }

    /// Fill a set of polygons using the even-odd rule.
    fn paint_polygons(&mut self, polygons: &[Vec<Point<f32>>], color: Color) {
        let (min_y, max_y) = polygons
            .iter()
            .flatten()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), pt| {
                (min.min(pt.y), max.max(pt.y))
            });
        if min_y > max_y {
            return;
        }

        let color = rgba(color);
        let (top, bottom) = self.row_span(min_y, max_y);
        for y in top..bottom {
            let center = y as f32 + 0.5;
            let mut crossings: TinyVec<[f32; 8]> = TinyVec::new();

            for polygon in polygons.iter().filter(|polygon| polygon.len() > 2) {
                let next = polygon.iter().skip(1).chain(polygon.first());
                for (a, b) in polygon.iter().zip(next) {
                    if (a.y <= center) != (b.y <= center) {
                        crossings.push(a.x + (center - a.y) * (b.x - a.x) / (b.y - a.y));
                    }
                }
            }

            crossings.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
            for pair in crossings.chunks_exact(2) {
                let (left, right) = self.column_span(pair[0], pair[1]);
                for x in left..right {
                    self.blend(x, y, color);
                }
            }
        }
    }
}

/// The pixel indices in `[0, limit)` whose centers lie in `[from, to)`.
#[inline]
fn span(from: f32, to: f32, limit: u32) -> (u32, u32) {
    let clamp = |f: f32| (f - 0.5).ceil().max(0.0).min(limit as f32) as u32;
    (clamp(from), clamp(to))
}

/// Flip a rectangle with negative sizes so that its size is positive.
#[inline]
fn normalize(x: f32, y: f32, width: f32, height: f32) -> (f32, f32, f32, f32) {
    let (x, width) = if width < 0.0 { (x + width, -width) } else { (x, width) };
    let (y, height) = if height < 0.0 {
        (y + height, -height)
    } else {
        (y, height)
    };
    (x, y, width, height)
}

#[inline]
fn rgba(color: Color) -> [u8; 4] {
    let (r, g, b, a) = color.clamp_u8();
    [r, g, b, a]
}

/// Clip a segment to the `[0, width] x [0, height]` box (Liang-Barsky). Done in `f64` so that segments far
/// larger than the buffer keep their on-screen part intact.
fn clip_line(line: LineSegment<f32>, width: u32, height: u32) -> Option<LineSegment<f32>> {
    let (x0, y0) = (line.from.x as f64, line.from.y as f64);
    let (dx, dy) = (line.to.x as f64 - x0, line.to.y as f64 - y0);
    let (mut enter, mut exit) = (0.0f64, 1.0f64);

    let edges = [
        (-dx, x0),
        (dx, width as f64 - x0),
        (-dy, y0),
        (dy, height as f64 - y0),
    ];
    for &(p, q) in edges.iter() {
        if p == 0.0 {
            // parallel to this edge
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                enter = enter.max(r);
            } else {
                exit = exit.min(r);
            }
        }
    }

    if !(enter <= exit) {
        return None;
    }

    let at = |t: f64| Point::new((x0 + dx * t) as f32, (y0 + dy * t) as f32);
    Some(LineSegment {
        from: at(enter),
        to: at(exit),
    })
}

/// Walk a line segment and collect the in-bounds pixels it passes through.
fn rasterize_line(line: LineSegment<f32>, width: u32, height: u32) -> Vec<(u32, u32)> {
    let line = match clip_line(line, width, height) {
        Some(line) => line,
        None => return Vec::new(),
    };
    let delta = line.to - line.from;
    let steps = delta.x.abs().max(delta.y.abs()).ceil().max(1.0);
    if !steps.is_finite() {
        return Vec::new();
    }

    let steps = steps as u32;
    (0..=steps)
        .map(|i| line.from + delta * (i as f32 / steps as f32))
        .filter_map(|pt| {
            let (x, y) = (pt.x.floor(), pt.y.floor());
            if x >= 0.0 && y >= 0.0 && x < width as f32 && y < height as f32 {
                Some((x as u32, y as u32))
            } else {
                None
            }
        })
        .collect()
}

impl RenderContext for PixelBuffer {
    #[inline]
    fn set_fill_color(&mut self, color: Color) -> crate::Result {
        self.fill_color = color;
        Ok(())
    }

    #[inline]
    fn set_stroke_color(&mut self, color: Color) -> crate::Result {
        self.stroke_color = color;
        Ok(())
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> crate::Result {
        let (x, y, width, height) = normalize(x, y, width, height);
        let (left, right) = self.column_span(x, x + width);
        let (top, bottom) = self.row_span(y, y + height);
        let color = rgba(self.fill_color);

        for py in top..bottom {
            for px in left..right {
                self.blend(px, py, color);
            }
        }

        Ok(())
    }

    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> crate::Result {
        let (x, y, width, height) = normalize(x, y, width, height);
        let corners = [
            Point::new(x, y),
            Point::new(x + width, y),
            Point::new(x + width, y + height),
            Point::new(x, y + height),
        ];
        let lines = (0..4).map(|i| LineSegment {
            from: corners[i],
            to: corners[(i + 1) % 4],
        });

        self.paint_lines(lines, self.stroke_color);
        Ok(())
    }

    #[inline]
    fn begin_path(&mut self) -> crate::Result {
        self.path.clear();
        Ok(())
    }

    fn arc(
        &mut self,
        x: f32,
        y: f32,
        radius: f32,
        start: Angle<f32>,
        end: Angle<f32>,
    ) -> crate::Result {
        let sweep = end - start;
        if approx::abs_diff_eq!(sweep.radians, 0.0) || !(radius.is_finite() && radius > 0.0) {
            log::trace!("Ignoring empty arc at ({}, {})", x, y);
            return Ok(());
        }

        self.path.push(path_from_arc(Arc {
            center: Point::new(x, y),
            radii: vector(radius, radius),
            start_angle: start,
            sweep_angle: sweep,
            x_rotation: Angle::zero(),
        }));
        Ok(())
    }

    fn fill(&mut self) -> crate::Result {
        let polygons: Vec<Vec<Point<f32>>> = self
            .path
            .iter()
            .map(|path| path_to_points(path.iter()).collect())
            .collect();

        self.paint_polygons(&polygons, self.fill_color);
        Ok(())
    }

    fn stroke(&mut self) -> crate::Result {
        let lines: Vec<LineSegment<f32>> = self
            .path
            .iter()
            .flat_map(|path| path_to_lines(path.iter()))
            .collect();

        self.paint_lines(lines, self.stroke_color);
        Ok(())
    }

    fn draw_image(
        &mut self,
        image: Image,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> crate::Result {
        let bitmap = self.store.bitmap(image)?;
        if bitmap.width == 0 || bitmap.height == 0 {
            return Ok(());
        }

        let (x, y, width, height) = normalize(x, y, width, height);
        let (left, right) = self.column_span(x, x + width);
        let (top, bottom) = self.row_span(y, y + height);

        // nearest neighbor
        let sample = |at: f32, origin: f32, extent: f32, size: u32| {
            let t = (at + 0.5 - origin) / extent;
            ((t * size as f32).floor().max(0.0) as u32).min(size - 1)
        };

        for py in top..bottom {
            let v = sample(py as f32, y, height, bitmap.height);
            for px in left..right {
                let u = sample(px as f32, x, width, bitmap.width);
                self.blend(px, py, bitmap.get(u, v));
            }
        }

        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> crate::Result {
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|len| len.checked_mul(4))
            .ok_or_else(|| Error::Msg(format!("{}x{} is too large for a pixel buffer", width, height)))?;

        log::trace!("Resizing pixel buffer to {}x{}", width, height);
        self.width = width;
        self.height = height;
        self.data = vec![0; len];
        Ok(())
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("fill_color", &self.fill_color)
            .field("stroke_color", &self.stroke_color)
            .field("path_len", &self.path.len())
            .finish()
    }
}
