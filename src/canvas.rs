use bevy::color::{ColorToPacked, Srgba};
use image::{Pixel, Rgba, RgbaImage};

use crate::{
    error::{GyroidError, Result},
    types::{ScreenPoint, Value},
};

/// Something the frame renderer can draw polygons onto.
pub trait DrawingSurface {
    /// Resets the whole surface before a new frame.
    fn clear(&mut self);

    /// Draws a closed polygon, filled with `fill` when given, then outlined with `stroke`.
    /// Both are blended at `opacity`.
    fn draw_polygon(
        &mut self,
        points: &[ScreenPoint],
        stroke: Srgba,
        fill: Option<Srgba>,
        opacity: Value,
    );
}

/// An RGBA8 software canvas backed by an [`RgbaImage`].
///
/// `(0, 0)` is the top left. Clearing makes every pixel transparent; drawing
/// blends source-over.
#[derive(Clone, Debug)]
pub struct PixelCanvas {
    image: RgbaImage,
}

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

impl PixelCanvas {
    /// Returns [`GyroidError::InvalidViewport`] if either side is zero.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(GyroidError::InvalidViewport);
        }
        Ok(Self {
            image: RgbaImage::new(width, height),
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Raw RGBA8 bytes, row-major.
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// The RGBA bytes at `(x, y)`, or `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.image.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// Source-over blends `color` at `(x, y)`; pixels off the canvas are ignored.
    fn blend(&mut self, x: i32, y: i32, color: &Rgba<u8>) {
        if x < 0 || y < 0 {
            return;
        }
        if let Some(dst) = self.image.get_pixel_mut_checked(x as u32, y as u32) {
            dst.blend(color);
        }
    }

    /// Scanline fill over pixel centres using the even-odd rule.
    fn fill_polygon(&mut self, points: &[ScreenPoint], color: &Rgba<u8>) {
        if points.len() < 3 {
            return;
        }

        let (min_y, max_y) = points
            .iter()
            .fold((Value::INFINITY, Value::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.y), hi.max(p.y))
            });
        let first_row = ((min_y - 0.5).ceil() as i32).max(0);
        let last_row = ((max_y - 0.5).floor() as i32).min(self.height() as i32 - 1);

        let mut crossings: Vec<Value> = Vec::with_capacity(points.len());
        for row in first_row..=last_row {
            let yc = row as Value + 0.5;
            crossings.clear();
            for (i, a) in points.iter().enumerate() {
                let b = &points[(i + 1) % points.len()];
                if (a.y <= yc && yc < b.y) || (b.y <= yc && yc < a.y) {
                    crossings.push(a.x + (yc - a.y) * (b.x - a.x) / (b.y - a.y));
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));

            for span in crossings.chunks_exact(2) {
                let start = ((span[0] - 0.5).ceil() as i32).max(0);
                let end = ((span[1] - 0.5).ceil() as i32).min(self.width() as i32);
                for col in start..end {
                    self.blend(col, row, color);
                }
            }
        }
    }

    /// Bresenham line between the pixels containing `a` and `b`.
    fn stroke_line(&mut self, a: &ScreenPoint, b: &ScreenPoint, color: &Rgba<u8>) {
        let (mut x0, mut y0) = (a.x.floor() as i32, a.y.floor() as i32);
        let (x1, y1) = (b.x.floor() as i32, b.y.floor() as i32);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.blend(x0, y0, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }
}

/// `color` with its alpha scaled by `opacity`, as RGBA8.
#[inline]
fn to_rgba8(color: Srgba, opacity: Value) -> Rgba<u8> {
    Rgba(
        Srgba {
            alpha: (color.alpha * opacity).clamp(0.0, 1.0),
            ..color
        }
        .to_u8_array(),
    )
}

impl DrawingSurface for PixelCanvas {
    fn clear(&mut self) {
        for p in self.image.pixels_mut() {
            *p = TRANSPARENT;
        }
    }

    fn draw_polygon(
        &mut self,
        points: &[ScreenPoint],
        stroke: Srgba,
        fill: Option<Srgba>,
        opacity: Value,
    ) {
        if let Some(fill) = fill {
            self.fill_polygon(points, &to_rgba8(fill, opacity));
        }
        let stroke = to_rgba8(stroke, opacity);
        for (i, a) in points.iter().enumerate() {
            let b = &points[(i + 1) % points.len()];
            self.stroke_line(a, b, &stroke);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Srgba = Srgba::new(1.0, 0.0, 0.0, 1.0);
    const BLUE: Srgba = Srgba::new(0.0, 0.0, 1.0, 1.0);

    fn triangle() -> [ScreenPoint; 3] {
        [
            ScreenPoint::new(0.0, 0.0),
            ScreenPoint::new(10.0, 0.0),
            ScreenPoint::new(0.0, 10.0),
        ]
    }

    #[test]
    fn rejects_empty_canvas() {
        assert_eq!(
            PixelCanvas::new(0, 4).unwrap_err(),
            GyroidError::InvalidViewport
        );
    }

    #[test]
    fn fill_then_stroke() {
        let mut canvas = PixelCanvas::new(16, 16).unwrap();
        canvas.draw_polygon(&triangle(), RED, Some(BLUE), 1.0);

        assert_eq!(canvas.pixel(2, 2), Some([0, 0, 255, 255]));
        assert_eq!(canvas.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(5, 0), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(8, 8), Some([0, 0, 0, 0]));
        assert_eq!(canvas.pixel(15, 15), Some([0, 0, 0, 0]));
    }

    #[test]
    fn outline_only_leaves_interior_clear() {
        let mut canvas = PixelCanvas::new(16, 16).unwrap();
        canvas.draw_polygon(&triangle(), RED, None, 1.0);
        assert_eq!(canvas.pixel(2, 2), Some([0, 0, 0, 0]));
        assert_eq!(canvas.pixel(0, 5), Some([255, 0, 0, 255]));
    }

    #[test]
    fn opacity_accumulates() {
        let mut canvas = PixelCanvas::new(4, 4).unwrap();
        let half_red = to_rgba8(RED, 0.5);
        assert_eq!(half_red, Rgba([255, 0, 0, 128]));

        canvas.blend(1, 1, &half_red);
        let [r, g, b, a] = canvas.pixel(1, 1).unwrap();
        assert_eq!([r, g, b], [255, 0, 0]);
        assert!((127..=128).contains(&a), "alpha {a}");

        canvas.blend(1, 1, &half_red);
        let [r, g, b, a] = canvas.pixel(1, 1).unwrap();
        assert!(r >= 254 && g == 0 && b == 0, "color {r} {g} {b}");
        assert!((190..=192).contains(&a), "alpha {a}");
    }

    #[test]
    fn clear_resets_pixels() {
        let mut canvas = PixelCanvas::new(16, 16).unwrap();
        canvas.draw_polygon(&triangle(), RED, Some(BLUE), 1.0);
        canvas.clear();
        assert!(canvas.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn off_canvas_points_are_clipped() {
        let mut canvas = PixelCanvas::new(8, 8).unwrap();
        let points = [
            ScreenPoint::new(-20.0, -20.0),
            ScreenPoint::new(40.0, -20.0),
            ScreenPoint::new(-20.0, 40.0),
        ];
        canvas.draw_polygon(&points, RED, Some(BLUE), 1.0);
        assert_eq!(canvas.pixel(0, 0), Some([0, 0, 255, 255]));
        assert_eq!(canvas.pixel(8, 0), None);
    }

    #[test]
    fn pixels_are_the_image_bytes() {
        let mut canvas = PixelCanvas::new(3, 2).unwrap();
        canvas.blend(2, 1, &to_rgba8(BLUE, 1.0));
        assert_eq!(canvas.pixels().len(), 3 * 2 * 4);
        assert_eq!(&canvas.pixels()[20..24], &[0, 0, 255, 255]);
        assert_eq!(canvas.image().get_pixel(2, 1), &Rgba([0, 0, 255, 255]));
    }
}
