//! Raw RGBA pixel canvas and the renderable figure it backs.

use std::path::Path;

use crate::font::{glyph, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::Result;

pub type Rgb = (u8, u8, u8);

pub const WHITE: Rgb = (255, 255, 255);
pub const BLACK: Rgb = (0, 0, 0);

/// An RGBA pixel buffer with just enough drawing primitives for the figures
/// this crate produces. Coordinates are signed; anything off-canvas is
/// silently clipped.
pub struct Canvas {
    width: u32,
    height: u32,
    buffer: Vec<u8>,
}

impl Canvas {
    /// A white canvas of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Canvas {
            width,
            height,
            buffer: vec![255u8; (width as usize) * (height as usize) * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_pixel(&mut self, x: i64, y: i64, (r, g, b): Rgb) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = ((y as usize) * (self.width as usize) + x as usize) * 4;
        self.buffer[idx] = r;
        self.buffer[idx + 1] = g;
        self.buffer[idx + 2] = b;
        self.buffer[idx + 3] = 255;
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        let idx = ((y as usize) * (self.width as usize) + x as usize) * 4;
        (self.buffer[idx], self.buffer[idx + 1], self.buffer[idx + 2])
    }

    pub fn fill_rect(&mut self, x: i64, y: i64, w: u32, h: u32, color: Rgb) {
        for dy in 0..h as i64 {
            for dx in 0..w as i64 {
                self.set_pixel(x + dx, y + dy, color);
            }
        }
    }

    pub fn fill_disc(&mut self, cx: i64, cy: i64, radius: f64, color: Rgb) {
        let r = radius.ceil() as i64;
        for dy in -r..=r {
            for dx in -r..=r {
                if (dx * dx + dy * dy) as f64 <= radius * radius {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// Circle outline, one pixel thick.
    pub fn stroke_circle(&mut self, cx: i64, cy: i64, radius: f64, color: Rgb) {
        let steps = (radius * 8.0).max(32.0) as usize;
        for s in 0..steps {
            let a = (s as f64 / steps as f64) * std::f64::consts::TAU;
            let x = cx + (radius * a.cos()).round() as i64;
            let y = cy + (radius * a.sin()).round() as i64;
            self.set_pixel(x, y, color);
        }
    }

    /// A straight line of the given stroke width, drawn as a swept disc.
    pub fn draw_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, width: f64, color: Rgb) {
        let (dx, dy) = (x1 - x0, y1 - y0);
        let len = (dx * dx + dy * dy).sqrt();
        let steps = len.ceil().max(1.0) as usize;
        let radius = width / 2.0;
        for s in 0..=steps {
            let t = s as f64 / steps as f64;
            let x = (x0 + dx * t).round() as i64;
            let y = (y0 + dy * t).round() as i64;
            self.fill_disc(x, y, radius, color);
        }
    }

    /// Horizontal text. `(x, y)` is the top-left corner; `scale` is an
    /// integer pixel multiplier for the 5x8 glyphs.
    pub fn draw_text(&mut self, x: i64, y: i64, text: &str, scale: u32, color: Rgb) {
        for (i, c) in text.chars().enumerate() {
            let base_x = x + (i as u32 * GLYPH_WIDTH * scale) as i64;
            self.draw_glyph(base_x, y, glyph(c), scale, color);
        }
    }

    /// Text rotated 90 degrees counter-clockwise, reading bottom-to-top.
    /// `(x, y)` is the bottom-left corner of the run.
    pub fn draw_text_up(&mut self, x: i64, y: i64, text: &str, scale: u32, color: Rgb) {
        for (i, c) in text.chars().enumerate() {
            let base_y = y - (i as u32 * GLYPH_WIDTH * scale) as i64;
            self.draw_glyph_up(x, base_y, glyph(c), scale, color);
        }
    }

    fn draw_glyph(&mut self, base_x: i64, base_y: i64, rows: &[u8; 8], scale: u32, color: Rgb) {
        for (r, &row) in rows.iter().enumerate() {
            for c in 0..8u32 {
                if (row >> (7 - c)) & 1 == 1 {
                    self.fill_rect(
                        base_x + (c * scale) as i64,
                        base_y + (r as u32 * scale) as i64,
                        scale,
                        scale,
                        color,
                    );
                }
            }
        }
    }

    fn draw_glyph_up(&mut self, base_x: i64, base_y: i64, rows: &[u8; 8], scale: u32, color: Rgb) {
        // Rotation maps glyph (col, row) to (row, -col).
        for (r, &row) in rows.iter().enumerate() {
            for c in 0..8u32 {
                if (row >> (7 - c)) & 1 == 1 {
                    self.fill_rect(
                        base_x + (r as u32 * scale) as i64,
                        base_y - ((c + 1) * scale) as i64,
                        scale,
                        scale,
                        color,
                    );
                }
            }
        }
    }

    /// Pixel width of a text run at the given scale.
    pub fn text_width(text: &str, scale: u32) -> u32 {
        text.chars().count() as u32 * GLYPH_WIDTH * scale
    }

    /// Pixel height of a text run at the given scale.
    pub fn text_height(scale: u32) -> u32 {
        GLYPH_HEIGHT * scale
    }
}

/// A rendered figure: create, configure, return. Saved as PNG (or any format
/// the `image` crate infers from the extension).
pub struct Figure {
    canvas: Canvas,
}

impl Figure {
    pub fn new(canvas: Canvas) -> Self {
        Figure { canvas }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn width(&self) -> u32 {
        self.canvas.width
    }

    pub fn height(&self) -> u32 {
        self.canvas.height
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut rgb = Vec::with_capacity((self.canvas.width * self.canvas.height * 3) as usize);
        for chunk in self.canvas.buffer.chunks(4) {
            rgb.push(chunk[0]);
            rgb.push(chunk[1]);
            rgb.push(chunk[2]);
        }
        let img = image::RgbImage::from_raw(self.canvas.width, self.canvas.height, rgb)
            .expect("buffer length matches canvas dimensions");
        img.save(path)?;
        Ok(())
    }
}
