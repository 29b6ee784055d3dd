//! RGBA pixel surface with the few primitives the overlays need

use crate::glyphs;
use image::{Rgba, RgbaImage};

/// Software canvas backed by an [`RgbaImage`]
#[derive(Debug, Clone)]
pub struct Canvas {
    pixels: RgbaImage,
}

impl Canvas {
    /// A fully transparent canvas
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    pub fn from_image(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels.get_pixel(x, y).0
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }

    /// Reset every pixel to transparent
    pub fn clear(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    /// Composite `color` at `alpha` over the pixels in `[x0, x1) x [y0, y1)`
    pub fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: [u8; 3], alpha: f32) {
        let (width, height) = (self.width() as i64, self.height() as i64);
        let (x0, x1) = (x0.clamp(0, width), x1.clamp(0, width));
        let (y0, y1) = (y0.clamp(0, height), y1.clamp(0, height));

        for y in y0..y1 {
            for x in x0..x1 {
                let pixel = self.pixels.get_pixel_mut(x as u32, y as u32);
                *pixel = blend(*pixel, color, alpha);
            }
        }
    }

    /// Stroke the outline of the box `(x1, y1)-(x2, y2)` with a line of
    /// `line_width` pixels centred on the box edges
    pub fn stroke_rect(&mut self, bbox: [f32; 4], color: [u8; 3], line_width: f32) {
        let [x1, y1, x2, y2] = bbox;
        let half = line_width / 2.0;

        let outer = [
            (x1.min(x2) - half).round() as i64,
            (y1.min(y2) - half).round() as i64,
            (x1.max(x2) + half).round() as i64,
            (y1.max(y2) + half).round() as i64,
        ];
        let inner = [
            (x1.min(x2) + half).round() as i64,
            (y1.min(y2) + half).round() as i64,
            (x1.max(x2) - half).round() as i64,
            (y1.max(y2) - half).round() as i64,
        ];

        // Top and bottom bands span the full outer width
        self.fill_rect(outer[0], outer[1], outer[2], inner[1].min(outer[3]), color, 1.0);
        self.fill_rect(outer[0], inner[3].max(outer[1]), outer[2], outer[3], color, 1.0);

        // Left and right bands between them
        if inner[1] < inner[3] {
            self.fill_rect(outer[0], inner[1], inner[0].min(outer[2]), inner[3], color, 1.0);
            self.fill_rect(inner[2].max(outer[0]), inner[1], outer[2], inner[3], color, 1.0);
        }
    }

    /// Draw text with its baseline at `baseline`, left edge at `x`
    pub fn draw_text(&mut self, x: i64, baseline: i64, text: &str, color: [u8; 3]) {
        let top = baseline - glyphs::GLYPH_HEIGHT as i64;
        let mut pen = x;

        for ch in text.chars() {
            if let Some(rows) = glyphs::glyph(ch) {
                for (row, bits) in rows.iter().enumerate() {
                    for col in 0..glyphs::GLYPH_WIDTH {
                        if bits & (1 << (glyphs::GLYPH_WIDTH - 1 - col)) != 0 {
                            let px = pen + col as i64;
                            let py = top + row as i64;
                            self.fill_rect(px, py, px + 1, py + 1, color, 1.0);
                        }
                    }
                }
            } else {
                log::trace!("No glyph for {ch:?}");
            }
            pen += glyphs::ADVANCE as i64;
        }
    }
}

/// Source-over compositing of an opaque colour at `alpha`
fn blend(dst: Rgba<u8>, color: [u8; 3], alpha: f32) -> Rgba<u8> {
    let alpha = alpha.clamp(0.0, 1.0);
    if alpha >= 1.0 {
        return Rgba([color[0], color[1], color[2], 255]);
    }

    let dst_alpha = dst.0[3] as f32 / 255.0;
    let out_alpha = alpha + dst_alpha * (1.0 - alpha);
    if out_alpha <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |i: usize| {
        let src = color[i] as f32 * alpha;
        let below = dst.0[i] as f32 * dst_alpha * (1.0 - alpha);
        ((src + below) / out_alpha).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(0),
        channel(1),
        channel(2),
        (out_alpha * 255.0).round() as u8,
    ])
}
