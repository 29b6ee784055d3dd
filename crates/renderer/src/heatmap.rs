//! Density heatmap rendering

use crate::canvas::Canvas;

pub const DENSITY_MAP_WIDTH: u32 = 300;
pub const DENSITY_MAP_HEIGHT: u32 = 225;

const BLUE: [f32; 3] = [0.0, 0.0, 255.0];
const YELLOW: [f32; 3] = [255.0, 255.0, 0.0];
const RED: [f32; 3] = [255.0, 0.0, 0.0];

/// Threshold and translucency of a heatmap layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatmapStyle {
    /// Cells below this value are not drawn
    pub threshold: f32,
    pub alpha: f32,
}

impl HeatmapStyle {
    /// Overlay drawn on top of a camera frame
    pub const CAMERA_OVERLAY: HeatmapStyle = HeatmapStyle {
        threshold: 0.1,
        alpha: 0.25,
    };

    /// The standalone density map
    pub const STANDALONE: HeatmapStyle = HeatmapStyle {
        threshold: 0.05,
        alpha: 0.6,
    };
}

/// Blue to yellow below 0.5, yellow to red from 0.5 up
pub fn density_color(value: f32) -> [u8; 3] {
    let value = value.clamp(0.0, 1.0);
    let (from, to, t) = if value < 0.5 {
        (BLUE, YELLOW, value / 0.5)
    } else {
        (YELLOW, RED, (value - 0.5) / 0.5)
    };

    let lerp = |i: usize| (from[i] + (to[i] - from[i]) * t).round() as u8;
    [lerp(0), lerp(1), lerp(2)]
}

/// Fill one cell per grid entry across the whole canvas. Cell edges are
/// floored so adjacent cells tile without gaps or overlap.
pub fn draw_density(canvas: &mut Canvas, grid: &[Vec<f32>], style: HeatmapStyle) {
    let rows = grid.len();
    let cols = grid.first().map_or(0, Vec::len);
    if rows == 0 || cols == 0 {
        return;
    }

    let (width, height) = (canvas.width() as f64, canvas.height() as f64);
    let edge = |i: usize, count: usize, extent: f64| (i as f64 * extent / count as f64).floor() as i64;

    for (i, row) in grid.iter().enumerate() {
        for (j, &value) in row.iter().take(cols).enumerate() {
            if value < style.threshold {
                continue;
            }
            canvas.fill_rect(
                edge(j, cols, width),
                edge(i, rows, height),
                edge(j + 1, cols, width),
                edge(i + 1, rows, height),
                density_color(value),
                style.alpha,
            );
        }
    }
}

/// Standalone density map on a cleared, transparent canvas
pub fn render_density_map(grid: &[Vec<f32>], width: u32, height: u32) -> Canvas {
    let mut canvas = Canvas::new(width, height);
    canvas.clear();
    draw_density(&mut canvas, grid, HeatmapStyle::STANDALONE);
    canvas
}
