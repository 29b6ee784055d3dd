//! Per-camera rendering: frame, detection boxes and density overlay

use crate::canvas::Canvas;
use crate::heatmap::{draw_density, HeatmapStyle};
use crowd_monitor_shared::{AreaSnapshot, CrowdMonitorError, Detection, MonitorResult};

/// Stroke width of detection boxes in pixels
pub const BOX_LINE_WIDTH: f32 = 2.0;
/// Distance between a box's top edge and its label baseline
pub const LABEL_OFFSET: f32 = 4.0;

/// Result of rendering one camera
#[derive(Debug, Clone)]
pub enum CameraView {
    /// The snapshot carries no frame
    NoSignal,
    Frame(Canvas),
}

impl CameraView {
    pub fn canvas(&self) -> Option<&Canvas> {
        match self {
            CameraView::NoSignal => None,
            CameraView::Frame(canvas) => Some(canvas),
        }
    }
}

/// Render a snapshot from scratch. Nothing from a previous render survives.
pub fn render_area(area: &AreaSnapshot) -> MonitorResult<CameraView> {
    let Some(bytes) = area.frame_bytes()? else {
        return Ok(CameraView::NoSignal);
    };

    let frame = image::load_from_memory(&bytes).map_err(|e| CrowdMonitorError::FrameDecode {
        camera_index: area.camera_index,
        message: e.to_string(),
    })?;

    // The surface takes the frame's native resolution
    let mut canvas = Canvas::from_image(frame.to_rgba8());

    let color = area.status.color();
    for detection in &area.detections {
        draw_detection(&mut canvas, detection, color);
    }

    if let Some(grid) = area.density_grid.as_deref() {
        if !grid.is_empty() {
            if !area.density_is_rectangular() {
                log::warn!(
                    "Camera {} sent a ragged density grid, extra cells ignored",
                    area.camera_index
                );
            }
            draw_density(&mut canvas, grid, HeatmapStyle::CAMERA_OVERLAY);
        }
    }

    Ok(CameraView::Frame(canvas))
}

fn draw_detection(canvas: &mut Canvas, detection: &Detection, color: [u8; 3]) {
    canvas.stroke_rect(detection.bbox, color, BOX_LINE_WIDTH);

    if detection.is_tracked() {
        let [x1, y1, _, _] = detection.bbox;
        let label = format!("#{}", detection.track_id);
        canvas.draw_text(
            x1.round() as i64,
            (y1 - LABEL_OFFSET).round() as i64,
            &label,
            color,
        );
    }
}
