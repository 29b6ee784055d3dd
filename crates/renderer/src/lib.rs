//! Software renderer for the crowd monitor views
//!
//! Every render starts from a fresh surface: a camera view is the decoded
//! frame with the snapshot's detection boxes and density overlay drawn on
//! top, so nothing from an earlier snapshot can persist. The crate also lays
//! out the performance overlay (pipeline bar, stage cards, badges).

pub mod camera_feed;
pub mod canvas;
pub mod glyphs;
pub mod heatmap;
pub mod pipeline_bar;

pub use camera_feed::{render_area, CameraView};
pub use canvas::Canvas;
pub use heatmap::{
    density_color, draw_density, render_density_map, HeatmapStyle, DENSITY_MAP_HEIGHT,
    DENSITY_MAP_WIDTH,
};
pub use pipeline_bar::{
    pipeline_segments, stage_cards, target_badge, text_bar, BarSegment, FpsRating, StageCard,
};

use crowd_monitor_shared::AreaSnapshot;

/// Standalone density map of an area, if it reports a non-empty grid
pub fn render_area_density(area: &AreaSnapshot) -> Option<Canvas> {
    area.density_grid
        .as_deref()
        .filter(|grid| grid.first().is_some_and(|row| !row.is_empty()))
        .map(|grid| render_density_map(grid, DENSITY_MAP_WIDTH, DENSITY_MAP_HEIGHT))
}
