//! Text renditions of the dashboard panels for the log

use crowd_monitor_data::SaveNotice;
use crowd_monitor_renderer::{pipeline_segments, stage_cards, target_badge, text_bar, FpsRating};
use crowd_monitor_shared::{Alert, AreaCard, PerfSample, PerfStats, SystemOverview};

const BAR_WIDTH: usize = 50;

pub fn status_card(card: &AreaCard) -> String {
    format!(
        "CAM {} {} [{}] persons={} velocity={:.1} chaos={:.2}",
        card.camera_index,
        card.name,
        card.label,
        card.person_count,
        card.avg_velocity,
        card.chaos_index
    )
}

pub fn overview_line(overview: &SystemOverview) -> String {
    format!(
        "Active cameras: {} | Total persons: {} | Critical areas: {}",
        overview.active_cameras, overview.total_persons, overview.critical_areas
    )
}

pub fn alert_line(alert: &Alert) -> String {
    format!(
        "[{}] {}: {} ({} persons detected)",
        alert.time_of_day(),
        alert.area,
        alert.reason,
        alert.person_count
    )
}

pub fn notice_line(notice: &SaveNotice) -> String {
    if notice.is_success() {
        format!("✓ {}", notice.text)
    } else {
        format!("✗ {}", notice.text)
    }
}

fn fps_label(rating: FpsRating) -> &'static str {
    match rating {
        FpsRating::Good => "good",
        FpsRating::Fair => "fair",
        FpsRating::Poor => "poor",
    }
}

/// The performance monitor panel, one line per row
pub fn perf_panel(stats: &PerfStats, live: Option<&PerfSample>) -> Vec<String> {
    let mut lines = vec![format!(
        "FPS: {} ({}) {}",
        stats.fps,
        fps_label(FpsRating::from_fps(stats.fps)),
        target_badge(stats)
    )];

    let segments = pipeline_segments(&stats.pipeline);
    lines.push(format!("|{}|", text_bar(&segments, BAR_WIDTH)));

    for card in stage_cards(stats) {
        lines.push(format!(
            "{}{}: {}ms ({}-{}ms)",
            card.stage.label(),
            if card.is_bottleneck { "*" } else { "" },
            card.stats.avg,
            card.stats.min,
            card.stats.max
        ));
    }

    if !stats.bottleneck.stage.is_empty() {
        lines.push(format!(
            "Bottleneck: {} {}ms ({}% of total)",
            stats.bottleneck.stage, stats.bottleneck.avg_ms, stats.bottleneck.percent_of_total
        ));
    }
    lines.push(format!(
        "Efficiency: {}% inference, {}% overhead",
        stats.efficiency.inference_percent, stats.efficiency.overhead_percent
    ));

    let total = stats.pipeline.total.unwrap_or_default();
    lines.push(format!(
        "Total pipeline: {}ms (min {} / max {})",
        total.avg, total.min, total.max
    ));

    if let Some(sample) = live {
        lines.push(format!(
            "live: {}ms det: {}ms trk: {}ms enc: {}ms",
            sample.total_ms, sample.detect_ms, sample.track_ms, sample.encode_ms
        ));
    }

    lines
}
