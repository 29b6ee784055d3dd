//! Layout of the performance overlay: pipeline bar, stage cards and badges

use crowd_monitor_shared::{PerfStats, PipelineStats, Stage, StageStats};

/// Segments narrower than this share of the total are left out of the bar
pub const MIN_SEGMENT_PERCENT: f64 = 1.0;
/// Segments at least this wide carry their short label
pub const LABEL_MIN_PERCENT: f64 = 8.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BarSegment {
    pub stage: Stage,
    pub avg_ms: f64,
    /// Width as a percentage of the total pipeline average
    pub percent: f64,
    pub label: Option<&'static str>,
}

/// Proportional bar of stage averages over the total average. A missing or
/// zero total counts as 1 ms.
pub fn pipeline_segments(pipeline: &PipelineStats) -> Vec<BarSegment> {
    let total = pipeline
        .total
        .map(|t| t.avg)
        .filter(|avg| *avg > 0.0)
        .unwrap_or(1.0);

    Stage::ALL
        .iter()
        .filter_map(|&stage| {
            let avg_ms = pipeline.stage(stage).map_or(0.0, |s| s.avg);
            let percent = avg_ms / total * 100.0;
            if percent < MIN_SEGMENT_PERCENT {
                return None;
            }
            Some(BarSegment {
                stage,
                avg_ms,
                percent,
                label: (percent >= LABEL_MIN_PERCENT).then(|| stage.short_label()),
            })
        })
        .collect()
}

/// Render the bar as `width` character cells, each segment filled with its
/// label or the first letter of it
pub fn text_bar(segments: &[BarSegment], width: usize) -> String {
    let mut bar = String::with_capacity(width);
    for segment in segments {
        let cells = ((segment.percent / 100.0) * width as f64).round() as usize;
        if cells == 0 {
            continue;
        }
        let fill = segment.stage.short_label().chars().next().unwrap_or('#');
        let mut cell_text: Vec<char> = std::iter::repeat(fill).take(cells).collect();
        if let Some(label) = segment.label {
            if label.len() <= cells {
                let start = (cells - label.len()) / 2;
                for (offset, ch) in label.chars().enumerate() {
                    cell_text[start + offset] = ch;
                }
            }
        }
        bar.extend(cell_text);
    }
    bar.chars().take(width).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageCard {
    pub stage: Stage,
    pub stats: StageStats,
    pub is_bottleneck: bool,
}

/// Cards for the stages present in the stats, in card order
pub fn stage_cards(stats: &PerfStats) -> Vec<StageCard> {
    const CARD_ORDER: [Stage; 6] = [
        Stage::Detection,
        Stage::Tracking,
        Stage::Analysis,
        Stage::Capture,
        Stage::Encoding,
        Stage::Broadcast,
    ];

    CARD_ORDER
        .iter()
        .filter_map(|&stage| {
            stats.pipeline.stage(stage).map(|s| StageCard {
                stage,
                stats: *s,
                is_bottleneck: stats.is_bottleneck(stage),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpsRating {
    Good,
    Fair,
    Poor,
}

impl FpsRating {
    pub fn from_fps(fps: f64) -> Self {
        if fps >= 14.0 {
            FpsRating::Good
        } else if fps >= 10.0 {
            FpsRating::Fair
        } else {
            FpsRating::Poor
        }
    }
}

pub fn target_badge(stats: &PerfStats) -> &'static str {
    if stats.efficiency.can_sustain_target {
        "TARGET MET"
    } else {
        "BELOW TARGET"
    }
}
