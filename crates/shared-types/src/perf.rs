//! Pipeline performance payloads

use serde::{Deserialize, Serialize};

/// Per-frame stage timings attached to a frame update (milliseconds)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct PerfSample {
    #[serde(default)]
    pub total_ms: f64,
    #[serde(default)]
    pub detect_ms: f64,
    #[serde(default)]
    pub track_ms: f64,
    #[serde(default)]
    pub encode_ms: f64,
}

/// Rolling avg/min/max for one stage
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct StageStats {
    #[serde(default)]
    pub avg: f64,
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub max: f64,
}

/// Rolling per-stage timings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PipelineStats {
    pub total: Option<StageStats>,
    pub capture: Option<StageStats>,
    pub detection: Option<StageStats>,
    pub tracking: Option<StageStats>,
    pub analysis: Option<StageStats>,
    pub encoding: Option<StageStats>,
    pub broadcast: Option<StageStats>,
}

/// Pipeline stages in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Capture,
    Detection,
    Tracking,
    Analysis,
    Encoding,
    Broadcast,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Capture,
        Stage::Detection,
        Stage::Tracking,
        Stage::Analysis,
        Stage::Encoding,
        Stage::Broadcast,
    ];

    /// Key used in the `pipeline` object
    pub fn key(&self) -> &'static str {
        match self {
            Stage::Capture => "capture",
            Stage::Detection => "detection",
            Stage::Tracking => "tracking",
            Stage::Analysis => "analysis",
            Stage::Encoding => "encoding",
            Stage::Broadcast => "broadcast",
        }
    }

    pub fn short_label(&self) -> &'static str {
        match self {
            Stage::Capture => "Cap",
            Stage::Detection => "Det",
            Stage::Tracking => "Trk",
            Stage::Analysis => "Ana",
            Stage::Encoding => "Enc",
            Stage::Broadcast => "Brd",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Capture => "Capture",
            Stage::Detection => "Detection",
            Stage::Tracking => "Tracking",
            Stage::Analysis => "Analysis",
            Stage::Encoding => "Encoding",
            Stage::Broadcast => "Broadcast",
        }
    }

    /// Name the backend uses when reporting this stage as the bottleneck
    pub fn bottleneck_name(&self) -> &'static str {
        match self {
            Stage::Capture => "capture",
            Stage::Detection => "detect",
            Stage::Tracking => "track",
            Stage::Analysis => "analyze",
            Stage::Encoding => "encode",
            Stage::Broadcast => "broadcast",
        }
    }
}

impl PipelineStats {
    pub fn stage(&self, stage: Stage) -> Option<&StageStats> {
        match stage {
            Stage::Capture => self.capture.as_ref(),
            Stage::Detection => self.detection.as_ref(),
            Stage::Tracking => self.tracking.as_ref(),
            Stage::Analysis => self.analysis.as_ref(),
            Stage::Encoding => self.encoding.as_ref(),
            Stage::Broadcast => self.broadcast.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Bottleneck {
    #[serde(default)]
    pub stage: String,
    #[serde(default)]
    pub avg_ms: f64,
    #[serde(default)]
    pub percent_of_total: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Efficiency {
    #[serde(default)]
    pub inference_percent: f64,
    #[serde(default)]
    pub overhead_percent: f64,
    #[serde(default)]
    pub can_sustain_target: bool,
}

/// Rolling statistics served by `GET /api/perf`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PerfStats {
    #[serde(default)]
    pub pipeline: PipelineStats,
    #[serde(default)]
    pub bottleneck: Bottleneck,
    #[serde(default)]
    pub efficiency: Efficiency,
    #[serde(default)]
    pub fps: f64,
}

impl PerfStats {
    pub fn is_bottleneck(&self, stage: Stage) -> bool {
        self.bottleneck.stage == stage.bottleneck_name()
    }
}
