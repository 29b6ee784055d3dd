//! Snapshot and alert types pushed by the monitoring backend

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::errors::{CrowdMonitorError, MonitorResult};

/// Backend-classified area status. Classification happens server side.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum AreaStatus {
    Normal,
    Warning,
    Critical,
    #[serde(other)]
    Offline,
}

impl AreaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AreaStatus::Normal => "NORMAL",
            AreaStatus::Warning => "WARNING",
            AreaStatus::Critical => "CRITICAL",
            AreaStatus::Offline => "OFFLINE",
        }
    }

    /// Human readable status shown on the status cards
    pub fn label(&self) -> &'static str {
        match self {
            AreaStatus::Normal => "IN CONTROL",
            AreaStatus::Warning => "CAUTION",
            AreaStatus::Critical => "NOT IN CONTROL",
            AreaStatus::Offline => "OFFLINE",
        }
    }

    /// Stroke colour for overlays (RGB)
    pub fn color(&self) -> [u8; 3] {
        match self {
            AreaStatus::Normal => [0x22, 0xc5, 0x5e],
            AreaStatus::Warning => [0xea, 0xb3, 0x08],
            AreaStatus::Critical => [0xef, 0x44, 0x44],
            AreaStatus::Offline => [0x6b, 0x72, 0x80],
        }
    }
}

impl std::fmt::Display for AreaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single detected person
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Detection {
    /// x1, y1, x2, y2 in frame pixels
    pub bbox: [f32; 4],
    #[serde(default = "untracked")]
    pub track_id: i64,
}

fn untracked() -> i64 {
    -1
}

impl Detection {
    pub fn is_tracked(&self) -> bool {
        self.track_id >= 0
    }
}

/// Complete per-area state at a point in time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AreaSnapshot {
    pub camera_index: u32,
    pub name: String,
    pub status: AreaStatus,
    #[serde(default)]
    pub person_count: u32,
    #[serde(default)]
    pub avg_velocity: f64,
    #[serde(default)]
    pub velocity_std: f64,
    /// Base64 encoded JPEG
    #[serde(default)]
    pub frame: Option<String>,
    #[serde(default)]
    pub detections: Vec<Detection>,
    #[serde(default)]
    pub density_grid: Option<Vec<Vec<f32>>>,
}

impl AreaSnapshot {
    pub fn has_frame(&self) -> bool {
        self.frame.as_deref().is_some_and(|f| !f.is_empty())
    }

    /// Decode the base64 frame payload into encoded image bytes
    pub fn frame_bytes(&self) -> MonitorResult<Option<Vec<u8>>> {
        let Some(frame) = self.frame.as_deref().filter(|f| !f.is_empty()) else {
            return Ok(None);
        };

        base64::engine::general_purpose::STANDARD
            .decode(frame)
            .map(Some)
            .map_err(|e| CrowdMonitorError::FrameDecode {
                camera_index: self.camera_index,
                message: e.to_string(),
            })
    }

    /// Grid dimensions as (rows, cols); None when absent or empty
    pub fn density_dims(&self) -> Option<(usize, usize)> {
        let grid = self.density_grid.as_ref()?;
        let rows = grid.len();
        let cols = grid.first().map_or(0, Vec::len);
        (rows > 0 && cols > 0).then_some((rows, cols))
    }

    pub fn density_is_rectangular(&self) -> bool {
        match &self.density_grid {
            Some(grid) => {
                let cols = grid.first().map_or(0, Vec::len);
                grid.iter().all(|row| row.len() == cols)
            }
            None => true,
        }
    }
}

/// Alert raised by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    pub area: String,
    /// Seconds since the unix epoch
    pub timestamp: f64,
    pub reason: String,
    #[serde(default)]
    pub person_count: u32,
}

impl Alert {
    /// Wall clock time of the alert formatted as local HH:MM:SS
    pub fn time_of_day(&self) -> String {
        let millis = (self.timestamp * 1000.0).round() as i64;
        match chrono::DateTime::from_timestamp_millis(millis) {
            Some(utc) => utc
                .with_timezone(&chrono::Local)
                .format("%H:%M:%S")
                .to_string(),
            None => "--:--:--".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_defaults() {
        let raw = r#"{
            "camera_index": 2,
            "name": "Gate B",
            "status": "WARNING",
            "person_count": 14,
            "detections": [{"bbox": [1.0, 2.0, 30.0, 40.0]}]
        }"#;

        let snapshot: AreaSnapshot = serde_json::from_str(raw).unwrap();
        assert_eq!(snapshot.status, AreaStatus::Warning);
        assert_eq!(snapshot.avg_velocity, 0.0);
        assert!(!snapshot.has_frame());
        assert_eq!(snapshot.detections[0].track_id, -1);
        assert!(!snapshot.detections[0].is_tracked());
        assert_eq!(snapshot.density_dims(), None);
    }

    #[test]
    fn test_unknown_status_is_offline() {
        let status: AreaStatus = serde_json::from_str("\"REBOOTING\"").unwrap();
        assert_eq!(status, AreaStatus::Offline);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(AreaStatus::Normal.label(), "IN CONTROL");
        assert_eq!(AreaStatus::Warning.label(), "CAUTION");
        assert_eq!(AreaStatus::Critical.label(), "NOT IN CONTROL");
        assert_eq!(AreaStatus::Offline.label(), "OFFLINE");
    }

    #[test]
    fn test_frame_bytes() {
        let mut snapshot: AreaSnapshot = serde_json::from_str(
            r#"{"camera_index": 0, "name": "Lobby", "status": "NORMAL", "frame": "/9j/"}"#,
        )
        .unwrap();
        assert_eq!(snapshot.frame_bytes().unwrap(), Some(vec![0xff, 0xd8, 0xff]));

        snapshot.frame = Some("***".to_string());
        let err = snapshot.frame_bytes().unwrap_err();
        assert!(matches!(
            err,
            CrowdMonitorError::FrameDecode { camera_index: 0, .. }
        ));

        snapshot.frame = Some(String::new());
        assert_eq!(snapshot.frame_bytes().unwrap(), None);
    }

    #[test]
    fn test_density_dims() {
        let mut snapshot: AreaSnapshot = serde_json::from_str(
            r#"{"camera_index": 0, "name": "Lobby", "status": "NORMAL",
                "density_grid": [[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]]}"#,
        )
        .unwrap();
        assert_eq!(snapshot.density_dims(), Some((2, 3)));
        assert!(snapshot.density_is_rectangular());

        snapshot.density_grid = Some(vec![vec![0.1, 0.2], vec![0.3]]);
        assert!(!snapshot.density_is_rectangular());

        snapshot.density_grid = Some(vec![]);
        assert_eq!(snapshot.density_dims(), None);
    }

    #[test]
    fn test_alert_time_of_day_shape() {
        let alert = Alert {
            area: "Lobby".to_string(),
            timestamp: 1_700_000_000.25,
            reason: "Over capacity".to_string(),
            person_count: 31,
        };

        let formatted = alert.time_of_day();
        assert_eq!(formatted.len(), 8);
        assert_eq!(formatted.matches(':').count(), 2);
    }
}
