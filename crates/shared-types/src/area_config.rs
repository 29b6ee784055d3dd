//! Area configuration exchanged with `/api/config`

use serde::{Deserialize, Serialize};

/// Thresholds for one monitored camera zone
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AreaConfig {
    pub name: String,
    pub camera_index: u32,
    pub max_count: u32,
    /// Fraction of the density grid in [0, 1]
    pub density_limit: f64,
    pub chaos_threshold: f64,
}

/// The authoritative area configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MonitorConfig {
    #[serde(default)]
    pub areas: Vec<AreaConfig>,
}

/// Response body of `POST /api/config`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigUpdateResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub config: Option<MonitorConfig>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ConfigUpdateResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Editable fields of an area, as named in the settings form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaField {
    Name,
    CameraIndex,
    MaxCount,
    DensityLimit,
    ChaosThreshold,
}

impl std::str::FromStr for AreaField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(AreaField::Name),
            "camera_index" => Ok(AreaField::CameraIndex),
            "max_count" => Ok(AreaField::MaxCount),
            "density_limit" => Ok(AreaField::DensityLimit),
            "chaos_threshold" => Ok(AreaField::ChaosThreshold),
            other => Err(format!("unknown area field: {other}")),
        }
    }
}

impl AreaConfig {
    /// Apply a raw form value. Unparsable numbers fall back to the form defaults.
    pub fn apply_edit(&mut self, field: AreaField, raw: &str) {
        let raw = raw.trim();
        match field {
            AreaField::Name => self.name = raw.to_string(),
            AreaField::CameraIndex => self.camera_index = raw.parse().unwrap_or(0),
            AreaField::MaxCount => {
                self.max_count = raw.parse().ok().filter(|v| *v != 0).unwrap_or(10)
            }
            AreaField::DensityLimit => {
                let value = parse_nonzero(raw).unwrap_or(0.5);
                self.density_limit = value.clamp(0.0, 1.0);
            }
            AreaField::ChaosThreshold => {
                let value = parse_nonzero(raw).unwrap_or(2.0);
                self.chaos_threshold = value.max(0.0);
            }
        }
    }
}

fn parse_nonzero(raw: &str) -> Option<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v != 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lobby() -> AreaConfig {
        AreaConfig {
            name: "Lobby".to_string(),
            camera_index: 0,
            max_count: 20,
            density_limit: 0.6,
            chaos_threshold: 2.5,
        }
    }

    #[test]
    fn test_apply_edit_parses_values() {
        let mut area = lobby();
        area.apply_edit(AreaField::Name, " Main Hall ");
        area.apply_edit(AreaField::CameraIndex, "3");
        area.apply_edit(AreaField::MaxCount, "45");
        area.apply_edit(AreaField::DensityLimit, "0.8");
        area.apply_edit(AreaField::ChaosThreshold, "3.5");

        assert_eq!(area.name, "Main Hall");
        assert_eq!(area.camera_index, 3);
        assert_eq!(area.max_count, 45);
        assert_eq!(area.density_limit, 0.8);
        assert_eq!(area.chaos_threshold, 3.5);
    }

    #[test]
    fn test_apply_edit_fallbacks() {
        let mut area = lobby();
        area.apply_edit(AreaField::CameraIndex, "abc");
        area.apply_edit(AreaField::MaxCount, "");
        area.apply_edit(AreaField::DensityLimit, "x");
        area.apply_edit(AreaField::ChaosThreshold, "0");

        assert_eq!(area.camera_index, 0);
        assert_eq!(area.max_count, 10);
        assert_eq!(area.density_limit, 0.5);
        assert_eq!(area.chaos_threshold, 2.0);
    }

    #[test]
    fn test_apply_edit_clamps_ranges() {
        let mut area = lobby();
        area.apply_edit(AreaField::DensityLimit, "1.7");
        area.apply_edit(AreaField::ChaosThreshold, "-4");

        assert_eq!(area.density_limit, 1.0);
        assert_eq!(area.chaos_threshold, 0.0);
    }

    #[test]
    fn test_update_response_status() {
        let ok: ConfigUpdateResponse =
            serde_json::from_str(r#"{"status": "ok", "config": {"areas": []}}"#).unwrap();
        assert!(ok.is_ok());
        assert_eq!(ok.config, Some(MonitorConfig::default()));

        let err: ConfigUpdateResponse =
            serde_json::from_str(r#"{"status": "error", "message": "camera busy"}"#).unwrap();
        assert!(!err.is_ok());
        assert!(err.config.is_none());
    }

    #[test]
    fn test_field_names() {
        assert_eq!("max_count".parse::<AreaField>(), Ok(AreaField::MaxCount));
        assert!("velocity".parse::<AreaField>().is_err());
    }
}
