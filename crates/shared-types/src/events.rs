//! Messages pushed by the backend over `/ws`

use serde::{Deserialize, Serialize};

use crate::data_types::{Alert, AreaSnapshot};
use crate::errors::MonitorResult;
use crate::perf::PerfSample;

/// Server to client message, tagged by its `type` field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushMessage {
    FrameUpdate {
        areas: Vec<AreaSnapshot>,
        #[serde(default)]
        perf: Option<PerfSample>,
    },
    Alert(Alert),
}

impl PushMessage {
    pub fn decode(text: &str) -> MonitorResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PushMessage::FrameUpdate { .. } => "frame_update",
            PushMessage::Alert(_) => "alert",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::AreaStatus;

    #[test]
    fn test_decode_frame_update() {
        let raw = r#"{
            "type": "frame_update",
            "areas": [
                {"camera_index": 0, "name": "Lobby", "status": "NORMAL", "person_count": 4},
                {"camera_index": 1, "name": "Gate", "status": "CRITICAL", "person_count": 40}
            ],
            "perf": {"total_ms": 51.2, "detect_ms": 30.1, "track_ms": 4.0, "encode_ms": 8.3}
        }"#;

        match PushMessage::decode(raw).unwrap() {
            PushMessage::FrameUpdate { areas, perf } => {
                assert_eq!(areas.len(), 2);
                assert_eq!(areas[1].status, AreaStatus::Critical);
                assert_eq!(perf.unwrap().detect_ms, 30.1);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_decode_alert() {
        let raw = r#"{"type": "alert", "area": "Gate", "timestamp": 1700000000.5,
                      "reason": "Density above limit", "person_count": 40}"#;

        let msg = PushMessage::decode(raw).unwrap();
        assert_eq!(msg.kind(), "alert");
        match msg {
            PushMessage::Alert(alert) => {
                assert_eq!(alert.area, "Gate");
                assert_eq!(alert.person_count, 40);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_unknown_and_malformed() {
        assert!(PushMessage::decode(r#"{"type": "heartbeat"}"#).is_err());
        assert!(PushMessage::decode(r#"{"areas": []}"#).is_err());
        assert!(PushMessage::decode("not json").is_err());
    }
}
