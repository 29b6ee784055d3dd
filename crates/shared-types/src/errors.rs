//! Common error types used across all Crowd Monitor crates
//! Provides consistent error handling and reporting

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Base error type for all Crowd Monitor operations
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum CrowdMonitorError {
    // Transport errors
    #[error("Network request failed: {message}")]
    Network { message: String },

    #[error("Push channel error: {message}")]
    Channel { message: String },

    // Payload errors
    #[error("Message decode failed: {message}")]
    Decode {
        message: String,
        line: Option<usize>,
    },

    #[error("Frame decode failed for camera {camera_index}: {message}")]
    FrameDecode { camera_index: u32, message: String },

    // Configuration errors
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        message: String,
        field: Option<String>,
    },

    #[error("Configuration save rejected: {status}")]
    SaveRejected { status: String },

    // Output errors
    #[error("Audio unavailable: {message}")]
    Audio { message: String },

    #[error("Render output failed: {message}")]
    Output { message: String },

    #[error("Operation cancelled")]
    Cancelled,
}

/// Result type alias for Crowd Monitor operations
pub type MonitorResult<T> = Result<T, CrowdMonitorError>;

impl CrowdMonitorError {
    /// Transport failures are recovered automatically and never block the UI
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CrowdMonitorError::Network { .. } | CrowdMonitorError::Channel { .. }
        )
    }
}

impl From<serde_json::Error> for CrowdMonitorError {
    fn from(err: serde_json::Error) -> Self {
        CrowdMonitorError::Decode {
            message: err.to_string(),
            line: Some(err.line()),
        }
    }
}

/// Helper macro for converting foreign Results into MonitorResult
#[macro_export]
macro_rules! map_monitor_error {
    ($result:expr, $error_variant:ident, $message:expr) => {
        $result.map_err(|e| $crate::errors::CrowdMonitorError::$error_variant {
            message: format!("{}: {}", $message, e),
        })
    };
}
