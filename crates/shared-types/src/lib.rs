//! Shared types for the Crowd Monitor client
//!
//! This crate contains the wire model pushed and served by the monitoring
//! backend, the common error type, and the pure views derived from the
//! current snapshot set. It is shared by the data-manager, renderer and the
//! command line client.

pub mod alert_log;
pub mod area_config;
pub mod data_types;
pub mod errors;
pub mod events;
pub mod perf;
pub mod views;

pub use alert_log::{AlertLog, ALERT_LOG_CAPACITY};
pub use area_config::{AreaConfig, AreaField, ConfigUpdateResponse, MonitorConfig};
pub use data_types::{Alert, AreaSnapshot, AreaStatus, Detection};
pub use errors::{CrowdMonitorError, MonitorResult};
pub use events::PushMessage;
pub use perf::{Bottleneck, Efficiency, PerfSample, PerfStats, PipelineStats, Stage, StageStats};
pub use views::{area_cards, AreaCard, SystemOverview};
