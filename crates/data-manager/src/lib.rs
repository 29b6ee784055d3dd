//! Data Manager crate for the Crowd Monitor client
//! Keeps the dashboard store in sync with the monitoring backend: the push
//! channel, the configuration endpoint and the performance poller.

pub mod alert_sound;
pub mod config_client;
pub mod connection;
pub mod endpoints;
pub mod perf;
pub mod session;
pub mod store;

pub use alert_sound::{AlertSound, Muted, SystemBeep, ALERT_TONE};
pub use config_client::{ConfigApi, ConfigClient, ConfigEditor, ConfigService, NOTICE_CLEAR_DELAY};
pub use connection::{
    ChannelEvent, ConnectionManager, ConnectionPhase, Effect, PushHandler, ReconnectMachine,
    RECONNECT_DELAY,
};
pub use endpoints::BackendEndpoints;
pub use perf::{PerfPoller, PollerHandle, PERF_POLL_INTERVAL};
pub use session::{DashboardSession, SessionSettings};
pub use store::{DashboardStore, NoticeKind, SaveNotice, StoreEvent};
