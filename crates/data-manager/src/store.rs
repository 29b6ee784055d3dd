//! Shared dashboard state
//!
//! The store mirrors the backend state for every presentation component.
//! Each field has exactly one writer: the connection manager owns the
//! connection flag, snapshots, alerts and the live perf sample; the config
//! service owns the configuration and the save notice; the perf poller owns
//! the rolling stats. Readers get cheap clones and may subscribe to
//! [`StoreEvent`]s to re-render on change.
//!
//! Once [`DashboardStore::close`] has been called every write is refused, so
//! a late network response or timer cannot update a torn-down view.

use crowd_monitor_shared::{
    Alert, AlertLog, AreaSnapshot, MonitorConfig, PerfSample, PerfStats, SystemOverview,
};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast;

const EVENT_BUFFER: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Failure,
}

/// Transient message shown after a configuration save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveNotice {
    pub kind: NoticeKind,
    pub text: String,
}

impl SaveNotice {
    pub fn success() -> Self {
        Self {
            kind: NoticeKind::Success,
            text: "Saved successfully".to_string(),
        }
    }

    pub fn failure() -> Self {
        Self {
            kind: NoticeKind::Failure,
            text: "Failed to save".to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == NoticeKind::Success
    }
}

/// Change notifications, emitted after the write is visible to readers
#[derive(Debug, Clone)]
pub enum StoreEvent {
    Connection(bool),
    AreasReplaced(Arc<Vec<AreaSnapshot>>),
    AlertAdded(Alert),
    PerfSample(PerfSample),
    PerfStats(Arc<PerfStats>),
    ConfigReplaced(Arc<MonitorConfig>),
    SaveNotice(Option<SaveNotice>),
}

#[derive(Default)]
struct StoreInner {
    closed: bool,
    connected: bool,
    areas: Arc<Vec<AreaSnapshot>>,
    alerts: AlertLog,
    perf: Option<PerfSample>,
    perf_stats: Option<Arc<PerfStats>>,
    config: Option<Arc<MonitorConfig>>,
    save_notice: Option<SaveNotice>,
    notice_generation: u64,
}

#[derive(Clone)]
pub struct DashboardStore {
    inner: Arc<RwLock<StoreInner>>,
    events: broadcast::Sender<StoreEvent>,
}

impl std::fmt::Debug for DashboardStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardStore")
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl Default for DashboardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            inner: Arc::new(RwLock::new(StoreInner::default())),
            events,
        }
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Refuse all further writes
    pub fn close(&self) {
        self.inner.write().closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.inner.read().closed
    }

    /// Run a write under the lock unless the store is closed
    fn write<F>(&self, apply: F) -> bool
    where
        F: FnOnce(&mut StoreInner) -> StoreEvent,
    {
        let event = {
            let mut inner = self.inner.write();
            if inner.closed {
                log::trace!("Store closed, dropping update");
                return false;
            }
            apply(&mut inner)
        };

        let _ = self.events.send(event);
        true
    }

    // Connection manager writes

    pub fn set_connected(&self, connected: bool) -> bool {
        self.write(|inner| {
            inner.connected = connected;
            StoreEvent::Connection(connected)
        })
    }

    /// Replace the full snapshot set. Never merges with the previous one.
    pub fn replace_areas(&self, areas: Vec<AreaSnapshot>, perf: Option<PerfSample>) -> bool {
        let areas = Arc::new(areas);
        let applied = self.write(|inner| {
            inner.areas = Arc::clone(&areas);
            StoreEvent::AreasReplaced(areas)
        });

        if applied {
            if let Some(sample) = perf {
                self.write(|inner| {
                    inner.perf = Some(sample);
                    StoreEvent::PerfSample(sample)
                });
            }
        }
        applied
    }

    pub fn push_alert(&self, alert: Alert) -> bool {
        self.write(|inner| {
            inner.alerts.push(alert.clone());
            StoreEvent::AlertAdded(alert)
        })
    }

    // Perf poller writes

    pub fn set_perf_stats(&self, stats: PerfStats) -> bool {
        let stats = Arc::new(stats);
        self.write(|inner| {
            inner.perf_stats = Some(Arc::clone(&stats));
            StoreEvent::PerfStats(stats)
        })
    }

    // Config service writes

    pub fn set_config(&self, config: MonitorConfig) -> bool {
        let config = Arc::new(config);
        self.write(|inner| {
            inner.config = Some(Arc::clone(&config));
            StoreEvent::ConfigReplaced(config)
        })
    }

    /// Show a save notice; returns its generation for a later clear
    pub fn show_save_notice(&self, notice: SaveNotice) -> Option<u64> {
        let mut generation = None;
        self.write(|inner| {
            inner.notice_generation += 1;
            generation = Some(inner.notice_generation);
            inner.save_notice = Some(notice.clone());
            StoreEvent::SaveNotice(Some(notice))
        });
        generation
    }

    /// Clear the notice only if no newer notice replaced it
    pub fn clear_save_notice(&self, generation: u64) -> bool {
        {
            let inner = self.inner.read();
            if inner.notice_generation != generation || inner.save_notice.is_none() {
                return false;
            }
        }

        self.write(|inner| {
            if inner.notice_generation == generation {
                inner.save_notice = None;
            }
            StoreEvent::SaveNotice(inner.save_notice.clone())
        })
    }

    // Readers

    pub fn connected(&self) -> bool {
        self.inner.read().connected
    }

    pub fn areas(&self) -> Arc<Vec<AreaSnapshot>> {
        Arc::clone(&self.inner.read().areas)
    }

    pub fn area(&self, camera_index: u32) -> Option<AreaSnapshot> {
        self.inner
            .read()
            .areas
            .iter()
            .find(|a| a.camera_index == camera_index)
            .cloned()
    }

    pub fn alerts(&self) -> AlertLog {
        self.inner.read().alerts.clone()
    }

    pub fn perf(&self) -> Option<PerfSample> {
        self.inner.read().perf
    }

    pub fn perf_stats(&self) -> Option<Arc<PerfStats>> {
        self.inner.read().perf_stats.clone()
    }

    pub fn config(&self) -> Option<Arc<MonitorConfig>> {
        self.inner.read().config.clone()
    }

    pub fn save_notice(&self) -> Option<SaveNotice> {
        self.inner.read().save_notice.clone()
    }

    pub fn overview(&self) -> SystemOverview {
        SystemOverview::from_areas(&self.inner.read().areas)
    }
}
