pub mod config;
pub mod output;
pub mod panels;

pub use config::Config;
pub use output::{FrameWriter, WrittenViews};

use crowd_monitor_data::{DashboardSession, DashboardStore, StoreEvent};
use crowd_monitor_shared::{area_cards, AreaSnapshot, AreaStatus};
use std::collections::HashMap;
use std::future::Future;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

/// Presents a mounted dashboard: renders every snapshot to disk and logs
/// the panels as the store changes
pub struct Monitor {
    writer: FrameWriter,
    last_status: HashMap<u32, AreaStatus>,
}

impl Monitor {
    pub fn new(writer: FrameWriter) -> Self {
        Self {
            writer,
            last_status: HashMap::new(),
        }
    }

    /// Mount a session and present it until `shutdown` resolves, then tear
    /// the session down
    pub async fn run<F>(mut self, config: &Config, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()>,
    {
        let session = DashboardSession::mount(config.session_settings()).await?;
        info!(
            "Monitoring {} (frames in {})",
            config.server_url,
            self.writer.dir().display()
        );

        let mut events = session.store().subscribe();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Ok(event) => self.handle_event(session.store(), event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Presentation fell behind, skipped {} updates", skipped);
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = &mut shutdown => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        session.teardown().await;
        info!("Shutdown complete");
        Ok(())
    }

    pub fn handle_event(&mut self, store: &DashboardStore, event: StoreEvent) {
        match event {
            StoreEvent::Connection(true) => info!("Connected"),
            StoreEvent::Connection(false) => warn!("Disconnected"),
            StoreEvent::AreasReplaced(areas) => self.present_areas(store, &areas),
            StoreEvent::AlertAdded(alert) => {
                warn!("ALERT {}", panels::alert_line(&alert));
                debug!("{} alerts in log", store.alerts().len());
            }
            StoreEvent::PerfSample(_) => {}
            StoreEvent::PerfStats(stats) => {
                for line in panels::perf_panel(&stats, store.perf().as_ref()) {
                    info!("{}", line);
                }
            }
            StoreEvent::ConfigReplaced(config) => {
                info!("Configuration has {} areas", config.areas.len());
            }
            StoreEvent::SaveNotice(Some(notice)) => info!("{}", panels::notice_line(&notice)),
            StoreEvent::SaveNotice(None) => {}
        }
    }

    fn present_areas(&mut self, store: &DashboardStore, areas: &[AreaSnapshot]) {
        for area in areas {
            if let Err(e) = self.writer.write_area(area) {
                error!("Failed to render camera {}: {}", area.camera_index, e);
            }
        }

        for card in area_cards(areas) {
            let changed = self.last_status.insert(card.camera_index, card.status) != Some(card.status);
            if changed {
                info!("{}", panels::status_card(&card));
            } else {
                debug!("{}", panels::status_card(&card));
            }
        }
        self.last_status
            .retain(|index, _| areas.iter().any(|a| a.camera_index == *index));

        debug!("{}", panels::overview_line(&store.overview()));
    }
}
