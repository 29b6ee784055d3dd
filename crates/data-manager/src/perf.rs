//! Pipeline statistics poller

use crate::store::DashboardStore;
use crowd_monitor_shared::{map_monitor_error, MonitorResult, PerfStats};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const PERF_POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// Polls `/api/perf` on a fixed interval, independent of the push channel
#[derive(Debug, Clone)]
pub struct PerfPoller {
    client: reqwest::Client,
    url: String,
    interval: Duration,
    store: DashboardStore,
}

impl PerfPoller {
    pub fn new(url: String, interval: Duration, store: DashboardStore) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            interval,
            store,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn fetch(&self) -> MonitorResult<PerfStats> {
        let response = map_monitor_error!(
            self.client.get(&self.url).send().await,
            Network,
            format!("GET {} failed", self.url)
        )?;
        let response = map_monitor_error!(
            response.error_for_status(),
            Network,
            format!("GET {} rejected", self.url)
        )?;
        let body = map_monitor_error!(
            response.text().await,
            Network,
            format!("Failed to read body of {}", self.url)
        )?;

        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch once and replace the stats wholesale. Returns whether the store
    /// was updated; a failed poll leaves the previous stats in place.
    pub async fn poll_once(&self) -> bool {
        match self.fetch().await {
            Ok(stats) => self.store.set_perf_stats(stats),
            Err(e) if e.is_transient() => {
                log::debug!("Perf poll failed: {e}");
                false
            }
            Err(e) => {
                log::warn!("Perf poll returned unusable stats: {e}");
                false
            }
        }
    }

    /// Start polling. The first poll happens one interval after the call.
    ///
    /// The interval must be non-zero; [`crate::SessionSettings::validate`]
    /// rejects a zero interval before a session ever gets here.
    pub fn spawn(self) -> PollerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + self.interval;
            let mut ticker = tokio::time::interval_at(start, self.interval);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        tokio::select! {
                            _ = self.poll_once() => {}
                            _ = shutdown_rx.changed() => break,
                        }
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
            log::debug!("Perf poller stopped");
        });

        PollerHandle {
            task: Some(task),
            shutdown_tx,
        }
    }
}

/// Handle to a running [`PerfPoller`]
pub struct PollerHandle {
    task: Option<JoinHandle<()>>,
    shutdown_tx: watch::Sender<bool>,
}

impl PollerHandle {
    /// Cancel the timer and any outstanding request
    pub async fn stop(mut self) {
        self.shutdown_tx.send_replace(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    log::error!("Perf poller task failed: {e}");
                }
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failed_poll_is_ignored() {
        let store = DashboardStore::new();
        store.set_perf_stats(PerfStats {
            fps: 14.2,
            ..Default::default()
        });

        let poller = PerfPoller::new(
            "http://127.0.0.1:9/api/perf".to_string(),
            PERF_POLL_INTERVAL,
            store.clone(),
        );

        assert!(!poller.poll_once().await);
        assert_eq!(store.perf_stats().unwrap().fps, 14.2);
    }
}
