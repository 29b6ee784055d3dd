//! Dashboard session lifecycle
//!
//! Mounting a session opens the push channel, starts the perf poller and
//! issues the initial configuration fetch in the background, then returns
//! without waiting on any of them. Teardown closes the store first, so
//! nothing that completes afterwards (a late frame, a poll response, a
//! notice timer) can update state, then stops the channel, the poller and
//! a still pending fetch.

use crate::alert_sound::{AlertSound, Muted, SystemBeep};
use crate::config_client::{ConfigApi, ConfigClient, ConfigEditor, ConfigService};
use crate::connection::{ConnectionManager, PushHandler, RECONNECT_DELAY};
use crate::endpoints::BackendEndpoints;
use crate::perf::{PerfPoller, PollerHandle, PERF_POLL_INTERVAL};
use crate::store::DashboardStore;
use crowd_monitor_shared::{CrowdMonitorError, MonitorResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub server_url: String,
    pub reconnect_delay: Duration,
    pub perf_poll_interval: Duration,
    pub alert_sound: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8000".to_string(),
            reconnect_delay: RECONNECT_DELAY,
            perf_poll_interval: PERF_POLL_INTERVAL,
            alert_sound: true,
        }
    }
}

impl SessionSettings {
    pub fn validate(&self) -> MonitorResult<()> {
        if self.perf_poll_interval.is_zero() {
            return Err(CrowdMonitorError::InvalidConfig {
                message: "perf poll interval must be greater than zero".to_string(),
                field: Some("perf_poll_interval_ms".to_string()),
            });
        }
        Ok(())
    }
}

/// A mounted dashboard
pub struct DashboardSession {
    store: DashboardStore,
    config: ConfigService,
    connection: ConnectionManager,
    poller: Option<PollerHandle>,
    initial_fetch: Option<JoinHandle<()>>,
}

impl DashboardSession {
    /// Mount against the configured backend
    pub async fn mount(settings: SessionSettings) -> MonitorResult<Self> {
        let endpoints = BackendEndpoints::new(&settings.server_url)?;
        let api = Arc::new(ConfigClient::new(endpoints.config()));
        Self::mount_with(settings, &endpoints, api).await
    }

    /// Mount with a caller-supplied configuration API
    pub async fn mount_with(
        settings: SessionSettings,
        endpoints: &BackendEndpoints,
        api: Arc<dyn ConfigApi>,
    ) -> MonitorResult<Self> {
        settings.validate()?;
        let store = DashboardStore::new();

        let sound: Arc<dyn AlertSound> = if settings.alert_sound {
            Arc::new(SystemBeep)
        } else {
            Arc::new(Muted)
        };
        let connection = ConnectionManager::new(
            endpoints.push_channel(),
            settings.reconnect_delay,
            PushHandler::new(store.clone(), sound),
        );
        connection.start();

        let poller = PerfPoller::new(endpoints.perf(), settings.perf_poll_interval, store.clone())
            .spawn();

        // Mount never waits on the config request
        let config = ConfigService::new(api, store.clone());
        let initial_fetch = tokio::spawn({
            let config = config.clone();
            async move { config.fetch_config().await }
        });

        log::info!("Dashboard mounted on {}", endpoints.push_channel());

        Ok(Self {
            store,
            config,
            connection,
            poller: Some(poller),
            initial_fetch: Some(initial_fetch),
        })
    }

    pub fn store(&self) -> &DashboardStore {
        &self.store
    }

    pub fn config(&self) -> &ConfigService {
        &self.config
    }

    pub fn editor(&self) -> ConfigEditor {
        ConfigEditor::new(self.config.clone())
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    pub async fn teardown(mut self) {
        self.store.close();
        if let Some(fetch) = self.initial_fetch.take() {
            fetch.abort();
        }
        self.connection.shutdown().await;
        if let Some(poller) = self.poller.take() {
            poller.stop().await;
        }
        log::info!("Dashboard torn down");
    }
}

impl Drop for DashboardSession {
    fn drop(&mut self) {
        if let Some(fetch) = self.initial_fetch.take() {
            fetch.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crowd_monitor_shared::{ConfigUpdateResponse, MonitorConfig};

    /// A backend whose config endpoint accepts requests and never answers
    struct Unresponsive;

    #[async_trait]
    impl ConfigApi for Unresponsive {
        async fn get_config(&self) -> MonitorResult<MonitorConfig> {
            std::future::pending().await
        }

        async fn post_config(&self, _: &MonitorConfig) -> MonitorResult<ConfigUpdateResponse> {
            std::future::pending().await
        }
    }

    fn settings() -> SessionSettings {
        SessionSettings {
            server_url: "http://127.0.0.1:9".to_string(),
            reconnect_delay: Duration::from_millis(50),
            alert_sound: false,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_hung_config_fetch_does_not_block_mount() {
        let settings = settings();
        let endpoints = BackendEndpoints::new(&settings.server_url).unwrap();

        let session = tokio::time::timeout(
            Duration::from_secs(2),
            DashboardSession::mount_with(settings, &endpoints, Arc::new(Unresponsive)),
        )
        .await
        .expect("mount waited on the config request")
        .unwrap();

        assert!(session.store().config().is_none());

        tokio::time::timeout(Duration::from_secs(2), session.teardown())
            .await
            .expect("teardown waited on the config request");
    }

    #[tokio::test]
    async fn test_zero_poll_interval_is_rejected() {
        let settings = SessionSettings {
            perf_poll_interval: Duration::ZERO,
            ..settings()
        };
        let endpoints = BackendEndpoints::new(&settings.server_url).unwrap();

        let result = DashboardSession::mount_with(settings, &endpoints, Arc::new(Unresponsive)).await;
        assert!(matches!(result, Err(CrowdMonitorError::InvalidConfig { .. })));
    }
}
