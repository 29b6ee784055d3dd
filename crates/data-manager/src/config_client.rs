//! Area configuration: REST client, store service and the settings editor

use crate::store::{DashboardStore, SaveNotice};
use async_trait::async_trait;
use crowd_monitor_shared::{
    map_monitor_error, AreaField, ConfigUpdateResponse, CrowdMonitorError, MonitorConfig,
    MonitorResult,
};
use std::sync::Arc;
use std::time::Duration;

/// How long a success notice stays visible
pub const NOTICE_CLEAR_DELAY: Duration = Duration::from_millis(2000);

/// Request/response access to `/api/config`
#[async_trait]
pub trait ConfigApi: Send + Sync {
    async fn get_config(&self) -> MonitorResult<MonitorConfig>;

    async fn post_config(&self, config: &MonitorConfig) -> MonitorResult<ConfigUpdateResponse>;
}

/// HTTP implementation of [`ConfigApi`]. Requests carry no timeout.
#[derive(Debug, Clone)]
pub struct ConfigClient {
    client: reqwest::Client,
    url: String,
}

impl ConfigClient {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ConfigApi for ConfigClient {
    async fn get_config(&self) -> MonitorResult<MonitorConfig> {
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

    async fn post_config(&self, config: &MonitorConfig) -> MonitorResult<ConfigUpdateResponse> {
        let response = map_monitor_error!(
            self.client.post(&self.url).json(config).send().await,
            Network,
            format!("POST {} failed", self.url)
        )?;
        let status = response.status();
        let body = map_monitor_error!(
            response.text().await,
            Network,
            format!("Failed to read body of {}", self.url)
        )?;

        // Error responses may still carry a {status, message} body worth surfacing
        match serde_json::from_str::<ConfigUpdateResponse>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(CrowdMonitorError::Network {
                message: format!("POST {} returned HTTP {}", self.url, status),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

/// Moves configuration between the backend and the store
#[derive(Clone)]
pub struct ConfigService {
    api: Arc<dyn ConfigApi>,
    store: DashboardStore,
}

impl ConfigService {
    pub fn new(api: Arc<dyn ConfigApi>, store: DashboardStore) -> Self {
        Self { api, store }
    }

    pub fn store(&self) -> &DashboardStore {
        &self.store
    }

    /// Load the authoritative config. Failures are logged and the previous
    /// config is kept.
    pub async fn fetch_config(&self) {
        match self.api.get_config().await {
            Ok(config) => {
                log::info!("Loaded configuration for {} areas", config.areas.len());
                self.store.set_config(config);
            }
            Err(e) => log::error!("Failed to fetch config: {e}"),
        }
    }

    /// Persist the full area list and return the raw response. A config in
    /// the response replaces the authoritative copy.
    pub async fn update_config(&self, config: &MonitorConfig) -> MonitorResult<ConfigUpdateResponse> {
        if self.store.is_closed() {
            return Err(CrowdMonitorError::Cancelled);
        }
        let response = self.api.post_config(config).await?;

        if let Some(updated) = &response.config {
            self.store.set_config(updated.clone());
        }
        if !response.is_ok() {
            log::warn!(
                "Config update returned status {:?}: {}",
                response.status,
                response.message.as_deref().unwrap_or("no message")
            );
        }
        Ok(response)
    }
}

/// Local draft of the area settings form
pub struct ConfigEditor {
    service: ConfigService,
    draft: MonitorConfig,
    clear_delay: Duration,
}

impl ConfigEditor {
    pub fn new(service: ConfigService) -> Self {
        let draft = service
            .store()
            .config()
            .map(|config| (*config).clone())
            .unwrap_or_default();

        Self {
            service,
            draft,
            clear_delay: NOTICE_CLEAR_DELAY,
        }
    }

    pub fn with_clear_delay(mut self, delay: Duration) -> Self {
        self.clear_delay = delay;
        self
    }

    pub fn draft(&self) -> &MonitorConfig {
        &self.draft
    }

    /// Discard local edits and copy the authoritative config
    pub fn reload(&mut self) {
        self.draft = self
            .service
            .store()
            .config()
            .map(|config| (*config).clone())
            .unwrap_or_default();
    }

    /// Apply a raw form value to the area at `index` (position in the list)
    pub fn edit(&mut self, index: usize, field: AreaField, raw: &str) -> MonitorResult<()> {
        let count = self.draft.areas.len();
        let area = self
            .draft
            .areas
            .get_mut(index)
            .ok_or_else(|| CrowdMonitorError::InvalidConfig {
                message: format!("no area at position {index} ({count} configured)"),
                field: None,
            })?;

        area.apply_edit(field, raw);
        Ok(())
    }

    /// Post the draft and raise the save notice. A success notice clears
    /// itself after the clear delay; a failure notice stays until replaced.
    pub async fn save(&mut self) -> MonitorResult<ConfigUpdateResponse> {
        let result = self.service.update_config(&self.draft).await;

        let store = self.service.store().clone();
        match &result {
            Ok(response) => {
                if let Some(updated) = &response.config {
                    self.draft = updated.clone();
                }

                if response.is_ok() {
                    if let Some(generation) = store.show_save_notice(SaveNotice::success()) {
                        let deadline = tokio::time::Instant::now() + self.clear_delay;
                        tokio::spawn(async move {
                            tokio::time::sleep_until(deadline).await;
                            store.clear_save_notice(generation);
                        });
                    }
                } else {
                    store.show_save_notice(SaveNotice::failure());
                }
            }
            Err(e) => {
                log::error!("Failed to save config: {e}");
                store.show_save_notice(SaveNotice::failure());
            }
        }

        result
    }
}
