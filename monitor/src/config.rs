use crowd_monitor_data::SessionSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_NAME: &str = "crowd-monitor";
pub const ENV_PREFIX: &str = "CROWD_MONITOR";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Backend base URL; the push channel and REST endpoints derive from it
    pub server_url: String,
    pub reconnect_delay_ms: u64,
    pub perf_poll_interval_ms: u64,
    /// Where rendered camera views are written
    pub output_dir: PathBuf,
    pub alert_sound: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8000".to_string(),
            reconnect_delay_ms: 2000,
            perf_poll_interval_ms: 3000,
            output_dir: PathBuf::from("./frames"),
            alert_sound: true,
        }
    }
}

impl Config {
    /// Defaults, then `path`, then `CROWD_MONITOR_*` variables
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(config::File::from(path))
            .add_source(Self::environment())
            .build()?;

        Self::checked(settings.try_deserialize()?)
    }

    /// Defaults, then an optional `crowd-monitor.{yaml,toml,json}` in the
    /// working directory, then `CROWD_MONITOR_*` variables
    pub fn from_env() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(config::File::with_name(DEFAULT_CONFIG_NAME).required(false))
            .add_source(Self::environment())
            .build()?;

        Self::checked(settings.try_deserialize()?)
    }

    fn checked(config: Config) -> anyhow::Result<Self> {
        config.session_settings().validate()?;
        Ok(config)
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX).try_parsing(true)
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            server_url: self.server_url.clone(),
            reconnect_delay: Duration::from_millis(self.reconnect_delay_ms),
            perf_poll_interval: Duration::from_millis(self.perf_poll_interval_ms),
            alert_sound: self.alert_sound,
        }
    }
}
