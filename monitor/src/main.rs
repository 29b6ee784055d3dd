use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use crowd_monitor::{panels, Config, FrameWriter, Monitor};
use crowd_monitor_data::{
    BackendEndpoints, ConfigApi, ConfigClient, ConfigEditor, ConfigService, DashboardStore,
    PerfPoller,
};
use crowd_monitor_shared::{AreaField, CrowdMonitorError};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "crowd-monitor")]
#[command(about = "Live client for the crowd monitoring backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Backend base URL, overrides the config file
    #[arg(short, long, value_name = "URL")]
    server: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Follow the live feed and render every camera
    Run {
        /// Directory for cam_<index>.png and density_<index>.png
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },
    /// Inspect or edit the area configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Fetch and print the pipeline statistics once
    Perf,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the current configuration as JSON
    Show,
    /// Change one field of one area and save
    Set {
        /// Position of the area in the configuration list
        #[arg(long)]
        area: usize,
        /// name, camera_index, max_count, density_limit or chaos_threshold
        #[arg(long)]
        field: String,
        #[arg(long)]
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::from_env()?,
    };
    if let Some(server) = cli.server {
        config.server_url = server;
    }

    // Everything runs on one cooperative thread
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        match cli.command {
            Some(Commands::Run { output_dir }) => run_monitor(config, output_dir).await,
            Some(Commands::Config {
                action: ConfigAction::Show,
            }) => show_config(&config).await,
            Some(Commands::Config {
                action: ConfigAction::Set { area, field, value },
            }) => set_config(&config, area, &field, &value).await,
            Some(Commands::Perf) => show_perf(&config).await,
            None => run_monitor(config, None).await,
        }
    })
}

async fn run_monitor(mut config: Config, output_dir: Option<PathBuf>) -> Result<()> {
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }

    let writer = FrameWriter::new(&config.output_dir)?;
    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
        }
    };

    Monitor::new(writer).run(&config, shutdown).await
}

fn config_service(config: &Config) -> Result<ConfigService> {
    let endpoints = BackendEndpoints::new(&config.server_url)?;
    let api: Arc<dyn ConfigApi> = Arc::new(ConfigClient::new(endpoints.config()));
    Ok(ConfigService::new(api, DashboardStore::new()))
}

async fn show_config(config: &Config) -> Result<()> {
    let service = config_service(config)?;
    service.fetch_config().await;

    let Some(current) = service.store().config() else {
        bail!("Could not load configuration from {}", config.server_url);
    };
    println!("{}", serde_json::to_string_pretty(&*current)?);
    Ok(())
}

async fn set_config(config: &Config, area: usize, field: &str, value: &str) -> Result<()> {
    let field: AreaField = field.parse().map_err(anyhow::Error::msg)?;

    let service = config_service(config)?;
    service.fetch_config().await;
    if service.store().config().is_none() {
        bail!("Could not load configuration from {}", config.server_url);
    }

    let store = service.store().clone();
    let mut editor = ConfigEditor::new(service);
    editor.edit(area, field, value)?;
    let response = editor.save().await?;

    if let Some(notice) = store.save_notice() {
        println!("{}", panels::notice_line(&notice));
    }
    if !response.is_ok() {
        if let Some(message) = &response.message {
            error!("{}", message);
        }
        return Err(CrowdMonitorError::SaveRejected {
            status: response.status,
        }
        .into());
    }

    info!("Area {} updated", area);
    Ok(())
}

async fn show_perf(config: &Config) -> Result<()> {
    let endpoints = BackendEndpoints::new(&config.server_url)?;
    let poller = PerfPoller::new(
        endpoints.perf(),
        config.session_settings().perf_poll_interval,
        DashboardStore::new(),
    );

    let stats = poller.fetch().await?;
    for line in panels::perf_panel(&stats, None) {
        println!("{}", line);
    }
    Ok(())
}
