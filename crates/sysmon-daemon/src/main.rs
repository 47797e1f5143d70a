//! sysmond - adaptive host metrics monitor
//!
//! The daemon provides:
//! - Live polling of CPU, memory, disk and network metrics
//! - Self-calibrating anomaly classification per metric
//! - Short-horizon high-load forecasts
//! - Anomaly event log export and profiling captures

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sysmon_daemon::config::{DaemonConfig, SourceKind};
use sysmon_daemon::error::{DaemonError, DaemonResult};
use sysmon_daemon::monitor::{Monitor, StopReason};
use sysmon_daemon::signal::shutdown_signal;

/// sysmond CLI
#[derive(Parser)]
#[command(name = "sysmond")]
#[command(about = "Adaptive anomaly detection and load forecasting for host metrics", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "SYSMON_CONFIG")]
    config: Option<String>,

    /// Log level (overrides the configuration file)
    #[arg(long, env = "SYSMON_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "SYSMON_LOG_JSON")]
    json: bool,

    /// Polling period in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Stop after this many ticks
    #[arg(long)]
    ticks: Option<u64>,

    /// Comma-separated metric allow-list
    #[arg(long, value_delimiter = ',')]
    metrics: Vec<String>,

    /// Export the anomaly event log here on exit
    #[arg(long)]
    export: Option<PathBuf>,

    /// Export the weekday × hour anomaly heatmap here on exit
    #[arg(long)]
    export_heatmap: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Poll live host metrics (default)
    Run,

    /// Evaluate a recorded profiling capture
    Replay {
        /// Capture file written by `profile`
        path: PathBuf,
    },

    /// Record a profiling capture while monitoring, then exit
    Profile {
        /// Capture length in seconds
        #[arg(long)]
        duration: Option<u64>,

        /// Output directory
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = DaemonConfig::load(cli.config.as_deref())
        .map_err(|e| DaemonError::Config(e.to_string()))?;

    // Initialize tracing
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into());

    if cli.json || config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // Override with CLI args
    if let Some(ms) = cli.interval_ms {
        config.engine.poll_interval_ms = ms;
    }
    if cli.ticks.is_some() {
        config.monitor.max_ticks = cli.ticks;
    }
    if !cli.metrics.is_empty() {
        config.monitor.metrics = cli.metrics.clone();
    }
    if cli.export.is_some() {
        config.journal.export_path = cli.export.clone();
    }
    if cli.export_heatmap.is_some() {
        config.journal.heatmap_path = cli.export_heatmap.clone();
    }

    let mut profile_mode = false;
    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {}
        Command::Replay { path } => {
            config.monitor.source = SourceKind::Replay;
            config.monitor.replay_path = Some(path);
        }
        Command::Profile { duration, output } => {
            if let Some(secs) = duration {
                config.profile.duration_secs = secs;
            }
            if output.is_some() {
                config.profile.output_dir = output;
            }
            profile_mode = true;
        }
    }

    println!(
        r#"
  sysmond {}
  Source:   {:?}
  Period:   {} ms
  Window:   {} samples (warm-up {})
  Forecast: threshold {} within {} minutes
"#,
        env!("CARGO_PKG_VERSION"),
        config.monitor.source,
        config.engine.poll_interval_ms,
        config.engine.detector.window_capacity,
        config.engine.detector.min_samples,
        config.engine.forecast.threshold,
        config.engine.forecast.horizon_minutes,
    );

    let mut monitor = Monitor::from_config(&config)?;
    if profile_mode {
        monitor.start_profiling(true);
    }

    let reason = monitor.run(shutdown_signal()).await?;
    if reason == StopReason::Shutdown {
        tracing::info!("sysmond shutting down");
    }

    if let Some(path) = &config.journal.export_path {
        if let Err(e) = monitor.export_journal(path) {
            tracing::error!(error = %e, path = %path.display(), "Event log export failed");
        }
    }
    if let Some(path) = &config.journal.heatmap_path {
        if let Err(e) = monitor.export_heatmap(path) {
            tracing::error!(error = %e, path = %path.display(), "Heatmap export failed");
        }
    }

    Ok(())
}
