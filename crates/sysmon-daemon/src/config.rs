//! Configuration for sysmon-daemon

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use sysmon_engine::EngineConfig;

use crate::error::{DaemonError, DaemonResult};

/// Main daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Detector, forecaster and polling cadence
    #[serde(default)]
    pub engine: EngineConfig,

    /// Metrics source selection
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Anomaly event log
    #[serde(default)]
    pub journal: JournalConfig,

    /// Profiling capture
    #[serde(default)]
    pub profile: ProfileConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where samples come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Live host metrics
    #[default]
    System,
    /// A recorded profile file
    Replay,
}

/// Monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub source: SourceKind,

    /// Profile file read by the replay source
    #[serde(default)]
    pub replay_path: Option<PathBuf>,

    /// Metric keys to evaluate; empty means all
    #[serde(default)]
    pub metrics: Vec<String>,

    /// Stop after this many ticks
    #[serde(default)]
    pub max_ticks: Option<u64>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::System,
            replay_path: None,
            metrics: Vec::new(),
            max_ticks: None,
        }
    }
}

impl MonitorConfig {
    /// Whether `metric` passes the allow-list.
    pub fn accepts(&self, metric: &str) -> bool {
        self.metrics.is_empty() || self.metrics.iter().any(|m| m == metric)
    }
}

/// Event journal configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalConfig {
    /// Maximum retained anomaly events
    #[serde(default = "default_max_events")]
    pub max_events: usize,

    /// Export the event log here on shutdown
    #[serde(default)]
    pub export_path: Option<PathBuf>,

    /// Export the weekday × hour heatmap here on shutdown
    #[serde(default)]
    pub heatmap_path: Option<PathBuf>,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            max_events: default_max_events(),
            export_path: None,
            heatmap_path: None,
        }
    }
}

/// Profiling capture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Capture length in seconds
    #[serde(default = "default_profile_duration")]
    pub duration_secs: u64,

    /// Output directory; defaults to the user data directory
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_profile_duration(),
            output_dir: None,
        }
    }
}

impl ProfileConfig {
    /// Directory profiles are written to.
    pub fn resolve_output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("sysmon")
                .join("profiles"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_max_events() -> usize {
    500
}

fn default_profile_duration() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DaemonConfig {
    /// Load configuration: defaults, then an optional file, then
    /// `SYSMON__SECTION__KEY` environment variables.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&DaemonConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("SYSMON")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Reject combinations the daemon cannot run with.
    pub fn validate(&self) -> DaemonResult<()> {
        self.engine.validate()?;
        if self.monitor.source == SourceKind::Replay && self.monitor.replay_path.is_none() {
            return Err(DaemonError::Config(
                "monitor.replay_path is required for the replay source".into(),
            ));
        }
        if self.journal.max_events == 0 {
            return Err(DaemonError::Config(
                "journal.max_events must be positive".into(),
            ));
        }
        if self.profile.duration_secs == 0 {
            return Err(DaemonError::Config(
                "profile.duration_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}
