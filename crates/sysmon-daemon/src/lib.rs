//! sysmon daemon library
//!
//! This module provides the components around the detection engine:
//! - Metrics sources (live host metrics, recorded replays)
//! - The poll driver
//! - Anomaly event log and heatmap
//! - Profiling capture
//! - Status and forecast text

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod journal;
pub mod monitor;
pub mod profile;
pub mod render;
pub mod signal;
pub mod source;

pub use config::{DaemonConfig, JournalConfig, LoggingConfig, MonitorConfig, ProfileConfig, SourceKind};
pub use error::{DaemonError, DaemonResult};
pub use journal::{AnomalyEvent, EventLog, Heatmap};
pub use monitor::{Monitor, StopReason};
pub use profile::{ProfileRecorder, ProfileSnapshot};
pub use source::{MetricsSource, RawSample, ReplaySource, SystemSource};
