//! Fixed-length profiling capture.
//!
//! A capture stores one snapshot per tick and is saved as a JSON array of
//! `{ "timestamp": .., "metrics": { key: { "value": .., "unit": .. } } }`
//! objects. [`crate::source::ReplaySource`] reads the same format.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::error::DaemonResult;
use crate::source::RawSample;

/// One metric reading inside a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileReading {
    pub value: f64,
    pub unit: String,
}

/// All readings taken in one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub timestamp: DateTime<Utc>,
    pub metrics: BTreeMap<String, ProfileReading>,
}

impl ProfileSnapshot {
    pub fn from_samples(timestamp: DateTime<Utc>, samples: &[RawSample]) -> Self {
        let metrics = samples
            .iter()
            .map(|s| {
                (
                    s.metric.to_string(),
                    ProfileReading {
                        value: s.value,
                        unit: s.unit.clone(),
                    },
                )
            })
            .collect();
        Self { timestamp, metrics }
    }
}

/// Collects snapshots for a fixed duration, then saves them.
pub struct ProfileRecorder {
    duration: Duration,
    output_dir: PathBuf,
    started: Option<Instant>,
    snapshots: Vec<ProfileSnapshot>,
}

impl ProfileRecorder {
    pub fn new(duration: Duration, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            duration,
            output_dir: output_dir.into(),
            started: None,
            snapshots: Vec::new(),
        }
    }

    /// Begin a capture. Returns `false` if one is already running.
    pub fn start(&mut self) -> bool {
        if self.started.is_some() {
            tracing::warn!("Profiling already active, ignoring start request");
            return false;
        }
        self.snapshots.clear();
        self.started = Some(Instant::now());
        tracing::info!(duration_secs = self.duration.as_secs(), "Profiling started");
        true
    }

    pub fn is_active(&self) -> bool {
        self.started.is_some()
    }

    /// The capture window has elapsed.
    pub fn is_complete(&self) -> bool {
        self.started
            .map(|started| started.elapsed() >= self.duration)
            .unwrap_or(false)
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }

    /// Append one tick's samples while a capture is running.
    pub fn record(&mut self, samples: &[RawSample]) {
        if self.started.is_none() || samples.is_empty() {
            return;
        }
        self.snapshots
            .push(ProfileSnapshot::from_samples(Utc::now(), samples));
    }

    /// Stop the capture and save it. Returns the file path, or `None` when
    /// nothing was captured.
    pub fn finish(&mut self) -> DaemonResult<Option<PathBuf>> {
        self.started = None;
        if self.snapshots.is_empty() {
            tracing::info!("Profiling finished without data");
            return Ok(None);
        }
        std::fs::create_dir_all(&self.output_dir)?;
        let name = format!(
            "sysmon_profiling_{}.json",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        );
        let path = self.output_dir.join(name);
        save_snapshots(&path, &self.snapshots)?;
        tracing::info!(
            path = %path.display(),
            snapshots = self.snapshots.len(),
            "Profiling saved"
        );
        self.snapshots.clear();
        Ok(Some(path))
    }
}

/// Save snapshots as pretty JSON.
pub fn save_snapshots(path: &Path, snapshots: &[ProfileSnapshot]) -> DaemonResult<()> {
    let json = serde_json::to_string_pretty(snapshots)?;
    write_atomic(path, json.as_bytes())
}

/// Load a saved capture.
pub fn load_snapshots(path: &Path) -> DaemonResult<Vec<ProfileSnapshot>> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// Write to a sibling `.tmp` file, then rename over `path`.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> DaemonResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
