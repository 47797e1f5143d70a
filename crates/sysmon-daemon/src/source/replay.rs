//! Replays a saved profiling capture, one snapshot per poll.

use std::collections::VecDeque;
use std::path::Path;

use async_trait::async_trait;

use super::{MetricsSource, RawSample};
use crate::error::{DaemonError, DaemonResult};
use crate::profile::{load_snapshots, ProfileSnapshot};

pub struct ReplaySource {
    name: String,
    remaining: VecDeque<ProfileSnapshot>,
}

impl ReplaySource {
    /// Load a capture written by [`crate::profile::ProfileRecorder`].
    pub fn open(path: &Path) -> DaemonResult<Self> {
        let snapshots = load_snapshots(path).map_err(|e| {
            DaemonError::Source(format!("cannot read replay file {}: {}", path.display(), e))
        })?;
        tracing::info!(
            path = %path.display(),
            snapshots = snapshots.len(),
            "Replay source loaded"
        );
        Ok(Self::from_snapshots(snapshots))
    }

    pub fn from_snapshots(snapshots: Vec<ProfileSnapshot>) -> Self {
        Self {
            name: "replay".to_string(),
            remaining: snapshots.into(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }
}

#[async_trait]
impl MetricsSource for ReplaySource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn collect(&mut self) -> DaemonResult<Vec<RawSample>> {
        let Some(snapshot) = self.remaining.pop_front() else {
            return Ok(Vec::new());
        };
        Ok(snapshot
            .metrics
            .into_iter()
            .map(|(metric, reading)| RawSample::new(metric, reading.value, reading.unit))
            .collect())
    }

    fn is_exhausted(&self) -> bool {
        self.remaining.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::save_snapshots;
    use chrono::Utc;

    fn snapshot(cpu: f64) -> ProfileSnapshot {
        ProfileSnapshot::from_samples(
            Utc::now(),
            &[
                RawSample::new("cpu", cpu, "%"),
                RawSample::new("ram", 40.0, "%"),
            ],
        )
    }

    #[tokio::test]
    async fn test_replays_in_order_then_exhausts() {
        let mut source = ReplaySource::from_snapshots(vec![snapshot(1.0), snapshot(2.0)]);
        assert!(!source.is_exhausted());

        let first = source.collect().await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].metric.as_str(), "cpu");
        assert_eq!(first[0].value, 1.0);

        let second = source.collect().await.unwrap();
        assert_eq!(second[0].value, 2.0);
        assert!(source.is_exhausted());
        assert!(source.collect().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_reads_saved_capture() {
        let path = std::env::temp_dir().join(format!("sysmon-replay-{}.json", uuid::Uuid::new_v4()));
        save_snapshots(&path, &[snapshot(5.0), snapshot(6.0), snapshot(7.0)]).unwrap();

        let source = ReplaySource::open(&path).unwrap();
        assert_eq!(source.remaining(), 3);
        assert_eq!(source.name(), "replay");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_source_error() {
        let path = std::env::temp_dir().join(format!("sysmon-missing-{}.json", uuid::Uuid::new_v4()));
        assert!(matches!(ReplaySource::open(&path), Err(DaemonError::Source(_))));
    }
}
