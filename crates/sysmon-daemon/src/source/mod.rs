//! Metrics sources feeding the monitor.

mod replay;
mod system;

pub use replay::ReplaySource;
pub use system::SystemSource;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sysmon_engine::MetricKey;

use crate::config::{MonitorConfig, SourceKind};
use crate::error::{DaemonError, DaemonResult};

/// One reading handed to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub metric: MetricKey,
    pub value: f64,
    pub unit: String,
}

impl RawSample {
    pub fn new(metric: impl Into<MetricKey>, value: f64, unit: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            value,
            unit: unit.into(),
        }
    }
}

/// Produces one batch of samples per poll.
#[async_trait]
pub trait MetricsSource: Send {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Collect the current reading of every metric.
    async fn collect(&mut self) -> DaemonResult<Vec<RawSample>>;

    /// A finite source has nothing more to deliver.
    fn is_exhausted(&self) -> bool {
        false
    }
}

/// Build the source selected in the configuration.
pub fn from_config(config: &MonitorConfig) -> DaemonResult<Box<dyn MetricsSource>> {
    match config.source {
        SourceKind::System => Ok(Box::new(SystemSource::new())),
        SourceKind::Replay => {
            let path = config.replay_path.as_ref().ok_or_else(|| {
                DaemonError::Config("monitor.replay_path is required for replay".into())
            })?;
            Ok(Box::new(ReplaySource::open(path)?))
        }
    }
}
