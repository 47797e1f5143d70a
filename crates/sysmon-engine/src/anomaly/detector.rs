//! Self-calibrating z-score detector.
//!
//! Each metric's own trailing window is its baseline, so a disk that normally
//! sits near 90% does not alert forever while a metric that normally idles
//! near 5% alerts on a modest excursion.

use std::collections::HashMap;

use chrono::Utc;
use tracing::debug;

use crate::config::DetectorConfig;
use crate::error::{ensure_finite, EngineError, EngineResult};
use crate::window::RollingWindow;

use super::types::{HealthState, MetricKey, MetricStatus};

/// Map a z-score onto OK / WARN / ALERT.
///
/// `|z| < warn` is OK, `warn <= |z| < alert` is WARN, `|z| >= alert` is ALERT.
pub fn classify_z(z: f64, warn_factor: f64, alert_factor: f64) -> HealthState {
    let magnitude = z.abs();
    if magnitude >= alert_factor {
        HealthState::Alert
    } else if magnitude >= warn_factor {
        HealthState::Warn
    } else {
        HealthState::Ok
    }
}

/// Classifies samples against per-metric rolling baselines.
pub struct AnomalyDetector {
    config: DetectorConfig,
    windows: HashMap<MetricKey, RollingWindow>,
}

impl AnomalyDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            windows: HashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DetectorConfig::default())
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Push `value` into the metric's window and classify it.
    ///
    /// The window (including the new value) is the baseline. Below
    /// `min_samples` the result is `Learn` with no statistics; a standard
    /// deviation at or below `stable_epsilon` is `Stable`; otherwise the
    /// z-score picks OK, WARN or ALERT.
    ///
    /// Non-finite values are rejected and leave the window untouched. So are
    /// finite values whose window statistics would overflow.
    pub fn evaluate(
        &mut self,
        metric: &MetricKey,
        value: f64,
        unit: &str,
    ) -> EngineResult<MetricStatus> {
        let value = ensure_finite(metric.as_str(), value)?;
        let capacity = self.config.window_capacity;
        let mut window = self
            .windows
            .get(metric)
            .cloned()
            .unwrap_or_else(|| RollingWindow::new(capacity));
        window.push(value);

        let samples = window.count();
        let mut status = MetricStatus {
            metric: metric.clone(),
            value,
            unit: unit.to_string(),
            state: HealthState::Learn,
            mean: None,
            stdev: None,
            z_score: None,
            samples,
            evaluated_at: Utc::now(),
        };

        let mean = window.mean().unwrap_or(value);
        let stdev = window.stddev().unwrap_or(0.0);
        let z = (value - mean) / stdev;
        if !mean.is_finite() || !stdev.is_finite() || (stdev > 0.0 && !z.is_finite()) {
            return Err(EngineError::StatisticsOverflow {
                metric: metric.to_string(),
                value,
            });
        }
        self.windows.insert(metric.clone(), window);

        if samples < self.config.min_samples {
            return Ok(status);
        }
        if samples == self.config.min_samples {
            debug!(metric = %metric, samples, "baseline warm-up complete");
        }

        status.mean = Some(mean);
        status.stdev = Some(stdev);

        if stdev <= self.config.stable_epsilon {
            status.state = HealthState::Stable;
            return Ok(status);
        }

        status.z_score = Some(z);
        status.state = classify_z(z, self.config.warn_factor, self.config.alert_factor);
        Ok(status)
    }

    /// The detector's window for a metric, if any sample has been seen.
    pub fn window(&self, metric: &MetricKey) -> Option<&RollingWindow> {
        self.windows.get(metric)
    }

    /// Samples held for a metric (0 if never seen).
    pub fn sample_count(&self, metric: &MetricKey) -> usize {
        self.windows.get(metric).map(|w| w.count()).unwrap_or(0)
    }

    /// Tracked metric keys, sorted.
    pub fn metrics(&self) -> Vec<&MetricKey> {
        let mut keys: Vec<_> = self.windows.keys().collect();
        keys.sort();
        keys
    }

    /// Drop a metric's baseline; its next sample starts a new warm-up.
    pub fn forget(&mut self, metric: &MetricKey) -> bool {
        self.windows.remove(metric).is_some()
    }

    /// Drop every baseline.
    pub fn reset(&mut self) {
        self.windows.clear();
    }
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::with_defaults()
    }
}
