use std::collections::HashMap;
use std::time::Duration;

use crate::config::{ForecastConfig, DEFAULT_POLL_INTERVAL_MS};
use crate::error::{ensure_finite, EngineResult};
use crate::window::RollingWindow;
use crate::MetricKey;

use super::trend::{fit_trend, project_crossing};
use super::types::{Forecast, TrendLine};

/// Keeps a regression history per metric and projects threshold crossings.
///
/// The history is separate from the detector's window; both are fed by the
/// same push in [`crate::MetricEngine`].
pub struct TrendForecaster {
    config: ForecastConfig,
    period: Duration,
    histories: HashMap<MetricKey, RollingWindow>,
}

impl TrendForecaster {
    /// `period` must equal the cadence at which samples are observed.
    pub fn new(config: ForecastConfig, period: Duration) -> Self {
        Self {
            config,
            period,
            histories: HashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(
            ForecastConfig::default(),
            Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        )
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Append a value to the metric's history.
    pub fn observe(&mut self, metric: &MetricKey, value: f64) -> EngineResult<()> {
        let value = ensure_finite(metric.as_str(), value)?;
        let capacity = self.config.window_capacity;
        self.histories
            .entry(metric.clone())
            .or_insert_with(|| RollingWindow::new(capacity))
            .push(value);
        Ok(())
    }

    /// Forecast against the configured threshold.
    pub fn forecast(&self, metric: &MetricKey) -> Forecast {
        self.forecast_with_threshold(metric, self.config.threshold)
    }

    /// Forecast against an explicit threshold.
    pub fn forecast_with_threshold(&self, metric: &MetricKey, threshold: f64) -> Forecast {
        match self.histories.get(metric) {
            Some(history) => {
                let values: Vec<f64> = history.values().collect();
                project_crossing(&values, threshold, &self.config, self.period)
            }
            None => Forecast::InsufficientData { samples: 0 },
        }
    }

    /// The fitted line over the current history, once it has enough points.
    pub fn trend(&self, metric: &MetricKey) -> Option<TrendLine> {
        let history = self.histories.get(metric)?;
        if history.count() < self.config.min_points {
            return None;
        }
        let values: Vec<f64> = history.values().collect();
        fit_trend(&values)
    }

    pub fn history(&self, metric: &MetricKey) -> Option<&RollingWindow> {
        self.histories.get(metric)
    }

    pub fn forget(&mut self, metric: &MetricKey) -> bool {
        self.histories.remove(metric).is_some()
    }

    pub fn reset(&mut self) {
        self.histories.clear();
    }
}

impl Default for TrendForecaster {
    fn default() -> Self {
        Self::with_defaults()
    }
}
