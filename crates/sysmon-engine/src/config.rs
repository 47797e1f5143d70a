//! Engine configuration.
//!
//! Every tunable of the detector and the forecaster is an explicit parameter
//! so tests can drive the engine with synthetic cadences. The defaults are the
//! reference configuration: 60-sample windows, a 10-sample warm-up, z-score
//! factors of 1.5 / 2.5, an 80.0 high-load threshold, a 30-minute horizon and
//! one sample per second.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Default capacity of every rolling window.
pub const DEFAULT_WINDOW_CAPACITY: usize = 60;

/// Samples required before the detector starts classifying.
pub const DEFAULT_MIN_SAMPLES: usize = 10;

/// |z| at or above which a sample is a warning.
pub const DEFAULT_WARN_FACTOR: f64 = 1.5;

/// |z| at or above which a sample is an alert.
pub const DEFAULT_ALERT_FACTOR: f64 = 2.5;

/// Standard deviations at or below this are treated as zero variance.
pub const DEFAULT_STABLE_EPSILON: f64 = 1e-9;

/// Points required before the forecaster fits a trend.
pub const DEFAULT_MIN_FORECAST_POINTS: usize = 10;

/// Default high-load threshold, in the metric's own unit scale.
pub const DEFAULT_FORECAST_THRESHOLD: f64 = 80.0;

/// Crossings projected further out than this are not reported.
pub const DEFAULT_HORIZON_MINUTES: f64 = 30.0;

/// Default polling period in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Configuration for the anomaly detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Samples retained per metric.
    pub window_capacity: usize,
    /// Warm-up length; below this the detector reports LEARN.
    pub min_samples: usize,
    /// Lower bound of the WARN band, in standard deviations.
    pub warn_factor: f64,
    /// Lower bound of the ALERT band, in standard deviations.
    pub alert_factor: f64,
    /// Standard deviation treated as zero (STABLE).
    pub stable_epsilon: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            min_samples: DEFAULT_MIN_SAMPLES,
            warn_factor: DEFAULT_WARN_FACTOR,
            alert_factor: DEFAULT_ALERT_FACTOR,
            stable_epsilon: DEFAULT_STABLE_EPSILON,
        }
    }
}

/// Configuration for the trend forecaster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Samples retained per metric for regression.
    pub window_capacity: usize,
    /// Points required before a trend is fitted.
    pub min_points: usize,
    /// Threshold used by `TrendForecaster::forecast`.
    pub threshold: f64,
    /// Longest crossing ETA that is still reported.
    pub horizon_minutes: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            min_points: DEFAULT_MIN_FORECAST_POINTS,
            threshold: DEFAULT_FORECAST_THRESHOLD,
            horizon_minutes: DEFAULT_HORIZON_MINUTES,
        }
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub detector: DetectorConfig,
    pub forecast: ForecastConfig,
    /// Sampling period. Forecast minutes are derived from it, so it must match
    /// the cadence at which samples are actually pushed.
    pub poll_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            detector: DetectorConfig::default(),
            forecast: ForecastConfig::default(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl EngineConfig {
    /// The polling period as a `Duration`.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Check every parameter; returns the first violation found.
    pub fn validate(&self) -> EngineResult<()> {
        let d = &self.detector;
        if d.window_capacity == 0 {
            return Err(invalid("detector.window_capacity must be positive"));
        }
        if d.min_samples == 0 {
            return Err(invalid("detector.min_samples must be positive"));
        }
        if d.min_samples > d.window_capacity {
            return Err(invalid(
                "detector.min_samples cannot exceed detector.window_capacity",
            ));
        }
        if !(d.warn_factor.is_finite() && d.warn_factor > 0.0) {
            return Err(invalid("detector.warn_factor must be positive and finite"));
        }
        if !(d.alert_factor.is_finite() && d.alert_factor > 0.0) {
            return Err(invalid("detector.alert_factor must be positive and finite"));
        }
        if d.warn_factor >= d.alert_factor {
            return Err(invalid(
                "detector.warn_factor must be below detector.alert_factor",
            ));
        }
        if !(d.stable_epsilon.is_finite() && d.stable_epsilon >= 0.0) {
            return Err(invalid("detector.stable_epsilon must be non-negative"));
        }

        let f = &self.forecast;
        if f.window_capacity == 0 {
            return Err(invalid("forecast.window_capacity must be positive"));
        }
        if f.min_points < 2 {
            return Err(invalid("forecast.min_points must be at least 2"));
        }
        if f.min_points > f.window_capacity {
            return Err(invalid(
                "forecast.min_points cannot exceed forecast.window_capacity",
            ));
        }
        if !f.threshold.is_finite() {
            return Err(invalid("forecast.threshold must be finite"));
        }
        if !(f.horizon_minutes.is_finite() && f.horizon_minutes > 0.0) {
            return Err(invalid("forecast.horizon_minutes must be positive"));
        }

        if self.poll_interval_ms == 0 {
            return Err(invalid("poll_interval_ms must be positive"));
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> EngineError {
    EngineError::InvalidConfig(msg.to_string())
}
