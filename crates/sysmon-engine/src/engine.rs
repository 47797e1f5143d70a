//! Single entry point pairing the detector with the forecaster.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::anomaly::{AnomalyDetector, MetricKey, MetricStatus};
use crate::config::EngineConfig;
use crate::error::{ensure_finite, EngineResult};
use crate::forecast::{Forecast, TrendForecaster};

/// Everything the engine derives from one sample.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SampleReport {
    pub status: MetricStatus,
    pub forecast: Forecast,
}

/// Detector and forecaster behind one push call.
///
/// Owned by a single driver; callers never touch the windows directly.
pub struct MetricEngine {
    config: EngineConfig,
    detector: AnomalyDetector,
    forecaster: TrendForecaster,
}

impl MetricEngine {
    /// Build an engine from a configuration, validating it first.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            detector: AnomalyDetector::new(config.detector.clone()),
            forecaster: TrendForecaster::new(config.forecast.clone(), config.poll_interval()),
            config,
        })
    }

    pub fn with_defaults() -> Self {
        let config = EngineConfig::default();
        Self {
            detector: AnomalyDetector::new(config.detector.clone()),
            forecaster: TrendForecaster::new(config.forecast.clone(), config.poll_interval()),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Feed one sample to both the detector and the forecaster.
    ///
    /// A non-finite value is rejected before either window changes.
    pub fn push_sample(
        &mut self,
        metric: impl Into<MetricKey>,
        value: f64,
        unit: &str,
    ) -> EngineResult<SampleReport> {
        let metric = metric.into();
        ensure_finite(metric.as_str(), value)?;

        let status = self.detector.evaluate(&metric, value, unit)?;
        self.forecaster.observe(&metric, value)?;
        let forecast = self.forecaster.forecast(&metric);

        trace!(
            metric = %metric,
            value,
            state = %status.state,
            samples = status.samples,
            "sample evaluated"
        );
        Ok(SampleReport { status, forecast })
    }

    /// Forecast a metric against a threshold other than the configured one.
    pub fn forecast_with_threshold(&self, metric: &MetricKey, threshold: f64) -> Forecast {
        self.forecaster.forecast_with_threshold(metric, threshold)
    }

    pub fn detector(&self) -> &AnomalyDetector {
        &self.detector
    }

    pub fn forecaster(&self) -> &TrendForecaster {
        &self.forecaster
    }

    /// Drop all state for one metric.
    pub fn forget(&mut self, metric: &MetricKey) {
        self.detector.forget(metric);
        self.forecaster.forget(metric);
    }

    pub fn reset(&mut self) {
        self.detector.reset();
        self.forecaster.reset();
    }
}

impl Default for MetricEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}
