//! # sysmon-engine
//!
//! Adaptive anomaly detection and short-horizon forecasting for host metrics.
//!
//! The engine turns a stream of scalar samples into a health state per sample
//! (LEARN, STABLE, OK, WARN, ALERT) using a baseline it maintains itself, and
//! projects from recent trend whether and when a metric will cross a
//! high-load threshold.
//!
//! ## Architecture
//!
//! ```text
//!   driver tick: (metric, value, unit)
//!                     │
//!                     ▼
//!              ┌──────────────┐
//!              │ MetricEngine │  rejects NaN / ±inf
//!              └──────┬───────┘
//!          ┌──────────┴───────────┐
//!          ▼                      ▼
//!   ┌───────────────┐     ┌────────────────┐
//!   │AnomalyDetector│     │TrendForecaster │
//!   │ RollingWindow │     │ RollingWindow  │  ← one each per metric
//!   └──────┬────────┘     └───────┬────────┘
//!          │ MetricStatus         │ Forecast
//!          └──────────┬───────────┘
//!                     ▼
//!               SampleReport  → caller (render, event log, heatmap)
//! ```
//!
//! The engine never collects, renders or records anything itself; it is a
//! plain value owned by one driver.
//!
//! ## Quick Start
//!
//! ```rust
//! use sysmon_engine::{HealthState, MetricEngine};
//!
//! let mut engine = MetricEngine::with_defaults();
//! for _ in 0..9 {
//!     let report = engine.push_sample("cpu", 50.0, "%").unwrap();
//!     assert_eq!(report.status.state, HealthState::Learn);
//! }
//! let report = engine.push_sample("cpu", 51.0, "%").unwrap();
//! assert_ne!(report.status.state, HealthState::Learn);
//! ```

#![deny(unsafe_code)]

pub mod anomaly;
pub mod config;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod window;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use anomaly::{classify_z, AnomalyDetector, HealthState, MetricKey, MetricStatus};
pub use config::{
    DetectorConfig, EngineConfig, ForecastConfig, DEFAULT_ALERT_FACTOR,
    DEFAULT_FORECAST_THRESHOLD, DEFAULT_HORIZON_MINUTES, DEFAULT_MIN_FORECAST_POINTS,
    DEFAULT_MIN_SAMPLES, DEFAULT_POLL_INTERVAL_MS, DEFAULT_STABLE_EPSILON,
    DEFAULT_WARN_FACTOR, DEFAULT_WINDOW_CAPACITY,
};
pub use engine::{MetricEngine, SampleReport};
pub use error::{EngineError, EngineResult};
pub use forecast::{fit_trend, project_crossing, Forecast, TrendForecaster, TrendLine};
pub use window::RollingWindow;
