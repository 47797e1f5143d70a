//! Types produced by the anomaly detector.
//!
//! Key types: `MetricKey` (what is being tracked), `HealthState` (the
//! classification) and `MetricStatus` (one evaluation result).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Metric Identification ───────────────────────────────────────────────

/// Identifies a tracked metric, e.g. `"cpu"` or `"net_down"`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricKey(pub String);

impl MetricKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MetricKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for MetricKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

// ── Health State ────────────────────────────────────────────────────────

/// Classification of a single sample against its metric's baseline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthState {
    /// Warm-up: not enough samples for a baseline yet.
    Learn,
    /// Variance is negligible; no meaningful z-score exists.
    Stable,
    /// Within the expected range.
    Ok,
    /// Elevated deviation from the baseline.
    Warn,
    /// Strong deviation from the baseline.
    Alert,
    /// Never produced by the engine; for callers that cannot classify.
    Unknown,
}

impl HealthState {
    /// Upper-case label used in logs and exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Learn => "LEARN",
            Self::Stable => "STABLE",
            Self::Ok => "OK",
            Self::Warn => "WARN",
            Self::Alert => "ALERT",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Only WARN and ALERT are recorded as anomaly events.
    pub fn is_loggable(&self) -> bool {
        matches!(self, Self::Warn | Self::Alert)
    }

    /// Heatmap weight: WARN counts once, ALERT twice.
    pub fn weight(&self) -> u32 {
        match self {
            Self::Warn => 1,
            Self::Alert => 2,
            _ => 0,
        }
    }
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Metric Status ───────────────────────────────────────────────────────

/// Result of evaluating one sample.
///
/// `mean`, `stdev` and `z_score` are `None` during warm-up; `z_score` is also
/// `None` for `Stable`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricStatus {
    pub metric: MetricKey,
    pub value: f64,
    /// Display-only unit tag.
    pub unit: String,
    pub state: HealthState,
    pub mean: Option<f64>,
    pub stdev: Option<f64>,
    pub z_score: Option<f64>,
    /// Values currently held in the detector's window.
    pub samples: usize,
    pub evaluated_at: DateTime<Utc>,
}

impl MetricStatus {
    /// Whether the baseline is still warming up.
    pub fn is_learning(&self) -> bool {
        self.state == HealthState::Learn
    }

    /// The state a caller should display: `Unknown` when a classified state
    /// is missing the statistics it is supposed to carry.
    pub fn display_state(&self) -> HealthState {
        match self.state {
            HealthState::Learn | HealthState::Unknown => self.state,
            HealthState::Stable if self.mean.is_some() && self.stdev.is_some() => self.state,
            HealthState::Ok | HealthState::Warn | HealthState::Alert
                if self.mean.is_some() && self.stdev.is_some() && self.z_score.is_some() =>
            {
                self.state
            }
            _ => HealthState::Unknown,
        }
    }
}
