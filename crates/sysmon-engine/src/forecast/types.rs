use serde::{Deserialize, Serialize};

/// Outcome of a short-horizon threshold forecast.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Forecast {
    /// Not enough history to fit a trend.
    InsufficientData { samples: usize },
    /// Trend is flat or decreasing, or the crossing lies beyond the horizon.
    NoHighLoad,
    /// The threshold is projected to be crossed in `minutes` (0 when the
    /// fitted line already exceeds it inside the observed window).
    CrossingIn { minutes: f64 },
}

impl Forecast {
    /// Minutes until the crossing, if one is projected.
    pub fn minutes(&self) -> Option<f64> {
        match self {
            Self::CrossingIn { minutes } => Some(*minutes),
            _ => None,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }

    /// A crossing is projected within the horizon.
    pub fn expects_high_load(&self) -> bool {
        matches!(self, Self::CrossingIn { .. })
    }
}

/// Least-squares line over sample indices: `y = slope * x + intercept`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendLine {
    /// Units per sample.
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    /// Fitted value at index `x`.
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Index at which the line reaches `threshold`, for a rising line.
    pub fn index_reaching(&self, threshold: f64) -> Option<f64> {
        if self.slope > 0.0 {
            Some((threshold - self.intercept) / self.slope)
        } else {
            None
        }
    }
}
