//! Least-squares trend fitting and threshold projection.

use std::time::Duration;

use crate::config::ForecastConfig;

use super::types::{Forecast, TrendLine};

/// Fit `y = slope * x + intercept` with `x` the zero-based index of each value.
///
/// A zero index spread (a single point) yields a flat line through the mean.
/// Returns `None` for an empty slice.
pub fn fit_trend(values: &[f64]) -> Option<TrendLine> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / n;

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }
    if den.abs() < f64::EPSILON {
        den = 1.0;
    }

    let slope = num / den;
    Some(TrendLine {
        slope,
        intercept: y_mean - slope * x_mean,
    })
}

/// Project when `values` will cross `threshold`.
///
/// `period` is the spacing between consecutive values and converts the
/// fitted index into minutes. Crossings already inside the observed window
/// report zero minutes; crossings past `horizon_minutes` report
/// [`Forecast::NoHighLoad`].
pub fn project_crossing(
    values: &[f64],
    threshold: f64,
    config: &ForecastConfig,
    period: Duration,
) -> Forecast {
    let n = values.len();
    if n < config.min_points.max(2) {
        return Forecast::InsufficientData { samples: n };
    }
    let line = match fit_trend(values) {
        Some(line) => line,
        None => return Forecast::InsufficientData { samples: n },
    };
    let t_index = match line.index_reaching(threshold) {
        Some(t) => t,
        None => return Forecast::NoHighLoad,
    };

    let last_index = (n - 1) as f64;
    if t_index <= last_index {
        return Forecast::CrossingIn { minutes: 0.0 };
    }

    let steps_ahead = t_index - last_index;
    let minutes = steps_ahead * period.as_secs_f64() / 60.0;
    if minutes > 0.0 && minutes <= config.horizon_minutes {
        Forecast::CrossingIn { minutes }
    } else {
        Forecast::NoHighLoad
    }
}
