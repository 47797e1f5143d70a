//! Human-readable status and forecast text.

use sysmon_engine::{Forecast, HealthState, MetricStatus, SampleReport};

/// Detail text for one evaluated sample.
pub fn status_details(status: &MetricStatus) -> String {
    let (mean, stdev, z) = (status.mean, status.stdev, status.z_score);
    match (status.display_state(), mean, stdev, z) {
        (HealthState::Learn, _, _, _) => format!(
            "AI is learning the baseline – building initial profile (samples: {}).",
            status.samples
        ),
        (HealthState::Stable, Some(mean), Some(stdev), _) => format!(
            "Values are very stable with minimal variance (µ={:.2}, σ={:.2}).",
            mean, stdev
        ),
        (HealthState::Ok, Some(mean), Some(stdev), Some(z)) => format!(
            "Value within expected range (z≈{:.2}, µ={:.2}, σ={:.2}).",
            z, mean, stdev
        ),
        (HealthState::Warn, Some(mean), Some(stdev), Some(z)) => format!(
            "Increased deviation from normal range (z≈{:.2}, µ={:.2}, σ={:.2}).",
            z, mean, stdev
        ),
        (HealthState::Alert, Some(mean), Some(stdev), Some(z)) => format!(
            "Strong deviation from normal range – potential anomaly (z≈{:.2}, µ={:.2}, σ={:.2}).",
            z, mean, stdev
        ),
        _ => "Status not available.".to_string(),
    }
}

/// Forecast text; `horizon_minutes` names the forecast window.
pub fn forecast_text(forecast: &Forecast, horizon_minutes: f64) -> String {
    match forecast {
        Forecast::InsufficientData { .. } => {
            "Not enough data yet for a reliable forecast.".to_string()
        }
        Forecast::NoHighLoad => format!(
            "No increased load expected within the forecast window (up to {} minutes).",
            horizon_minutes
        ),
        Forecast::CrossingIn { minutes } => {
            format!("High load expected in approx. {:.1} minutes.", minutes)
        }
    }
}

/// One line per report: metric, value, gauge, state, details and forecast.
pub fn report_line(report: &SampleReport, horizon_minutes: f64) -> String {
    let status = &report.status;
    format!(
        "{:<9} {:>9.2} {:<5} {} {:<6} {} {}",
        status.metric.as_str(),
        status.value,
        status.unit,
        gauge(status.value, &status.unit),
        status.display_state().as_str(),
        status_details(status),
        forecast_text(&report.forecast, horizon_minutes)
    )
}

/// Scale a value onto a 0..=100 graph axis. Percentages are clamped; other
/// units are divided by ten first.
pub fn graph_value(value: f64, unit: &str) -> f64 {
    let scaled = if unit == "%" { value } else { value / 10.0 };
    scaled.clamp(0.0, 100.0)
}

/// Ten-cell bar of [`graph_value`].
pub fn gauge(value: f64, unit: &str) -> String {
    let filled = (graph_value(value, unit) / 10.0).round() as usize;
    format!("[{}{}]", "#".repeat(filled), " ".repeat(10 - filled))
}
