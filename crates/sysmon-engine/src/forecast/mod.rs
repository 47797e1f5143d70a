//! Short-horizon threshold forecasting.
//!
//! A least-squares line over the sample index of each metric's recent history
//! estimates when the metric will reach a high-load threshold. The index is
//! converted to wall-clock minutes through the fixed polling period.
//!
//! ```text
//!   history (≤ 60 values)
//!       │ n < min_points ─────────────► InsufficientData
//!       ▼
//!   fit_trend ──► slope ≤ 0 ──────────► NoHighLoad
//!       │
//!       ▼ t = (threshold − intercept) / slope
//!   t ≤ n − 1 ────────────────────────► CrossingIn { 0 }
//!   (t − (n − 1)) · period ≤ horizon ─► CrossingIn { minutes }
//!   otherwise ────────────────────────► NoHighLoad
//! ```

pub mod forecaster;
pub mod trend;
pub mod types;

pub use forecaster::TrendForecaster;
pub use trend::{fit_trend, project_crossing};
pub use types::{Forecast, TrendLine};
