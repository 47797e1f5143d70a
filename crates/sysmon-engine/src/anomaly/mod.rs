//! Adaptive anomaly detection.
//!
//! Every metric is classified against its own trailing window, so there are
//! no fixed per-metric limits.
//!
//! ## Architecture
//!
//! ```text
//!   (metric, value, unit)
//!       │
//!       ▼
//!   RollingWindow (per metric, FIFO, capacity 60)
//!       │
//!       ├── count < min_samples ──────► LEARN
//!       ├── σ ≤ ε ────────────────────► STABLE
//!       └── z = (x − µ) / σ
//!             ├── |z| < 1.5 ──────────► OK
//!             ├── |z| < 2.5 ──────────► WARN
//!             └── otherwise ──────────► ALERT
//! ```

pub mod detector;
pub mod types;

pub use detector::{classify_z, AnomalyDetector};
pub use types::{HealthState, MetricKey, MetricStatus};
