use thiserror::Error;

/// Errors from the detection and forecasting engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("non-finite sample for metric {metric}: {value}")]
    NonFiniteSample { metric: String, value: f64 },

    #[error("statistics for metric {metric} are not representable after sample {value}")]
    StatisticsOverflow { metric: String, value: f64 },

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience type alias for engine results.
pub type EngineResult<T> = Result<T, EngineError>;

/// Reject NaN and infinite samples before they reach any window.
pub(crate) fn ensure_finite(metric: &str, value: f64) -> EngineResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::NonFiniteSample {
            metric: metric.to_string(),
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let e = EngineError::NonFiniteSample {
            metric: "cpu".into(),
            value: f64::NAN,
        };
        assert!(e.to_string().contains("cpu"));
        assert!(e.to_string().contains("NaN"));

        let e = EngineError::StatisticsOverflow {
            metric: "net_down".into(),
            value: 1.0e308,
        };
        assert!(e.to_string().contains("net_down"));

        let e = EngineError::InvalidConfig("warn_factor must be below alert_factor".into());
        assert!(e.to_string().contains("warn_factor"));
    }

    #[test]
    fn ensure_finite_accepts_ordinary_values() {
        assert_eq!(ensure_finite("ram", 42.5).unwrap(), 42.5);
        assert_eq!(ensure_finite("ram", -3.0).unwrap(), -3.0);
        assert_eq!(ensure_finite("ram", 0.0).unwrap(), 0.0);
    }

    #[test]
    fn ensure_finite_rejects_nan_and_infinity() {
        assert!(ensure_finite("disk", f64::NAN).is_err());
        assert!(ensure_finite("disk", f64::INFINITY).is_err());
        assert!(matches!(
            ensure_finite("disk", f64::NEG_INFINITY),
            Err(EngineError::NonFiniteSample { .. })
        ));
    }
}
