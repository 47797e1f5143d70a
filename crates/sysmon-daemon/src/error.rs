//! Error types for sysmon-daemon

use sysmon_engine::EngineError;
use thiserror::Error;

/// Daemon-level errors
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Engine rejected a sample or its configuration
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Metrics source failed to produce samples
    #[error("Source error: {0}")]
    Source(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_converts() {
        let err: DaemonError = EngineError::InvalidConfig("bad".into()).into();
        assert!(matches!(err, DaemonError::Engine(_)));
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn test_io_and_json_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: DaemonError = io.into();
        assert!(err.to_string().starts_with("IO error"));

        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: DaemonError = json.into();
        assert!(matches!(err, DaemonError::Serialization(_)));
    }
}
