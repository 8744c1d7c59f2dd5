//! Error types for the pacer crate.
//!
//! Errors only arise while building clocks and waiters. Pacing itself never
//! fails: overruns and preemption are reported as diagnostics.

use crate::clock::ClockError;
use crate::waiter::WaiterError;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for pacer operations.
#[derive(Debug, Error)]
pub enum PacerError {
    /// A clock could not be constructed.
    #[error("{0}")]
    Clock(#[from] ClockError),

    /// A waiter could not be constructed.
    #[error("{0}")]
    Waiter(#[from] WaiterError),

    /// A configuration file could not be read.
    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration document could not be parsed.
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// Result alias for pacer operations.
pub type Result<T> = std::result::Result<T, PacerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_error_converts() {
        let err: PacerError = ClockError::InvalidScale(0.0).into();
        assert!(matches!(err, PacerError::Clock(_)));
        assert!(err.to_string().contains("Invalid clock scale"));
    }

    #[test]
    fn test_waiter_error_converts() {
        let err: PacerError = WaiterError::InvalidSleepDuration(-1.0).into();
        assert!(matches!(err, PacerError::Waiter(_)));
        assert!(err.to_string().contains("-1"));
    }

    #[test]
    fn test_config_read_error_mentions_path() {
        let err = PacerError::ConfigRead {
            path: PathBuf::from("/missing/pacer.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("/missing/pacer.json"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
