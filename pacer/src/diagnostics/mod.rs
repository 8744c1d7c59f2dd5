//! Diagnostics raised by cancellation-aware sleeps.
//!
//! Sleeps never fail. Preemption and overrun are reported here as
//! fire-and-forget events and through the boolean returned by the sleep.

mod sink;

pub use sink::{CollectingDiagnosticSink, DiagnosticSink, LoggingDiagnosticSink, NoOpDiagnosticSink};

use serde::{Deserialize, Serialize};
use std::fmt;

/// An anomaly observed while pacing a loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SleepDiagnostic {
    /// Cancellation was already requested, so the sleep was skipped.
    Preempted,
    /// The cycle budget was already spent when the sleep was due.
    MissedDeadline {
        /// How far past the deadline the loop was, in milliseconds.
        overrun_ms: f64,
    },
}

impl SleepDiagnostic {
    /// Builds a missed-deadline diagnostic from a non-positive sleep request.
    #[must_use]
    pub fn missed(requested_secs: f64) -> Self {
        let overrun_ms = if requested_secs.is_nan() {
            0.0
        } else {
            0.0 - requested_secs * 1000.0
        };
        Self::MissedDeadline { overrun_ms }
    }

    /// Returns the event name used in logs.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Preempted => "sleep.preempted",
            Self::MissedDeadline { .. } => "sleep.missed",
        }
    }
}

impl fmt::Display for SleepDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preempted => write!(f, "Sleep was preempted by cancellation"),
            Self::MissedDeadline { overrun_ms } => {
                write!(f, "Missed sleep deadline by {overrun_ms:.3} ms")
            }
        }
    }
}
