//! Diagnostic sink trait and implementations.

use super::SleepDiagnostic;
use parking_lot::RwLock;
use tracing::{debug, info};

/// Receives sleep diagnostics.
///
/// Recording must never block for long and must never fail; the result of a
/// sleep does not depend on what the sink does.
pub trait DiagnosticSink: Send + Sync + std::fmt::Debug {
    /// Records a diagnostic.
    fn record(&self, diagnostic: &SleepDiagnostic);
}

/// A sink that discards all diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpDiagnosticSink;

impl DiagnosticSink for NoOpDiagnosticSink {
    fn record(&self, _diagnostic: &SleepDiagnostic) {}
}

/// A sink that writes diagnostics through `tracing`.
///
/// Preemption is logged at info level, missed deadlines at debug level since
/// an overloaded loop reports one on every iteration.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingDiagnosticSink;

impl DiagnosticSink for LoggingDiagnosticSink {
    fn record(&self, diagnostic: &SleepDiagnostic) {
        match diagnostic {
            SleepDiagnostic::Preempted => {
                info!(event_type = diagnostic.event_type(), "Sleep was preempted");
            }
            SleepDiagnostic::MissedDeadline { overrun_ms } => {
                debug!(
                    event_type = diagnostic.event_type(),
                    overrun_ms = *overrun_ms,
                    "Missed sleep: {:.3} ms", overrun_ms
                );
            }
        }
    }
}

/// A collecting sink for testing purposes.
#[derive(Debug, Default)]
pub struct CollectingDiagnosticSink {
    diagnostics: RwLock<Vec<SleepDiagnostic>>,
}

impl CollectingDiagnosticSink {
    /// Creates an empty collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded diagnostics in order.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<SleepDiagnostic> {
        self.diagnostics.read().clone()
    }

    /// Returns how many preemptions were recorded.
    #[must_use]
    pub fn preempted_count(&self) -> usize {
        self.diagnostics
            .read()
            .iter()
            .filter(|d| matches!(d, SleepDiagnostic::Preempted))
            .count()
    }

    /// Returns how many missed deadlines were recorded.
    #[must_use]
    pub fn missed_count(&self) -> usize {
        self.diagnostics
            .read()
            .iter()
            .filter(|d| matches!(d, SleepDiagnostic::MissedDeadline { .. }))
            .count()
    }

    /// Clears all recorded diagnostics.
    pub fn clear(&self) {
        self.diagnostics.write().clear();
    }
}

impl DiagnosticSink for CollectingDiagnosticSink {
    fn record(&self, diagnostic: &SleepDiagnostic) {
        self.diagnostics.write().push(*diagnostic);
    }
}
