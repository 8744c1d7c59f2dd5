//! Timeout detection shared between a waiter and its observers.

use crate::clock::{Clock, TimeDelta, TimePoint};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// The process-start anchor a waiter measures its timeout from.
///
/// Stored atomically so observers on other threads read it while the owning
/// loop is blocked in a sleep.
#[derive(Debug, Clone)]
pub(crate) struct TimeoutAnchor(Arc<AtomicU64>);

impl TimeoutAnchor {
    pub(crate) fn new(start: TimePoint) -> Self {
        Self(Arc::new(AtomicU64::new(start.as_nanos())))
    }

    pub(crate) fn get(&self) -> TimePoint {
        TimePoint::from_nanos(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn set(&self, point: TimePoint) {
        self.0.store(point.as_nanos(), Ordering::Release);
    }
}

/// A read-only view of a [`Waiter`](super::Waiter)'s timeout.
///
/// Obtained from [`Waiter::timeout_monitor`](super::Waiter::timeout_monitor).
/// Monitors can be cloned and sent to other threads; they observe every
/// [`reset_timeout`](super::Waiter::reset_timeout) on the waiter.
#[derive(Debug, Clone)]
pub struct TimeoutMonitor {
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) anchor: TimeoutAnchor,
    pub(crate) timeout_duration: TimeDelta,
}

impl TimeoutMonitor {
    /// Returns whether the timeout has elapsed.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.elapsed() >= self.timeout_duration
    }

    /// Seconds elapsed since the waiter was created or its timeout last reset.
    #[must_use]
    pub fn elapsed(&self) -> TimeDelta {
        self.clock.elapsed_since(self.anchor.get())
    }

    /// Seconds left before the timeout, zero once it has elapsed.
    #[must_use]
    pub fn remaining(&self) -> TimeDelta {
        (self.timeout_duration - self.elapsed()).max(0.0)
    }

    /// Returns the configured timeout in seconds.
    #[must_use]
    pub fn timeout_duration(&self) -> TimeDelta {
        self.timeout_duration
    }
}
