//! Manually advanced time source.

use super::{Clock, ClockError, TimeDelta, TimePoint};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

/// Default step size in seconds.
pub const DEFAULT_STEP: TimeDelta = 0.02;

/// A clock that only advances when stepped.
///
/// Used to drive a simulation in lock-step and to make timing logic
/// deterministic under test. Readings never move on their own, so
/// [`Clock::to_wall_delta`] is the identity.
#[derive(Debug)]
pub struct SteppableClock {
    current: AtomicU64,
    step: TimeDelta,
    step_count: AtomicU64,
}

impl SteppableClock {
    /// Creates a clock at the epoch with the given step size in seconds.
    pub fn new(step: TimeDelta) -> Result<Self, ClockError> {
        Self::starting_at(step, TimePoint::ZERO)
    }

    /// Creates a clock reading `start` with the given step size in seconds.
    pub fn starting_at(step: TimeDelta, start: TimePoint) -> Result<Self, ClockError> {
        if !step.is_finite() || step <= 0.0 {
            return Err(ClockError::InvalidStep(step));
        }

        Ok(Self {
            current: AtomicU64::new(start.as_nanos()),
            step,
            step_count: AtomicU64::new(0),
        })
    }

    /// Returns the configured step size in seconds.
    #[must_use]
    pub fn step_size(&self) -> TimeDelta {
        self.step
    }

    /// Advances by one step and returns the new reading.
    pub fn step(&self) -> TimePoint {
        self.step_count.fetch_add(1, Ordering::SeqCst);
        self.advance(self.step)
    }

    /// Advances by `delta` seconds and returns the new reading.
    ///
    /// Time never runs backwards: negative or NaN deltas are ignored.
    pub fn step_by(&self, delta: TimeDelta) -> TimePoint {
        if delta.is_nan() || delta < 0.0 {
            warn!(delta, "Ignoring non-positive clock step");
            return self.now_nanos();
        }
        self.advance(delta)
    }

    /// Moves the clock forward to `point` and returns the new reading.
    ///
    /// Time never runs backwards: a `point` earlier than the current reading
    /// is ignored.
    pub fn set_time(&self, point: TimePoint) -> TimePoint {
        let previous = self.current.fetch_max(point.as_nanos(), Ordering::SeqCst);
        if previous > point.as_nanos() {
            warn!(
                current = previous,
                requested = point.as_nanos(),
                "Ignoring attempt to move clock backwards"
            );
        }
        TimePoint::from_nanos(previous.max(point.as_nanos()))
    }

    /// Returns how many times [`step`](Self::step) has been called.
    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.step_count.load(Ordering::SeqCst)
    }

    fn advance(&self, delta: TimeDelta) -> TimePoint {
        let nanos = super::secs_to_nanos(delta);
        let previous = self
            .current
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| {
                Some(now.saturating_add(nanos))
            })
            .unwrap_or_else(|now| now);
        TimePoint::from_nanos(previous.saturating_add(nanos))
    }
}

impl Default for SteppableClock {
    fn default() -> Self {
        Self {
            current: AtomicU64::new(0),
            step: DEFAULT_STEP,
            step_count: AtomicU64::new(0),
        }
    }
}

impl Clock for SteppableClock {
    fn now_nanos(&self) -> TimePoint {
        TimePoint::from_nanos(self.current.load(Ordering::SeqCst))
    }
}
