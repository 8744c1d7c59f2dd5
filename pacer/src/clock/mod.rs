//! Monotonic time sources for paced loops.
//!
//! This module provides:
//! - The [`Clock`] trait every [`Waiter`](crate::waiter::Waiter) is built on
//! - [`RealTimeClock`] for wall-clock pacing
//! - [`ScalableClock`] for simulations running faster or slower than real time
//! - [`SteppableClock`] for lock-step simulation and deterministic tests

mod real;
mod scalable;
mod steppable;

pub use real::RealTimeClock;
pub use scalable::ScalableClock;
pub use steppable::{SteppableClock, DEFAULT_STEP};

use std::fmt;
use thiserror::Error;

/// A duration in seconds.
///
/// Negative values only appear as intermediate results ("over budget") and
/// are never handed to a blocking sleep.
pub type TimeDelta = f64;

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// An opaque monotonic timestamp with nanosecond resolution.
///
/// Timestamps are only meaningful relative to the clock that produced them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimePoint(u64);

impl TimePoint {
    /// The clock epoch.
    pub const ZERO: Self = Self(0);

    /// Creates a timestamp from raw nanoseconds since the clock epoch.
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Returns the raw nanoseconds since the clock epoch.
    #[must_use]
    pub const fn as_nanos(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ns", self.0)
    }
}

/// Converts seconds into whole nanoseconds, clamping into the `u64` range.
pub(crate) fn secs_to_nanos(secs: TimeDelta) -> u64 {
    if secs.is_nan() || secs <= 0.0 {
        return 0;
    }
    let nanos = secs * NANOS_PER_SEC;
    if nanos >= u64::MAX as f64 {
        u64::MAX
    } else {
        nanos as u64
    }
}

/// Errors raised while constructing a clock.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClockError {
    /// The speed factor must be finite and strictly positive.
    #[error("Invalid clock scale {0}: must be finite and > 0")]
    InvalidScale(f64),

    /// The latency offset must be finite and non-negative.
    #[error("Invalid clock latency {0}s: must be finite and >= 0")]
    InvalidLatency(f64),

    /// The step size must be finite and strictly positive.
    #[error("Invalid clock step {0}s: must be finite and > 0")]
    InvalidStep(f64),
}

/// A monotonic time source, real or simulated.
///
/// Implementations are queried concurrently by many loops and must not have
/// side effects beyond reading time.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Returns the current time in this clock's time base.
    fn now_nanos(&self) -> TimePoint;

    /// Seconds from `earlier` to `later`; negative when `later` precedes `earlier`.
    fn elapsed_between(&self, later: TimePoint, earlier: TimePoint) -> TimeDelta {
        if later >= earlier {
            (later.0 - earlier.0) as f64 / NANOS_PER_SEC
        } else {
            -((earlier.0 - later.0) as f64 / NANOS_PER_SEC)
        }
    }

    /// Seconds elapsed since `since`, in this clock's time base.
    fn elapsed_since(&self, since: TimePoint) -> TimeDelta {
        self.elapsed_between(self.now_nanos(), since)
    }

    /// Offsets `point` by `delta` seconds, saturating at the epoch.
    fn add_to(&self, point: TimePoint, delta: TimeDelta) -> TimePoint {
        if delta >= 0.0 {
            TimePoint(point.0.saturating_add(secs_to_nanos(delta)))
        } else {
            TimePoint(point.0.saturating_sub(secs_to_nanos(-delta)))
        }
    }

    /// Converts a duration in this clock's time base into wall-clock seconds.
    fn to_wall_delta(&self, delta: TimeDelta) -> TimeDelta {
        delta
    }

    /// How many clock seconds pass per wall-clock second.
    fn true_scale_wrt_wall_clock(&self) -> f64 {
        1.0
    }
}
