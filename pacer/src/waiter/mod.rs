//! Fixed-rate loop pacing with timeout detection.
//!
//! A [`Waiter`] sleeps just long enough to keep each loop iteration at a
//! fixed period. The sleep target is derived from the time already spent in
//! the iteration, so jitter in the loop body does not accumulate. When the
//! body overruns its budget the loop runs flat out and the overrun is
//! logged.
//!
//! ```rust
//! use pacer::prelude::*;
//! use std::sync::Arc;
//!
//! let clock: Arc<dyn Clock> = Arc::new(RealTimeClock::new());
//! let token = CancellationToken::shared();
//! let action = CancelableAction::new(token.clone());
//! let mut waiter = Waiter::with_timeout(clock, 0.001, 0.01).unwrap();
//!
//! while !waiter.is_timeout() && waiter.sleep(&action) {
//!     // one iteration of work
//! }
//! ```

mod timeout;

#[cfg(test)]
mod scenario_tests;

pub use timeout::TimeoutMonitor;

use crate::cancellation::Cancelable;
use crate::clock::{Clock, TimeDelta, TimePoint};
use crate::config::WaiterConfig;
use std::sync::Arc;
use thiserror::Error;
use timeout::TimeoutAnchor;
use tracing::{debug, trace};

/// Errors raised when a waiter is given unusable durations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WaiterError {
    /// The loop period was negative, NaN or infinite.
    #[error("Invalid sleep duration {0}s: must be finite and >= 0")]
    InvalidSleepDuration(f64),

    /// The timeout was negative or NaN.
    #[error("Invalid timeout duration {0}s: must be >= 0")]
    InvalidTimeoutDuration(f64),
}

/// Checks a loop period and timeout before a waiter is built from them.
pub fn validate_durations(
    sleep_duration: TimeDelta,
    timeout_duration: TimeDelta,
) -> Result<(), WaiterError> {
    if !sleep_duration.is_finite() || sleep_duration < 0.0 {
        return Err(WaiterError::InvalidSleepDuration(sleep_duration));
    }
    if timeout_duration.is_nan() || timeout_duration < 0.0 {
        return Err(WaiterError::InvalidTimeoutDuration(timeout_duration));
    }
    Ok(())
}

/// Paces one loop to a fixed period and tracks a timeout for it.
///
/// A waiter belongs to a single loop; sleeping and resetting take `&mut self`.
/// Use [`timeout_monitor`](Self::timeout_monitor) to check the timeout from
/// another thread.
#[derive(Debug)]
pub struct Waiter {
    clock: Arc<dyn Clock>,
    loop_start: TimePoint,
    proc_start: TimeoutAnchor,
    sleep_duration: TimeDelta,
    timeout_duration: TimeDelta,
}

impl Waiter {
    /// Creates a waiter with period `sleep_duration` and no timeout.
    pub fn new(clock: Arc<dyn Clock>, sleep_duration: TimeDelta) -> Result<Self, WaiterError> {
        Self::with_timeout(clock, sleep_duration, f64::INFINITY)
    }

    /// Creates a waiter with period `sleep_duration` that times out after
    /// `timeout_duration` clock seconds.
    pub fn with_timeout(
        clock: Arc<dyn Clock>,
        sleep_duration: TimeDelta,
        timeout_duration: TimeDelta,
    ) -> Result<Self, WaiterError> {
        validate_durations(sleep_duration, timeout_duration)?;

        let now = clock.now_nanos();
        debug!(sleep_duration, timeout_duration, "Waiter created");

        Ok(Self {
            clock,
            loop_start: now,
            proc_start: TimeoutAnchor::new(now),
            sleep_duration,
            timeout_duration,
        })
    }

    /// Creates a waiter from configuration.
    pub fn from_config(clock: Arc<dyn Clock>, config: &WaiterConfig) -> Result<Self, WaiterError> {
        Self::with_timeout(clock, config.sleep_seconds, config.timeout_duration())
    }

    /// The budget left in the current cycle, in clock seconds.
    ///
    /// Negative when the iteration has already overrun its period.
    #[must_use]
    pub fn remaining(&self) -> TimeDelta {
        self.sleep_duration - self.clock.elapsed_since(self.loop_start)
    }

    /// Sleeps out the rest of the current cycle.
    ///
    /// Returns `false` if `action` was cancelled before or during the sleep.
    /// The cycle anchor moves to the current time whatever the outcome.
    pub fn sleep<A>(&mut self, action: &A) -> bool
    where
        A: Cancelable + ?Sized,
    {
        let remaining = self.remaining();
        let completed = action.sleep(self.clock.to_wall_delta(remaining));
        self.loop_start = self.clock.now_nanos();
        trace!(remaining, completed, "Waiter cycle finished");
        completed
    }

    /// Async counterpart of [`sleep`](Self::sleep) for loops running on tokio.
    pub async fn sleep_async<A>(&mut self, action: &A) -> bool
    where
        A: Cancelable + ?Sized,
    {
        let remaining = self.remaining();
        let completed = action.sleep_async(self.clock.to_wall_delta(remaining)).await;
        self.loop_start = self.clock.now_nanos();
        trace!(remaining, completed, "Waiter cycle finished");
        completed
    }

    /// Starts a new cycle now without sleeping.
    pub fn reset_sleep(&mut self) {
        self.loop_start = self.clock.now_nanos();
    }

    /// Restarts the timeout window now.
    pub fn reset_timeout(&mut self) {
        self.proc_start.set(self.clock.now_nanos());
    }

    /// Returns whether `timeout_duration` has elapsed since creation or the
    /// last [`reset_timeout`](Self::reset_timeout).
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.clock.elapsed_since(self.proc_start.get()) >= self.timeout_duration
    }

    /// Returns a handle for checking the timeout from other threads.
    #[must_use]
    pub fn timeout_monitor(&self) -> TimeoutMonitor {
        TimeoutMonitor {
            clock: Arc::clone(&self.clock),
            anchor: self.proc_start.clone(),
            timeout_duration: self.timeout_duration,
        }
    }

    /// Returns the loop period in clock seconds.
    #[must_use]
    pub fn sleep_duration(&self) -> TimeDelta {
        self.sleep_duration
    }

    /// Returns the timeout in clock seconds; infinite when unbounded.
    #[must_use]
    pub fn timeout_duration(&self) -> TimeDelta {
        self.timeout_duration
    }

    /// Returns when the current cycle started.
    #[must_use]
    pub fn loop_start(&self) -> TimePoint {
        self.loop_start
    }

    /// Returns when the timeout window started.
    #[must_use]
    pub fn proc_start(&self) -> TimePoint {
        self.proc_start.get()
    }

    /// Returns the clock this waiter paces against.
    #[must_use]
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}
