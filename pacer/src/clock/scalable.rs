//! Time source that runs at a fixed multiple of wall-clock speed.

use super::{secs_to_nanos, Clock, ClockError, TimeDelta, TimePoint};
use std::time::Instant;

/// A clock whose time base advances `scale` times as fast as physical time.
///
/// A scale of `2.0` runs a simulation at double speed: one simulated second
/// passes every half wall-clock second, and [`Clock::to_wall_delta`] halves
/// durations accordingly. `latency` shifts every reading by a constant
/// number of seconds.
#[derive(Debug, Clone, Copy)]
pub struct ScalableClock {
    epoch: Instant,
    scale: f64,
    /// `scale` in parts per billion, for exact integer scaling of readings.
    scale_ppb: u128,
    latency: TimeDelta,
}

const PPB: u128 = 1_000_000_000;

/// Scales wall nanoseconds by a parts-per-billion factor without going
/// through floating point, saturating at `u64::MAX`.
fn scale_nanos(wall_nanos: u128, scale_ppb: u128) -> u64 {
    let scaled = wall_nanos.saturating_mul(scale_ppb) / PPB;
    u64::try_from(scaled).unwrap_or(u64::MAX)
}

impl ScalableClock {
    /// Creates a clock running at `scale` times wall speed.
    pub fn new(scale: f64) -> Result<Self, ClockError> {
        Self::with_latency(scale, 0.0)
    }

    /// Creates a clock running at `scale` times wall speed, offset by `latency` seconds.
    pub fn with_latency(scale: f64, latency: TimeDelta) -> Result<Self, ClockError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ClockError::InvalidScale(scale));
        }
        if !latency.is_finite() || latency < 0.0 {
            return Err(ClockError::InvalidLatency(latency));
        }

        Ok(Self {
            epoch: Instant::now(),
            scale,
            scale_ppb: ((scale * PPB as f64).round() as u128).max(1),
            latency,
        })
    }

    /// Returns the speed factor.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Returns the constant offset in seconds.
    #[must_use]
    pub fn latency(&self) -> TimeDelta {
        self.latency
    }
}

impl Clock for ScalableClock {
    fn now_nanos(&self) -> TimePoint {
        let scaled = scale_nanos(self.epoch.elapsed().as_nanos(), self.scale_ppb);
        TimePoint::from_nanos(scaled.saturating_add(secs_to_nanos(self.latency)))
    }

    fn to_wall_delta(&self, delta: TimeDelta) -> TimeDelta {
        delta / self.scale
    }

    fn true_scale_wrt_wall_clock(&self) -> f64 {
        self.scale
    }
}
