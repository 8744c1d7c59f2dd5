//! Configuration for clocks and waiters.
//!
//! Configuration is plain JSON, typically one document per process:
//!
//! ```json
//! {
//!   "clock": { "kind": "scaled", "clock_speed": 2.0 },
//!   "waiter": { "sleep_seconds": 0.1, "timeout_seconds": 30.0 }
//! }
//! ```

use crate::clock::{
    Clock, ClockError, RealTimeClock, ScalableClock, SteppableClock, TimeDelta, DEFAULT_STEP,
};
use crate::errors::{PacerError, Result};
use crate::waiter::{validate_durations, Waiter, WaiterError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Which time source a process paces against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockKind {
    /// Physical time.
    #[default]
    Real,
    /// Physical time multiplied by `clock_speed`.
    Scaled,
    /// Time that only moves when stepped.
    Steppable,
}

/// Configuration for the process clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Which clock to build.
    #[serde(default)]
    pub kind: ClockKind,
    /// Clock seconds per wall second, for scaled clocks.
    #[serde(default = "default_clock_speed")]
    pub clock_speed: f64,
    /// Constant offset added to scaled clock readings, in seconds.
    #[serde(default)]
    pub latency_seconds: f64,
    /// Step size for steppable clocks, in seconds.
    #[serde(default = "default_step_seconds")]
    pub step_seconds: f64,
}

fn default_clock_speed() -> f64 {
    1.0
}

fn default_step_seconds() -> f64 {
    DEFAULT_STEP
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            kind: ClockKind::default(),
            clock_speed: default_clock_speed(),
            latency_seconds: 0.0,
            step_seconds: default_step_seconds(),
        }
    }
}

impl ClockConfig {
    /// Creates a real-time clock configuration.
    #[must_use]
    pub fn real() -> Self {
        Self::default()
    }

    /// Creates a scaled clock configuration.
    #[must_use]
    pub fn scaled(clock_speed: f64) -> Self {
        Self {
            kind: ClockKind::Scaled,
            clock_speed,
            ..Self::default()
        }
    }

    /// Creates a steppable clock configuration.
    #[must_use]
    pub fn steppable(step_seconds: f64) -> Self {
        Self {
            kind: ClockKind::Steppable,
            step_seconds,
            ..Self::default()
        }
    }

    /// Sets the latency offset.
    #[must_use]
    pub fn with_latency(mut self, latency_seconds: f64) -> Self {
        self.latency_seconds = latency_seconds;
        self
    }

    /// Builds the configured clock.
    pub fn build(&self) -> std::result::Result<Arc<dyn Clock>, ClockError> {
        debug!(kind = ?self.kind, clock_speed = self.clock_speed, "Building clock");
        let clock: Arc<dyn Clock> = match self.kind {
            ClockKind::Real => Arc::new(RealTimeClock::new()),
            ClockKind::Scaled => Arc::new(ScalableClock::with_latency(
                self.clock_speed,
                self.latency_seconds,
            )?),
            ClockKind::Steppable => Arc::new(SteppableClock::new(self.step_seconds)?),
        };
        Ok(clock)
    }
}

/// Configuration for a single paced loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaiterConfig {
    /// Target loop period, in clock seconds.
    pub sleep_seconds: f64,
    /// Time after which the loop is considered timed out; `None` for never.
    #[serde(default)]
    pub timeout_seconds: Option<f64>,
}

impl WaiterConfig {
    /// Creates a configuration with the given period and no timeout.
    #[must_use]
    pub fn new(sleep_seconds: f64) -> Self {
        Self {
            sleep_seconds,
            timeout_seconds: None,
        }
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout_seconds: f64) -> Self {
        self.timeout_seconds = Some(timeout_seconds);
        self
    }

    /// Returns the timeout in seconds, infinite when unset.
    #[must_use]
    pub fn timeout_duration(&self) -> TimeDelta {
        self.timeout_seconds.unwrap_or(f64::INFINITY)
    }

    /// Checks that both durations are usable.
    pub fn validate(&self) -> std::result::Result<(), WaiterError> {
        validate_durations(self.sleep_seconds, self.timeout_duration())
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacerConfig {
    /// The process clock.
    #[serde(default)]
    pub clock: ClockConfig,
    /// The loop pacing.
    pub waiter: WaiterConfig,
}

impl PacerConfig {
    /// Parses a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a configuration from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| PacerError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Checks the configuration without building anything.
    pub fn validate(&self) -> Result<()> {
        self.waiter.validate()?;
        self.clock.build()?;
        Ok(())
    }

    /// Builds the clock and a waiter paced against it.
    pub fn build(&self) -> Result<(Arc<dyn Clock>, Waiter)> {
        let clock = self.clock.build()?;
        let waiter = Waiter::from_config(Arc::clone(&clock), &self.waiter)?;
        Ok((clock, waiter))
    }
}
