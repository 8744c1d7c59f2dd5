//! Wall-clock time source.

use super::{Clock, TimePoint};
use std::time::Instant;

/// A monotonic clock that follows physical time one-to-one.
#[derive(Debug, Clone, Copy)]
pub struct RealTimeClock {
    epoch: Instant,
}

impl RealTimeClock {
    /// Creates a clock whose epoch is the moment of construction.
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for RealTimeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for RealTimeClock {
    fn now_nanos(&self) -> TimePoint {
        let nanos = self.epoch.elapsed().as_nanos();
        TimePoint::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}
