//! Wall-clock source for estimate timestamps

use chrono::Utc;

pub trait Clock {
    /// Microseconds since the Unix epoch
    fn now_usec(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_usec(&self) -> u64 {
        // Pre-1970 clocks clamp to zero
        u64::try_from(Utc::now().timestamp_micros()).unwrap_or(0)
    }
}
