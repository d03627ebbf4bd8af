//! Wall-clock source for date-dependent behavior.

use chrono::{DateTime, Utc};

/// Source of the current calendar time.
pub trait WallClock {
    fn now(&self) -> DateTime<Utc>;
}

/// The host system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl WallClock for FixedClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
