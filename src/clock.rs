//! Clock Module
//!
//! Time sources for access timestamps and in-memory expiry.

use std::fmt::Debug;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::Utc;

// == Clock ==
/// Source of the current time as Unix microseconds.
pub trait Clock: Send + Sync + Debug {
    fn now_micros(&self) -> i64;

    /// Current time as fractional Unix seconds, the tracker's score unit.
    fn now_secs(&self) -> f64 {
        self.now_micros() as f64 / 1_000_000.0
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_micros(&self) -> i64 {
        Utc::now().timestamp_micros()
    }
}

// == Manual Clock ==
/// A clock that only moves when told to, optionally by a fixed step on every
/// read so that consecutive timestamps are strictly increasing.
#[derive(Debug, Default)]
pub struct ManualClock {
    micros: AtomicI64,
    step: i64,
}

impl ManualClock {
    pub fn new(start_micros: i64) -> Self {
        Self {
            micros: AtomicI64::new(start_micros),
            step: 0,
        }
    }

    /// A clock advancing by `step` after every read.
    pub fn ticking(start_micros: i64, step: Duration) -> Self {
        Self {
            micros: AtomicI64::new(start_micros),
            step: step.as_micros() as i64,
        }
    }

    pub fn advance(&self, by: Duration) {
        self.micros.fetch_add(by.as_micros() as i64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_micros(&self) -> i64 {
        self.micros.fetch_add(self.step, Ordering::SeqCst)
    }
}
