//! # Clock Abstraction
//!
//! Flash sales make pricing time-dependent, so `now` is an explicit
//! input everywhere in the core. This module is the single seam where
//! wall-clock time enters the system.
//!
//! ## Temporal Drift
//! A resolved price is only valid for the `now` it was computed with:
//! a flash sale can open or expire between two calls. Hosts must
//! re-resolve on every cart change instead of caching a resolution.

use std::cell::Cell;

use chrono::{DateTime, Duration, Utc};

/// Source of the current time.
///
/// Core functions take a `DateTime<Utc>` directly; hosts hold a
/// `Clock` and sample it immediately before each call.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A settable clock for tests and deterministic demos.
///
/// Single-threaded by design (`Cell`), like the rest of the till.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a clock frozen at the given instant.
    pub fn new(now: DateTime<Utc>) -> Self {
        ManualClock { now: Cell::new(now) }
    }

    /// Moves the clock to an exact instant.
    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }

    /// Advances the clock by a duration.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}
