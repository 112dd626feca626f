use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Time source driving per-frame animation.
///
/// Scene hosts only ever read the clock; animation state never owns time.
pub trait FrameClock {
    /// Monotonic time in seconds from an arbitrary origin.
    fn now_seconds(&self) -> f64;
}

/// Wall clock backed by `Instant`.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl FrameClock for MonotonicClock {
    fn now_seconds(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Deterministic clock for tests and offline rendering.
///
/// Clones share the same time cell, so a handle kept by the caller can
/// advance a clock already moved into a host.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    #[must_use]
    pub fn new(start_seconds: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_seconds)),
        }
    }

    pub fn advance(&self, delta_seconds: f64) {
        self.now.set(self.now.get() + delta_seconds);
    }

    pub fn set(&self, seconds: f64) {
        self.now.set(seconds);
    }
}

impl FrameClock for ManualClock {
    fn now_seconds(&self) -> f64 {
        self.now.get()
    }
}
