//! Time sources for the interactive thread.
//!
//! The stopwatch and the pausable timer read time through [`Clock`], so the
//! same scheduler runs against wall-clock time in a live window and against
//! a fixed-step frame clock when recording or testing.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

pub trait Clock {
    /// Seconds elapsed since the clock's origin.
    fn now(&self) -> f64;
}

/// Clock shared by the orchestrator, its stopwatch and its timer.
pub type SharedClock = Rc<dyn Clock>;

/// Monotonic wall-clock time.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Clock advanced explicitly by the render loop, one frame at a time.
///
/// Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    elapsed: Rc<Cell<f64>>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, dt: f64) {
        if dt > 0.0 {
            self.elapsed.set(self.elapsed.get() + dt);
        }
    }
}

impl Clock for FrameClock {
    fn now(&self) -> f64 {
        self.elapsed.get()
    }
}
