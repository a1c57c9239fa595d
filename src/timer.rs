use tracing::trace;

use crate::clock::SharedClock;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerState {
    Armed { fire_at: f64 },
    Paused { remaining: f64 },
    Fired,
    Cancelled,
}

/// One-shot delay that can be paused, resumed and cancelled.
///
/// The timer is polled from the interactive loop; it never spawns threads.
/// A fresh timer is created for every transition.
pub struct PausableTimer {
    clock: SharedClock,
    state: TimerState,
    callback: Option<Box<dyn FnOnce()>>,
}

impl PausableTimer {
    pub fn start(clock: SharedClock, delay: f64, callback: impl FnOnce() + 'static) -> Self {
        let fire_at = clock.now() + delay.max(0.0);
        trace!(delay, fire_at, "timer armed");
        Self {
            clock,
            state: TimerState::Armed { fire_at },
            callback: Some(Box::new(callback)),
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Time left before firing, `None` once fired or cancelled.
    pub fn remaining(&self) -> Option<f64> {
        match self.state {
            TimerState::Armed { fire_at } => Some((fire_at - self.clock.now()).max(0.0)),
            TimerState::Paused { remaining } => Some(remaining),
            TimerState::Fired | TimerState::Cancelled => None,
        }
    }

    /// Fires the callback if the deadline has passed. Returns whether it fired.
    pub fn poll(&mut self) -> bool {
        let TimerState::Armed { fire_at } = self.state else {
            return false;
        };
        if self.clock.now() < fire_at {
            return false;
        }

        self.state = TimerState::Fired;
        if let Some(callback) = self.callback.take() {
            callback();
        }
        true
    }

    pub fn pause(&mut self) {
        if let TimerState::Armed { fire_at } = self.state {
            let remaining = (fire_at - self.clock.now()).max(0.0);
            trace!(remaining, "timer paused");
            self.state = TimerState::Paused { remaining };
        }
    }

    pub fn resume(&mut self) {
        if let TimerState::Paused { remaining } = self.state {
            trace!(remaining, "timer resumed");
            self.state = TimerState::Armed {
                fire_at: self.clock.now() + remaining,
            };
        }
    }

    /// Drops the callback; it will never run.
    pub fn cancel(&mut self) {
        self.callback = None;
        if !matches!(self.state, TimerState::Fired) {
            self.state = TimerState::Cancelled;
        }
    }
}
