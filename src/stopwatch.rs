use crate::clock::SharedClock;

/// Measures how long the background parameter computation took.
///
/// Time spent paused is not counted.
pub struct StopWatch {
    clock: SharedClock,
    started_at: Option<f64>,
    paused_at: Option<f64>,
    paused_total: f64,
}

impl StopWatch {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            clock,
            started_at: None,
            paused_at: None,
            paused_total: 0.0,
        }
    }

    /// Sets the reference point; calling again resets it.
    pub fn start(&mut self) {
        self.started_at = Some(self.clock.now());
        self.paused_at = None;
        self.paused_total = 0.0;
    }

    /// Stops counting until `resume()`. No-op if not started or already paused.
    pub fn pause(&mut self) {
        if self.started_at.is_some() && self.paused_at.is_none() {
            self.paused_at = Some(self.clock.now());
        }
    }

    pub fn resume(&mut self) {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total += (self.clock.now() - paused_at).max(0.0);
        }
    }

    /// Seconds counted since the last `start()`, 0 if never started.
    pub fn duration(&self) -> f64 {
        let Some(started_at) = self.started_at else {
            return 0.0;
        };
        let end = self.paused_at.unwrap_or_else(|| self.clock.now());
        (end - started_at - self.paused_total).max(0.0)
    }
}
