#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TransitionState {
    Idle,          // Never started
    Requesting,    // Asking the image source for the next image
    Computing,     // Animation parameters are being built in the background
    Compensating,  // Result received, correcting the duration for computation latency
    Transitioning, // Pan/zoom running, timer armed for the cross-dissolve
    Stopped,       // Run stopped, late results are dropped
}
