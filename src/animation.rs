use kurbo::Vec2;

use crate::error::{Error, Result};

/// One endpoint of a pan/zoom transform.
///
/// `position` is the offset of the scaled image's centre from the viewport
/// centre, in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageState {
    pub scale: f64,
    pub position: Vec2,
}

impl ImageState {
    pub fn new(scale: f64, position: Vec2) -> Self {
        Self { scale, position }
    }

    /// Linear interpolation towards `end`, `t` clamped to `[0, 1]`.
    pub fn lerp(&self, end: &ImageState, t: f64) -> ImageState {
        let t = t.clamp(0.0, 1.0);
        ImageState {
            scale: self.scale + (end.scale - self.scale) * t,
            position: self.position.lerp(end.position, t),
        }
    }
}

/// Everything the renderer needs to pan and zoom one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageAnimation {
    pub start_state: ImageState,
    pub end_state: ImageState,
    pub duration: f64,
}

impl ImageAnimation {
    pub fn new(start_state: ImageState, end_state: ImageState, duration: f64) -> Self {
        Self {
            start_state,
            end_state,
            duration,
        }
    }

    /// Copy shortened by the time already spent computing it.
    ///
    /// Rejected when nothing of the animation would be left.
    pub fn compensated(&self, latency: f64) -> Result<ImageAnimation> {
        let latency = latency.max(0.0);
        if latency >= self.duration {
            return Err(Error::LatencyExceedsDuration {
                latency,
                duration: self.duration,
            });
        }
        Ok(ImageAnimation {
            duration: self.duration - latency,
            ..*self
        })
    }

    /// Transform at `elapsed` seconds into the animation.
    pub fn state_at(&self, elapsed: f64) -> ImageState {
        let t = if self.duration > 0.0 {
            elapsed / self.duration
        } else {
            1.0
        };
        self.start_state.lerp(&self.end_state, t)
    }
}
