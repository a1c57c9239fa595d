//! What the host environment plugs into the orchestrator.

use std::fmt;

use kurbo::Size;

use crate::animation::ImageAnimation;
use crate::face::FaceRect;

/// An image the slideshow can show.
pub trait SlideImage {
    /// Size in pixels.
    fn size(&self) -> Size;
}

impl SlideImage for Size {
    fn size(&self) -> Size {
        *self
    }
}

/// Supplies the images, one per transition.
pub trait ImageSource<I> {
    /// `None` repeats the previous image.
    fn next_image(&mut self) -> Option<I>;
}

impl<I, F> ImageSource<I> for F
where
    F: FnMut() -> Option<I>,
{
    fn next_image(&mut self) -> Option<I> {
        self()
    }
}

/// The two image layers; their roles swap at every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceId {
    First,
    Second,
}

impl SurfaceId {
    pub fn other(self) -> SurfaceId {
        match self {
            SurfaceId::First => SurfaceId::Second,
            SurfaceId::Second => SurfaceId::First,
        }
    }
}

/// Single-use handle the renderer completes when an animation ends.
pub struct Completion(Box<dyn FnOnce() + Send>);

impl Completion {
    pub fn new(f: impl FnOnce() + Send + 'static) -> Self {
        Self(Box::new(f))
    }

    pub fn complete(self) {
        (self.0)()
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Completion")
    }
}

/// Draws the surfaces. All calls happen on the interactive thread.
pub trait Renderer<I> {
    fn viewport_size(&self) -> Size;

    /// `visible` fully opaque, the other surface fully transparent, no
    /// animation running.
    fn reset_surfaces(&mut self, visible: SurfaceId);

    /// Shows `image` on `surface` and pans/zooms it from the start to the end
    /// state over `animation.duration`.
    fn apply_pan_zoom(
        &mut self,
        surface: SurfaceId,
        image: &I,
        animation: &ImageAnimation,
        done: Completion,
    );

    /// Fades `from` out and `to` in over `duration` seconds.
    fn cross_dissolve(&mut self, from: SurfaceId, to: SurfaceId, duration: f64, done: Completion);

    /// Freezes the surface's animations where they are.
    fn pause(&mut self, surface: SurfaceId);

    fn resume(&mut self, surface: SurfaceId);

    /// Halts every running animation.
    fn stop(&mut self);

    fn show_face_rectangles(&mut self, _surface: SurfaceId, _image: &I, _faces: &[FaceRect]) {}

    fn clear_face_rectangles(&mut self, _surface: SurfaceId) {}
}

/// Lifecycle notifications. Best effort: panics are caught and logged.
pub trait TransitionObserver<I> {
    /// Called when a cross-dissolve begins, with the image fading in.
    fn on_transition_start(&mut self, _image: &I) {}

    fn on_transition_finish(&mut self) {}
}
