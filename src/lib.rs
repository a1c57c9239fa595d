//! Endless Ken Burns slideshow.
//!
//! Every image pans and zooms across a fixed viewport, then cross-dissolves
//! into the next one. The crate computes the random pan/zoom parameters
//! (optionally anchored on faces) and schedules the transitions; images,
//! face detection, drawing and lifecycle notifications come from the host
//! through the traits in [`host`] and [`face`].
//!
//! ```no_run
//! use std::rc::Rc;
//! # use kenburns::{host::*, animation::ImageAnimation};
//! # use kurbo::Size;
//! # struct MyRenderer;
//! # impl Renderer<Size> for MyRenderer {
//! #     fn viewport_size(&self) -> Size { Size::new(1920.0, 1080.0) }
//! #     fn reset_surfaces(&mut self, _: SurfaceId) {}
//! #     fn apply_pan_zoom(&mut self, _: SurfaceId, _: &Size, _: &ImageAnimation, _: Completion) {}
//! #     fn cross_dissolve(&mut self, _: SurfaceId, _: SurfaceId, _: f64, _: Completion) {}
//! #     fn pause(&mut self, _: SurfaceId) {}
//! #     fn resume(&mut self, _: SurfaceId) {}
//! #     fn stop(&mut self) {}
//! # }
//! use kenburns::{BackgroundExecutor, FrameClock, SlideshowConfig, TransitionOrchestrator};
//!
//! let clock = FrameClock::new();
//! let mut images = vec![Size::new(4000.0, 3000.0)].into_iter();
//! let mut slideshow = TransitionOrchestrator::new(
//!     SlideshowConfig::default(),
//!     move || images.next(),
//!     MyRenderer,
//!     Rc::new(clock.clone()),
//!     BackgroundExecutor::new(None)?,
//! );
//! slideshow.start()?;
//! for _frame in 0..600 {
//!     clock.advance(1.0 / 60.0);
//!     slideshow.update();
//! }
//! # Ok::<(), kenburns::Error>(())
//! ```

pub mod animation;
pub mod calculator;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod executor;
pub mod face;
pub mod host;
pub mod orchestrator;
pub mod provider;
pub mod random;
pub mod state;
pub mod stopwatch;
pub mod timer;

#[cfg(feature = "detection")]
pub mod subject_detection;
#[cfg(feature = "viewer")]
pub mod viewer;

pub use animation::{ImageAnimation, ImageState};
pub use clock::{Clock, FrameClock, SharedClock, SystemClock};
pub use config::{FaceRecognitionMode, SlideshowConfig};
pub use error::{Error, Result};
pub use executor::{BackgroundExecutor, Executor, InlineExecutor};
pub use orchestrator::TransitionOrchestrator;
pub use state::TransitionState;
