//! The transition scheduler.
//!
//! [`TransitionOrchestrator`] lives on the interactive thread and is pumped
//! by the host once per frame through [`TransitionOrchestrator::update`].
//! Animation parameters are computed on an [`Executor`]; results, timer fires
//! and renderer completions all come back through one inbox and are tagged
//! with the run generation, so anything belonging to a stopped run is
//! dropped on arrival.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

use tracing::{debug, info, trace, warn};

use crate::animation::ImageAnimation;
use crate::clock::SharedClock;
use crate::config::SlideshowConfig;
use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::face::{FaceDetector, FaceRect};
use crate::host::{Completion, ImageSource, Renderer, SlideImage, SurfaceId, TransitionObserver};
use crate::provider::AnimationSequenceProvider;
use crate::random::{RandomGenerator, SeededRandom, ThreadRandom, jitter};
use crate::state::TransitionState;
use crate::stopwatch::StopWatch;
use crate::timer::PausableTimer;

enum Event<I> {
    Computed { generation: u64, computed: Computed<I> },
    TimerFired { generation: u64 },
    PanZoomFinished { generation: u64, surface: SurfaceId },
    DissolveFinished { generation: u64, from: SurfaceId },
}

struct Computed<I> {
    image: I,
    surface: SurfaceId,
    animation: ImageAnimation,
    faces: Vec<FaceRect>,
}

/// Image on screen, waiting for the timer to cross-dissolve away from it.
struct Armed<I> {
    image: I,
    surface: SurfaceId,
    transition_duration: f64,
}

struct Run<I> {
    generation: u64,
    config: SlideshowConfig,
    provider: Arc<AnimationSequenceProvider<I>>,
    stop_watch: StopWatch,
    timer: Option<PausableTimer>,
    armed: Option<Armed<I>>,
    // result that arrived while paused, with the latency measured on arrival
    parked: Option<(Computed<I>, f64)>,
    paused: bool,
}

pub struct TransitionOrchestrator<I, R> {
    config: SlideshowConfig,
    clock: SharedClock,
    source: Box<dyn ImageSource<I>>,
    renderer: R,
    observer: Option<Box<dyn TransitionObserver<I>>>,
    detector: Option<Arc<dyn FaceDetector<I>>>,
    executor: Box<dyn Executor>,
    rng: Arc<dyn RandomGenerator>,
    inbox_tx: Sender<Event<I>>,
    inbox: Receiver<Event<I>>,
    generation: u64,
    state: TransitionState,
    run: Option<Run<I>>,
}

impl<I, R> TransitionOrchestrator<I, R>
where
    I: SlideImage + Clone + Send + 'static,
    R: Renderer<I>,
{
    pub fn new(
        config: SlideshowConfig,
        source: impl ImageSource<I> + 'static,
        renderer: R,
        clock: SharedClock,
        executor: impl Executor + 'static,
    ) -> Self {
        let rng: Arc<dyn RandomGenerator> = match config.seed {
            Some(seed) => Arc::new(SeededRandom::new(seed)),
            None => Arc::new(ThreadRandom),
        };
        let (inbox_tx, inbox) = mpsc::channel();
        Self {
            config,
            clock,
            source: Box::new(source),
            renderer,
            observer: None,
            detector: None,
            executor: Box::new(executor),
            rng,
            inbox_tx,
            inbox,
            generation: 0,
            state: TransitionState::Idle,
            run: None,
        }
    }

    pub fn with_observer(mut self, observer: impl TransitionObserver<I> + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn with_face_detector(mut self, detector: Arc<dyn FaceDetector<I>>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.run.as_ref().is_some_and(|run| run.paused)
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Starts a new run, stopping the current one first.
    ///
    /// Fails before touching the renderer when the configuration is invalid
    /// or the source has no first image.
    pub fn start(&mut self) -> Result<()> {
        self.stop();

        let config = self.config.clone();
        config.validate()?;
        let provider = AnimationSequenceProvider::new(
            config.face_recognition_mode,
            config.animation_dependencies(),
            self.detector.clone(),
            self.rng.clone(),
        )?;

        self.state = TransitionState::Requesting;
        let Some(image) = self.source.next_image() else {
            self.state = TransitionState::Stopped;
            return Err(Error::NoFirstImage);
        };

        self.renderer.reset_surfaces(SurfaceId::First);
        self.generation += 1;
        info!(
            generation = self.generation,
            mode = config.face_recognition_mode.name(),
            "slideshow started"
        );
        self.run = Some(Run {
            generation: self.generation,
            config,
            provider: Arc::new(provider),
            stop_watch: StopWatch::new(self.clock.clone()),
            timer: None,
            armed: None,
            parked: None,
            paused: false,
        });
        self.dispatch(image, SurfaceId::First);
        Ok(())
    }

    /// Cancels the timer and halts the renderer. A computation still running
    /// in the background finishes, but its result is dropped.
    pub fn stop(&mut self) {
        let Some(mut run) = self.run.take() else {
            return;
        };
        if let Some(timer) = run.timer.as_mut() {
            timer.cancel();
        }
        self.renderer.stop();
        self.state = TransitionState::Stopped;
        info!(generation = run.generation, "slideshow stopped");
    }

    pub fn pause(&mut self) {
        let Some(run) = self.run.as_mut() else {
            return;
        };
        if run.paused {
            return;
        }
        run.paused = true;
        if self.state == TransitionState::Computing {
            run.stop_watch.pause();
        }
        self.renderer.pause(SurfaceId::First);
        self.renderer.pause(SurfaceId::Second);
        if let Some(timer) = run.timer.as_mut() {
            timer.pause();
        }
        debug!(generation = run.generation, "slideshow paused");
    }

    pub fn resume(&mut self) {
        let Some(run) = self.run.as_mut() else {
            return;
        };
        if !run.paused {
            return;
        }
        run.paused = false;
        run.stop_watch.resume();
        self.renderer.resume(SurfaceId::First);
        self.renderer.resume(SurfaceId::Second);
        if let Some(timer) = run.timer.as_mut() {
            timer.resume();
        }
        debug!(generation = run.generation, "slideshow resumed");

        if let Some((computed, latency)) = run.parked.take() {
            self.apply(computed, latency);
        }
    }

    /// Fires a due timer and handles everything that arrived since the last
    /// call. Call once per frame.
    pub fn update(&mut self) {
        if let Some(timer) = self.run.as_mut().and_then(|run| run.timer.as_mut()) {
            timer.poll();
        }
        while let Ok(event) = self.inbox.try_recv() {
            self.handle(event);
        }
    }

    fn handle(&mut self, event: Event<I>) {
        match event {
            Event::Computed {
                generation,
                computed,
            } => self.on_computed(generation, computed),
            Event::TimerFired { generation } => self.on_timer_fired(generation),
            Event::PanZoomFinished {
                generation,
                surface,
            } => {
                if self.is_current(generation) {
                    trace!(generation, ?surface, "pan/zoom finished");
                }
            }
            Event::DissolveFinished { generation, from } => {
                if self.is_current(generation) {
                    self.renderer.clear_face_rectangles(from);
                    self.notify(|observer| observer.on_transition_finish());
                    debug!(generation, ?from, "transition finished");
                }
            }
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.run.as_ref().is_some_and(|run| run.generation == generation)
    }

    fn dispatch(&mut self, image: I, surface: SurfaceId) {
        let Some(run) = self.run.as_mut() else {
            return;
        };
        self.state = TransitionState::Computing;

        let provider = run.provider.clone();
        let generation = run.generation;
        // the overlay shows every face whatever drives the pan
        let overlay = self
            .detector
            .clone()
            .filter(|_| run.config.show_face_rectangles);
        let viewport = self.renderer.viewport_size();
        let tx = self.inbox_tx.clone();

        trace!(generation, ?surface, "computing animation parameters");
        run.stop_watch.start();
        self.executor.spawn(Box::new(move || {
            let animation = provider.build_animation(&image, viewport);
            let faces = overlay
                .map(|detector| detector.all_faces(&image))
                .unwrap_or_default();
            let computed = Computed {
                image,
                surface,
                animation,
                faces,
            };
            // receiver gone means the orchestrator itself was dropped
            let _ = tx.send(Event::Computed {
                generation,
                computed,
            });
        }));
    }

    fn on_computed(&mut self, generation: u64, computed: Computed<I>) {
        let Some(run) = self.run.as_mut().filter(|run| run.generation == generation) else {
            trace!(generation, "dropping animation parameters of a stopped run");
            return;
        };
        let latency = run.stop_watch.duration();
        if run.paused {
            debug!(generation, latency, "parameters ready while paused, parking them");
            run.parked = Some((computed, latency));
            return;
        }
        self.apply(computed, latency);
    }

    fn apply(&mut self, computed: Computed<I>, latency: f64) {
        let Some(run) = self.run.as_mut() else {
            return;
        };
        self.state = TransitionState::Compensating;

        let Computed {
            image,
            surface,
            animation,
            faces,
        } = computed;
        let animation = match animation.compensated(latency) {
            Ok(corrected) => corrected,
            Err(err) => {
                warn!(error = %err, "keeping the nominal duration");
                animation
            }
        };

        let generation = run.generation;
        let tx = self.inbox_tx.clone();
        self.renderer.apply_pan_zoom(
            surface,
            &image,
            &animation,
            Completion::new(move || {
                let _ = tx.send(Event::PanZoomFinished {
                    generation,
                    surface,
                });
            }),
        );
        if !faces.is_empty() {
            self.renderer.show_face_rectangles(surface, &image, &faces);
        }

        let transition_duration = jitter(
            self.rng.as_ref(),
            run.config.transition_animation_duration,
            run.config.transition_animation_duration_deviation,
        );
        let delay = (animation.duration - transition_duration / 2.0).max(0.0);
        let tx = self.inbox_tx.clone();
        run.timer = Some(PausableTimer::start(self.clock.clone(), delay, move || {
            let _ = tx.send(Event::TimerFired { generation });
        }));
        run.armed = Some(Armed {
            image,
            surface,
            transition_duration,
        });
        self.state = TransitionState::Transitioning;
        debug!(
            generation,
            ?surface,
            latency,
            duration = animation.duration,
            delay,
            "pan/zoom started"
        );
    }

    fn on_timer_fired(&mut self, generation: u64) {
        let Some(run) = self.run.as_mut().filter(|run| run.generation == generation) else {
            return;
        };
        run.timer = None;
        let Some(Armed {
            image,
            surface,
            transition_duration,
        }) = run.armed.take()
        else {
            return;
        };

        self.state = TransitionState::Requesting;
        let next_image = match self.source.next_image() {
            Some(next) => next,
            None => {
                debug!(generation, "image source exhausted, repeating the current image");
                image
            }
        };

        self.notify(|observer| observer.on_transition_start(&next_image));

        let next_surface = surface.other();
        let tx = self.inbox_tx.clone();
        self.renderer.cross_dissolve(
            surface,
            next_surface,
            transition_duration,
            Completion::new(move || {
                let _ = tx.send(Event::DissolveFinished {
                    generation,
                    from: surface,
                });
            }),
        );
        debug!(generation, from = ?surface, duration = transition_duration, "transition started");

        self.dispatch(next_image, next_surface);
    }

    fn notify(&mut self, f: impl FnOnce(&mut dyn TransitionObserver<I>)) {
        let Some(observer) = self.observer.as_mut() else {
            return;
        };
        if panic::catch_unwind(AssertUnwindSafe(|| f(observer.as_mut()))).is_err() {
            warn!("transition observer panicked, ignoring");
        }
    }
}
