use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

use kenburns::executor::Job;
use kenburns::face::{FaceDetector, FaceRect};
use kenburns::host::{Completion, ImageSource, Renderer, SlideImage, SurfaceId, TransitionObserver};
use kenburns::{
    Error, Executor, FaceRecognitionMode, FrameClock, ImageAnimation, InlineExecutor,
    SlideshowConfig, TransitionOrchestrator, TransitionState,
};
use kurbo::{Rect, Size};

#[derive(Debug, Clone, PartialEq)]
struct Photo {
    name: &'static str,
    size: Size,
}

impl SlideImage for Photo {
    fn size(&self) -> Size {
        self.size
    }
}

fn photo(name: &'static str) -> Photo {
    Photo {
        name,
        size: Size::new(4000.0, 3000.0),
    }
}

struct Source {
    images: VecDeque<Photo>,
    requests: Rc<Cell<usize>>,
}

impl ImageSource<Photo> for Source {
    fn next_image(&mut self) -> Option<Photo> {
        self.requests.set(self.requests.get() + 1);
        self.images.pop_front()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Reset(SurfaceId),
    PanZoom {
        surface: SurfaceId,
        image: &'static str,
        animation: ImageAnimation,
    },
    Dissolve {
        from: SurfaceId,
        to: SurfaceId,
        duration: f64,
    },
    Pause(SurfaceId),
    Resume(SurfaceId),
    Stop,
    ShowFaces(SurfaceId, usize),
    ClearFaces(SurfaceId),
}

#[derive(Default)]
struct RecordingRenderer {
    calls: Vec<Call>,
}

impl RecordingRenderer {
    fn pan_zooms(&self) -> Vec<(SurfaceId, &'static str, ImageAnimation)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::PanZoom {
                    surface,
                    image,
                    animation,
                } => Some((*surface, *image, *animation)),
                _ => None,
            })
            .collect()
    }

    fn dissolves(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, Call::Dissolve { .. }))
            .count()
    }
}

impl Renderer<Photo> for RecordingRenderer {
    fn viewport_size(&self) -> Size {
        Size::new(1920.0, 1080.0)
    }

    fn reset_surfaces(&mut self, visible: SurfaceId) {
        self.calls.push(Call::Reset(visible));
    }

    fn apply_pan_zoom(
        &mut self,
        surface: SurfaceId,
        image: &Photo,
        animation: &ImageAnimation,
        _done: Completion,
    ) {
        self.calls.push(Call::PanZoom {
            surface,
            image: image.name,
            animation: *animation,
        });
    }

    fn cross_dissolve(&mut self, from: SurfaceId, to: SurfaceId, duration: f64, done: Completion) {
        self.calls.push(Call::Dissolve { from, to, duration });
        done.complete();
    }

    fn pause(&mut self, surface: SurfaceId) {
        self.calls.push(Call::Pause(surface));
    }

    fn resume(&mut self, surface: SurfaceId) {
        self.calls.push(Call::Resume(surface));
    }

    fn stop(&mut self) {
        self.calls.push(Call::Stop);
    }

    fn show_face_rectangles(&mut self, surface: SurfaceId, _image: &Photo, faces: &[FaceRect]) {
        self.calls.push(Call::ShowFaces(surface, faces.len()));
    }

    fn clear_face_rectangles(&mut self, surface: SurfaceId) {
        self.calls.push(Call::ClearFaces(surface));
    }
}

#[derive(Clone, Default)]
struct Log(Rc<RefCell<Vec<String>>>);

impl Log {
    fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

impl TransitionObserver<Photo> for Log {
    fn on_transition_start(&mut self, image: &Photo) {
        self.0.borrow_mut().push(format!("start:{}", image.name));
    }

    fn on_transition_finish(&mut self) {
        self.0.borrow_mut().push("finish".to_string());
    }
}

/// Holds jobs until the test runs them, to simulate slow computations.
#[derive(Clone, Default)]
struct ManualExecutor {
    jobs: Rc<RefCell<Vec<Job>>>,
}

impl ManualExecutor {
    fn run_all(&self) {
        let jobs: Vec<Job> = self.jobs.borrow_mut().drain(..).collect();
        for job in jobs {
            job();
        }
    }
}

impl Executor for ManualExecutor {
    fn spawn(&self, job: Job) {
        self.jobs.borrow_mut().push(job);
    }
}

fn config() -> SlideshowConfig {
    SlideshowConfig {
        scale_factor_deviation: 0.5,
        image_animation_duration: 10.0,
        image_animation_duration_deviation: 0.0,
        transition_animation_duration: 4.0,
        transition_animation_duration_deviation: 0.0,
        seed: Some(17),
        ..SlideshowConfig::default()
    }
}

struct Harness {
    clock: FrameClock,
    requests: Rc<Cell<usize>>,
    log: Log,
    slideshow: TransitionOrchestrator<Photo, RecordingRenderer>,
}

fn harness_with(
    config: SlideshowConfig,
    images: &[&'static str],
    executor: impl Executor + 'static,
) -> Harness {
    let clock = FrameClock::new();
    let requests = Rc::new(Cell::new(0));
    let log = Log::default();
    let source = Source {
        images: images.iter().copied().map(photo).collect(),
        requests: requests.clone(),
    };
    let slideshow = TransitionOrchestrator::new(
        config,
        source,
        RecordingRenderer::default(),
        Rc::new(clock.clone()),
        executor,
    )
    .with_observer(log.clone());
    Harness {
        clock,
        requests,
        log,
        slideshow,
    }
}

fn harness(images: &[&'static str]) -> Harness {
    harness_with(config(), images, InlineExecutor)
}

#[test]
fn invalid_durations_fail_before_any_side_effect() {
    let config = SlideshowConfig {
        image_animation_duration: 5.0,
        image_animation_duration_deviation: 0.0,
        transition_animation_duration: 10.0,
        transition_animation_duration_deviation: 0.0,
        ..config()
    };
    let mut h = harness_with(config, &["a"], InlineExecutor);

    let err = h.slideshow.start().unwrap_err();
    assert!(matches!(err, Error::InvalidDurations { .. }));
    assert!(err.is_fatal_configuration());
    assert_eq!(h.requests.get(), 0);
    assert!(h.slideshow.renderer().calls.is_empty());
    assert_eq!(h.slideshow.state(), TransitionState::Idle);
}

#[test]
fn missing_first_image_is_fatal() {
    let mut h = harness(&[]);
    assert!(matches!(h.slideshow.start(), Err(Error::NoFirstImage)));
    assert!(h.slideshow.renderer().calls.is_empty());
    assert_eq!(h.slideshow.state(), TransitionState::Stopped);
}

#[test]
fn face_mode_without_detector_is_fatal() {
    let config = SlideshowConfig {
        face_recognition_mode: FaceRecognitionMode::Group,
        ..config()
    };
    let mut h = harness_with(config, &["a"], InlineExecutor);
    assert!(matches!(h.slideshow.start(), Err(Error::MissingFaceDetector("group"))));
    assert_eq!(h.requests.get(), 0);
}

#[test]
fn start_resets_surfaces_and_animates_the_first_image() {
    let mut h = harness(&["a"]);
    h.slideshow.start().unwrap();
    assert_eq!(h.slideshow.renderer().calls[0], Call::Reset(SurfaceId::First));
    assert_eq!(h.slideshow.state(), TransitionState::Computing);

    h.slideshow.update();
    let pan_zooms = h.slideshow.renderer().pan_zooms();
    assert_eq!(pan_zooms.len(), 1);
    assert_eq!(pan_zooms[0].0, SurfaceId::First);
    assert_eq!(pan_zooms[0].1, "a");
    assert_eq!(pan_zooms[0].2.duration, 10.0);
    assert_eq!(h.slideshow.state(), TransitionState::Transitioning);
}

#[test]
fn computation_latency_is_subtracted_from_the_animation() {
    let mut h = harness(&["a", "b"]);
    h.slideshow.start().unwrap();
    h.clock.advance(0.75);
    h.slideshow.update();

    let animation = h.slideshow.renderer().pan_zooms()[0].2;
    assert!((animation.duration - 9.25).abs() < 1e-9);

    // cross-dissolve starts halfway through the 4s transition
    h.clock.advance(7.2);
    h.slideshow.update();
    assert_eq!(h.slideshow.renderer().dissolves(), 0);
    h.clock.advance(0.1);
    h.slideshow.update();
    assert_eq!(h.slideshow.renderer().dissolves(), 1);
}

#[test]
fn latency_past_the_duration_keeps_the_nominal_animation() {
    let mut h = harness(&["a"]);
    h.slideshow.start().unwrap();
    h.clock.advance(20.0);
    h.slideshow.update();
    assert_eq!(h.slideshow.renderer().pan_zooms()[0].2.duration, 10.0);
}

#[test]
fn transitions_follow_request_order_and_repeat_the_last_image() {
    let mut h = harness(&["a", "b", "c"]);
    h.slideshow.start().unwrap();
    h.slideshow.update();
    for _ in 0..4 {
        h.clock.advance(8.0);
        h.slideshow.update();
    }

    assert_eq!(
        h.log.entries(),
        vec![
            "start:b", "finish", "start:c", "finish", "start:c", "finish", "start:c", "finish"
        ]
    );

    let pan_zooms = h.slideshow.renderer().pan_zooms();
    let images: Vec<_> = pan_zooms.iter().map(|(_, image, _)| *image).collect();
    assert_eq!(images, vec!["a", "b", "c", "c", "c"]);
    let surfaces: Vec<_> = pan_zooms.iter().map(|(surface, _, _)| *surface).collect();
    assert_eq!(
        surfaces,
        vec![
            SurfaceId::First,
            SurfaceId::Second,
            SurfaceId::First,
            SurfaceId::Second,
            SurfaceId::First
        ]
    );

    let dissolves: Vec<_> = h
        .slideshow
        .renderer()
        .calls
        .iter()
        .filter_map(|call| match call {
            Call::Dissolve { from, to, duration } => Some((*from, *to, *duration)),
            _ => None,
        })
        .collect();
    assert_eq!(dissolves.len(), 4);
    assert_eq!(dissolves[0], (SurfaceId::First, SurfaceId::Second, 4.0));
    assert_eq!(dissolves[1], (SurfaceId::Second, SurfaceId::First, 4.0));
    assert_eq!(h.requests.get(), 5);
}

#[test]
fn stop_cancels_the_timer() {
    let mut h = harness(&["a", "b"]);
    h.slideshow.start().unwrap();
    h.slideshow.update();
    h.slideshow.stop();
    assert_eq!(h.slideshow.state(), TransitionState::Stopped);
    assert_eq!(h.slideshow.renderer().calls.last(), Some(&Call::Stop));

    h.clock.advance(100.0);
    h.slideshow.update();
    assert_eq!(h.slideshow.renderer().dissolves(), 0);
    assert!(h.log.entries().is_empty());
}

#[test]
fn results_finishing_after_stop_are_dropped() {
    let executor = ManualExecutor::default();
    let mut h = harness_with(config(), &["a"], executor.clone());
    h.slideshow.start().unwrap();
    h.slideshow.stop();

    executor.run_all();
    h.slideshow.update();
    assert!(h.slideshow.renderer().pan_zooms().is_empty());
    assert_eq!(h.slideshow.state(), TransitionState::Stopped);
}

#[test]
fn results_of_a_previous_run_are_dropped_after_restart() {
    let executor = ManualExecutor::default();
    let mut h = harness_with(config(), &["a", "b"], executor.clone());
    h.slideshow.start().unwrap();
    h.slideshow.start().unwrap();

    executor.run_all();
    h.slideshow.update();
    let pan_zooms = h.slideshow.renderer().pan_zooms();
    assert_eq!(pan_zooms.len(), 1);
    assert_eq!(pan_zooms[0].1, "b");
}

#[test]
fn restart_leaves_a_single_timer() {
    let mut h = harness(&["a", "b", "c"]);
    h.slideshow.start().unwrap();
    h.slideshow.update();
    h.slideshow.start().unwrap();
    h.slideshow.update();

    let calls = &h.slideshow.renderer().calls;
    assert!(calls.contains(&Call::Stop));
    assert_eq!(calls.iter().filter(|c| matches!(c, Call::Reset(_))).count(), 2);

    h.clock.advance(8.0);
    h.slideshow.update();
    assert_eq!(h.slideshow.renderer().dissolves(), 1);
    assert_eq!(h.log.entries(), vec!["start:c", "finish"]);
}

#[test]
fn pause_freezes_the_timer_until_resume() {
    let mut h = harness(&["a", "b"]);
    h.slideshow.start().unwrap();
    h.slideshow.update();

    h.clock.advance(3.0);
    h.slideshow.pause();
    h.slideshow.pause();
    assert!(h.slideshow.is_paused());
    let pauses = h
        .slideshow
        .renderer()
        .calls
        .iter()
        .filter(|c| matches!(c, Call::Pause(_)))
        .count();
    assert_eq!(pauses, 2);

    h.clock.advance(100.0);
    h.slideshow.update();
    assert_eq!(h.slideshow.renderer().dissolves(), 0);

    h.slideshow.resume();
    h.slideshow.resume();
    assert!(!h.slideshow.is_paused());
    assert!(h.slideshow.renderer().calls.contains(&Call::Resume(SurfaceId::Second)));

    h.clock.advance(4.5);
    h.slideshow.update();
    assert_eq!(h.slideshow.renderer().dissolves(), 0);
    h.clock.advance(0.5);
    h.slideshow.update();
    assert_eq!(h.slideshow.renderer().dissolves(), 1);
}

#[test]
fn pause_and_resume_without_a_run_do_nothing() {
    let mut h = harness(&["a"]);
    h.slideshow.pause();
    h.slideshow.resume();
    assert!(!h.slideshow.is_paused());
    assert!(h.slideshow.renderer().calls.is_empty());
}

#[test]
fn results_arriving_while_paused_wait_for_resume() {
    let executor = ManualExecutor::default();
    let mut h = harness_with(config(), &["a"], executor.clone());
    h.slideshow.start().unwrap();
    h.clock.advance(0.5);
    h.slideshow.pause();

    executor.run_all();
    h.slideshow.update();
    assert!(h.slideshow.renderer().pan_zooms().is_empty());

    h.clock.advance(30.0);
    h.slideshow.resume();
    let pan_zooms = h.slideshow.renderer().pan_zooms();
    assert_eq!(pan_zooms.len(), 1);
    assert!((pan_zooms[0].2.duration - 9.5).abs() < 1e-9);
}

#[test]
fn time_paused_during_computation_is_not_latency() {
    let executor = ManualExecutor::default();
    let mut h = harness_with(config(), &["a"], executor.clone());
    h.slideshow.start().unwrap();
    h.clock.advance(0.1);
    h.slideshow.pause();
    h.clock.advance(5.0);
    h.slideshow.resume();

    executor.run_all();
    h.clock.advance(0.1);
    h.slideshow.update();
    let pan_zooms = h.slideshow.renderer().pan_zooms();
    assert_eq!(pan_zooms.len(), 1);
    assert!((pan_zooms[0].2.duration - 9.8).abs() < 1e-9);
}

#[test]
fn long_pause_during_computation_keeps_compensating() {
    let executor = ManualExecutor::default();
    let mut h = harness_with(config(), &["a"], executor.clone());
    h.slideshow.start().unwrap();
    h.clock.advance(0.5);
    h.slideshow.pause();
    h.clock.advance(60.0);
    h.slideshow.resume();

    executor.run_all();
    h.slideshow.update();
    let pan_zooms = h.slideshow.renderer().pan_zooms();
    assert!((pan_zooms[0].2.duration - 9.5).abs() < 1e-9);
}

struct Grumpy;

impl TransitionObserver<Photo> for Grumpy {
    fn on_transition_start(&mut self, _image: &Photo) {
        panic!("observer failure");
    }
}

#[test]
fn observer_failures_do_not_stop_the_slideshow() {
    let clock = FrameClock::new();
    let mut images = vec![photo("a"), photo("b"), photo("c")].into_iter();
    let mut slideshow = TransitionOrchestrator::new(
        config(),
        move || images.next(),
        RecordingRenderer::default(),
        Rc::new(clock.clone()),
        InlineExecutor,
    )
    .with_observer(Grumpy);

    slideshow.start().unwrap();
    slideshow.update();
    for _ in 0..2 {
        clock.advance(8.0);
        slideshow.update();
    }
    assert_eq!(slideshow.renderer().dissolves(), 2);
    assert_eq!(slideshow.renderer().pan_zooms().len(), 3);
}

struct OneFace(FaceRect);

impl FaceDetector<Photo> for OneFace {
    fn all_faces(&self, _image: &Photo) -> Vec<FaceRect> {
        vec![self.0]
    }
}

fn face_centred(state: &kenburns::ImageState, face: FaceRect, image: Size) -> bool {
    let scaled_face = face.scale_from_origin(state.scale);
    let x = scaled_face.center().x - image.width * state.scale / 2.0 + state.position.x;
    let y = scaled_face.center().y - image.height * state.scale / 2.0 + state.position.y;
    x.abs() < 1e-6 && y.abs() < 1e-6
}

#[test]
fn biggest_face_mode_anchors_one_endpoint_on_the_face() {
    // 10% of a 4000x3000 image
    let face = Rect::new(1500.0, 1000.0, 2595.0, 2096.0);
    let config = SlideshowConfig {
        face_recognition_mode: FaceRecognitionMode::Biggest,
        show_face_rectangles: true,
        ..config()
    };
    let clock = FrameClock::new();
    let images: Vec<Photo> = (0..20).map(|_| photo("face")).collect();
    let mut images = images.into_iter();
    let mut slideshow = TransitionOrchestrator::new(
        config,
        move || images.next(),
        RecordingRenderer::default(),
        Rc::new(clock.clone()),
        InlineExecutor,
    )
    .with_face_detector(Arc::new(OneFace(face)));

    slideshow.start().unwrap();
    slideshow.update();
    for _ in 0..10 {
        clock.advance(8.0);
        slideshow.update();
    }

    let renderer = slideshow.renderer();
    let pan_zooms = renderer.pan_zooms();
    assert_eq!(pan_zooms.len(), 11);
    for (_, _, animation) in &pan_zooms {
        let image = photo("face").size;
        assert!(
            face_centred(&animation.start_state, face, image)
                || face_centred(&animation.end_state, face, image)
        );
    }

    assert!(renderer.calls.contains(&Call::ShowFaces(SurfaceId::First, 1)));
    assert!(renderer.calls.contains(&Call::ClearFaces(SurfaceId::First)));
}

#[test]
fn face_overlay_works_without_face_anchoring() {
    let face = Rect::new(100.0, 100.0, 300.0, 400.0);
    let config = SlideshowConfig {
        face_recognition_mode: FaceRecognitionMode::None,
        show_face_rectangles: true,
        ..config()
    };
    let clock = FrameClock::new();
    let mut images = vec![photo("a")].into_iter();
    let mut slideshow = TransitionOrchestrator::new(
        config,
        move || images.next(),
        RecordingRenderer::default(),
        Rc::new(clock.clone()),
        InlineExecutor,
    )
    .with_face_detector(Arc::new(OneFace(face)));

    slideshow.start().unwrap();
    slideshow.update();
    let calls = &slideshow.renderer().calls;
    assert_eq!(
        calls.iter().filter(|c| matches!(c, Call::ShowFaces(..))).count(),
        1
    );
    assert!(calls.contains(&Call::ShowFaces(SurfaceId::First, 1)));
}

#[test]
fn face_overlay_stays_off_unless_requested() {
    let clock = FrameClock::new();
    let mut images = vec![photo("a")].into_iter();
    let mut slideshow = TransitionOrchestrator::new(
        config(),
        move || images.next(),
        RecordingRenderer::default(),
        Rc::new(clock.clone()),
        InlineExecutor,
    )
    .with_face_detector(Arc::new(OneFace(Rect::new(0.0, 0.0, 10.0, 10.0))));

    slideshow.start().unwrap();
    slideshow.update();
    assert!(
        !slideshow
            .renderer()
            .calls
            .iter()
            .any(|c| matches!(c, Call::ShowFaces(..)))
    );
}
