use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use kurbo::Size;
use raylib::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kenburns::constants::*;
use kenburns::host::ImageSource;
use kenburns::viewer::Photo;
use kenburns::viewer::ffmpeg::Ffmpeg;
use kenburns::viewer::library::PhotoLibrary;
use kenburns::viewer::renderer::RaylibRenderer;
use kenburns::viewer::texture_loader::{load_sorted_image_paths, load_texture_with_exif_rotation};
use kenburns::{
    BackgroundExecutor, FrameClock, SharedClock, SlideshowConfig, SystemClock,
    TransitionOrchestrator,
};

/// Endless Ken Burns slideshow over a directory of photos.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Directory with the photos to show
    directory: PathBuf,

    /// Start over after the last photo instead of lingering on it
    #[arg(long = "loop")]
    looping: bool,

    /// Render at a fixed frame rate into this MP4 file
    #[arg(long, value_name = "FILE")]
    record: Option<PathBuf>,

    /// Window width
    #[arg(long, default_value_t = RENDER_WIDTH / 2)]
    width: i32,

    /// Window height
    #[arg(long, default_value_t = RENDER_HEIGHT / 2)]
    height: i32,

    #[command(flatten)]
    slideshow: SlideshowConfig,
}

fn load_photos(
    rl: &mut RaylibHandle,
    thread: &RaylibThread,
    cli: &Cli,
    viewport: Size,
) -> Result<(Vec<Texture2D>, Vec<Photo>)> {
    let mut textures = Vec::new();
    let mut photos = Vec::new();
    for path in load_sorted_image_paths(&cli.directory)? {
        match load_texture_with_exif_rotation(rl, thread, &path) {
            Ok(texture) => {
                let pixel_size = Size::new(texture.width() as f64, texture.height() as f64);
                photos.push(Photo::new(textures.len(), path, pixel_size, viewport));
                textures.push(texture);
            }
            Err(e) => warn!(error = format!("{e:#}"), "skipping photo"),
        }
    }
    if photos.is_empty() {
        bail!("no photo could be loaded from {}", cli.directory.display());
    }
    info!(photos = photos.len(), directory = %cli.directory.display(), "photos loaded");
    Ok((textures, photos))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kenburns=info")),
        )
        .init();

    let cli = Cli::parse();
    cli.slideshow.validate()?;

    let (mut rl, thread) = raylib::init()
        .size(cli.width, cli.height)
        .title("Ken Burns Slideshow")
        .vsync()
        .resizable()
        .build();
    rl.set_target_fps(FPS);
    rl.set_trace_log(TraceLogLevel::LOG_ERROR);

    let viewport = Size::new(RENDER_WIDTH as f64, RENDER_HEIGHT as f64);
    let (textures, photos) = load_photos(&mut rl, &thread, &cli, viewport)?;

    let library = Rc::new(RefCell::new(PhotoLibrary::new(photos, cli.looping)));
    let source = {
        let library = library.clone();
        move || library.borrow_mut().next_image()
    };

    // recording renders every frame at a fixed step regardless of wall time
    let frame_clock = FrameClock::new();
    let recording = cli.record.is_some();
    let clock: SharedClock = if recording {
        Rc::new(frame_clock.clone())
    } else {
        Rc::new(SystemClock::new())
    };

    #[cfg(feature = "detection")]
    let detector = {
        use kenburns::FaceRecognitionMode;
        use kenburns::subject_detection::{DEFAULT_MODEL_FILE, YoloFaceDetector};

        let wanted = cli.slideshow.face_recognition_mode != FaceRecognitionMode::None
            || cli.slideshow.show_face_rectangles;
        if wanted {
            let detector: std::sync::Arc<dyn kenburns::face::FaceDetector<Photo>> =
                std::sync::Arc::new(YoloFaceDetector::new(DEFAULT_MODEL_FILE, vec![0])?);
            Some(detector)
        } else {
            None
        }
    };

    let slideshow = TransitionOrchestrator::new(
        cli.slideshow.clone(),
        source,
        RaylibRenderer::new(textures, viewport),
        clock,
        BackgroundExecutor::new(None)?,
    );
    #[cfg(feature = "detection")]
    let slideshow = match detector {
        Some(detector) => slideshow.with_face_detector(detector),
        None => slideshow,
    };
    let mut slideshow = slideshow;
    slideshow.start()?;

    let mut ffmpeg = cli
        .record
        .as_deref()
        .map(|path| Ffmpeg::new(RENDER_WIDTH, RENDER_HEIGHT, FPS, path))
        .transpose()?;

    let mut framebuffer = rl
        .load_render_texture(&thread, RENDER_WIDTH as u32, RENDER_HEIGHT as u32)
        .map_err(|e| anyhow::anyhow!("failed to create render texture: {e}"))?;

    let mut user_paused = false;
    while !rl.window_should_close() {
        if rl.is_key_pressed(KeyboardKey::KEY_SPACE) {
            user_paused = !user_paused;
            info!(paused = user_paused, "pause toggled");
        }
        if rl.is_key_pressed(KeyboardKey::KEY_R) {
            info!("restarting slideshow");
            library.borrow_mut().rewind();
            slideshow.start()?;
            user_paused = false;
        }

        // the recorder keeps going in the background
        let paused = user_paused || (!recording && !rl.is_window_focused());
        if paused && !slideshow.is_paused() {
            slideshow.pause();
        } else if !paused && slideshow.is_paused() {
            slideshow.resume();
        }

        let dt = if recording {
            FRAME_TIME
        } else {
            rl.get_frame_time() as f64
        };
        frame_clock.advance(dt);
        slideshow.update();
        slideshow.renderer_mut().update(dt);

        rl.draw_texture_mode(&thread, &mut framebuffer, |mut tmd| {
            let mut d = tmd.begin_drawing(&thread);
            slideshow.renderer().draw(&mut d);
        });

        let mut d = rl.begin_drawing(&thread);
        let sw = d.get_screen_width() as f32;
        let sh = d.get_screen_height() as f32;
        d.draw_texture_pro(
            &framebuffer,
            Rectangle::new(0.0, 0.0, framebuffer.width() as f32, -(framebuffer.height() as f32)),
            Rectangle::new(0.0, 0.0, sw, sh),
            Vector2::new(0.0, 0.0),
            0.0,
            Color::WHITE,
        );
        drop(d);

        if let Some(ffmpeg) = ffmpeg.as_mut() {
            let image = framebuffer
                .load_image()
                .map_err(|e| anyhow::anyhow!("failed to read back frame: {e}"))?;
            ffmpeg.write(&image).context("recording stopped")?;
        }
    }

    slideshow.stop();
    info!("slideshow closed");
    Ok(())
}
