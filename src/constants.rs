pub const RENDER_WIDTH: i32 = 1920;           // Width of the render texture
pub const RENDER_HEIGHT: i32 = 1080;          // Height of the render texture
pub const FPS: u32 = 60;                      // Frames per second
pub const FRAME_TIME: f64 = 1.0 / FPS as f64; // Time per frame when recording (seconds)

pub const SCALE_FACTOR_DEVIATION: f64 = 1.0;          // Scale may grow up to 1.0 + deviation over the cover scale
pub const IMAGE_ANIMATION_DURATION: f64 = 10.0;       // Pan/zoom duration of one image (seconds)
pub const IMAGE_ANIMATION_DURATION_DEVIATION: f64 = 0.0;
pub const TRANSITION_ANIMATION_DURATION: f64 = 4.0;   // Cross-dissolve duration (seconds)
pub const TRANSITION_ANIMATION_DURATION_DEVIATION: f64 = 0.0;

pub const MIN_DURATION: f64 = 0.001;          // Floor for jittered durations (seconds)
