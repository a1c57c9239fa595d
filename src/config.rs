use clap::{Args, ValueEnum};

use crate::constants::*;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FaceRecognitionMode {
    /// Plain Ken Burns effect.
    #[default]
    None,
    /// Start or finish the pan on the biggest face found in the image.
    Biggest,
    /// Start or finish the pan on the rectangle enclosing all faces.
    Group,
}

impl FaceRecognitionMode {
    pub fn name(self) -> &'static str {
        match self {
            FaceRecognitionMode::None => "none",
            FaceRecognitionMode::Biggest => "biggest",
            FaceRecognitionMode::Group => "group",
        }
    }
}

/// Animation settings of a slideshow run.
#[derive(Debug, Clone, PartialEq, Args)]
pub struct SlideshowConfig {
    /// Face recognition mode used to anchor the pan.
    #[arg(long, value_enum, default_value_t = FaceRecognitionMode::None)]
    pub face_recognition_mode: FaceRecognitionMode,

    /// Allowed scale deviation: 0.5 lets the zoom vary from 1.0 to 1.5.
    #[arg(long, default_value_t = SCALE_FACTOR_DEVIATION)]
    pub scale_factor_deviation: f64,

    /// Pan/zoom duration of one image, in seconds.
    #[arg(long, default_value_t = IMAGE_ANIMATION_DURATION)]
    pub image_animation_duration: f64,

    /// Allowed deviation of the image animation duration, in seconds.
    #[arg(long, default_value_t = IMAGE_ANIMATION_DURATION_DEVIATION)]
    pub image_animation_duration_deviation: f64,

    /// Cross-dissolve duration between two images, in seconds.
    #[arg(long, default_value_t = TRANSITION_ANIMATION_DURATION)]
    pub transition_animation_duration: f64,

    /// Allowed deviation of the cross-dissolve duration, in seconds.
    #[arg(long, default_value_t = TRANSITION_ANIMATION_DURATION_DEVIATION)]
    pub transition_animation_duration_deviation: f64,

    /// Draw the detected faces on top of the images (debugging aid).
    #[arg(long)]
    pub show_face_rectangles: bool,

    /// Seed for reproducible animations.
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Default for SlideshowConfig {
    fn default() -> Self {
        Self {
            face_recognition_mode: FaceRecognitionMode::None,
            scale_factor_deviation: SCALE_FACTOR_DEVIATION,
            image_animation_duration: IMAGE_ANIMATION_DURATION,
            image_animation_duration_deviation: IMAGE_ANIMATION_DURATION_DEVIATION,
            transition_animation_duration: TRANSITION_ANIMATION_DURATION,
            transition_animation_duration_deviation: TRANSITION_ANIMATION_DURATION_DEVIATION,
            show_face_rectangles: false,
            seed: None,
        }
    }
}

impl SlideshowConfig {
    /// Checks every value, then the duration relationship: the pan/zoom must
    /// outlast the half of the cross-dissolve that overlaps it.
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("scale_factor_deviation", self.scale_factor_deviation),
            ("image_animation_duration_deviation", self.image_animation_duration_deviation),
            (
                "transition_animation_duration_deviation",
                self.transition_animation_duration_deviation,
            ),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::invalid_config(format!(
                    "{name} must be finite and >= 0, got {value}"
                )));
            }
        }

        let positive = [
            ("image_animation_duration", self.image_animation_duration),
            ("transition_animation_duration", self.transition_animation_duration),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::invalid_config(format!(
                    "{name} must be finite and > 0, got {value}"
                )));
            }
        }

        let margin = self.image_animation_duration
            - self.image_animation_duration_deviation
            - (self.transition_animation_duration - self.transition_animation_duration_deviation)
                / 2.0;
        if margin <= 0.0 {
            return Err(Error::InvalidDurations {
                image: self.image_animation_duration,
                image_deviation: self.image_animation_duration_deviation,
                transition: self.transition_animation_duration,
                transition_deviation: self.transition_animation_duration_deviation,
            });
        }
        Ok(())
    }

    pub fn animation_dependencies(&self) -> AnimationDependencies {
        AnimationDependencies {
            scale_factor_deviation: self.scale_factor_deviation,
            image_animation_duration: self.image_animation_duration,
            image_animation_duration_deviation: self.image_animation_duration_deviation,
        }
    }
}

/// Snapshot of the values the calculators need, taken once per run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationDependencies {
    pub scale_factor_deviation: f64,
    pub image_animation_duration: f64,
    pub image_animation_duration_deviation: f64,
}
