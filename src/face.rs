//! Face-anchored animations.
//!
//! One end of the pan is centred on a face found in the image; the other end
//! is placed the same way the plain calculator does it. Images without faces
//! fall back to a backup data source.

use kurbo::{Rect, Size};

use crate::animation::{ImageAnimation, ImageState};
use crate::calculator::{AnimationCalculator, AnimationDataSource};
use crate::config::FaceRecognitionMode;
use crate::error::Error;

/// Face rectangle in image pixels, origin at the top-left corner.
pub type FaceRect = Rect;

/// Finds faces in images. Called from the background workers.
pub trait FaceDetector<I>: Send + Sync {
    fn all_faces(&self, image: &I) -> Vec<FaceRect>;

    fn biggest_face(&self, image: &I) -> Option<FaceRect> {
        biggest(&self.all_faces(image))
    }
}

pub fn biggest(faces: &[FaceRect]) -> Option<FaceRect> {
    faces
        .iter()
        .copied()
        .max_by(|a, b| a.area().total_cmp(&b.area()))
}

/// Rectangle enclosing every face, `None` when there are none.
pub fn group(faces: &[FaceRect]) -> Option<FaceRect> {
    faces.iter().copied().reduce(|acc, face| acc.union(face))
}

/// Which faces anchor the pan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceSelection {
    Biggest,
    Group,
}

impl FaceSelection {
    pub fn find<I>(self, detector: &dyn FaceDetector<I>, image: &I) -> Option<FaceRect> {
        match self {
            FaceSelection::Biggest => detector.biggest_face(image),
            FaceSelection::Group => group(&detector.all_faces(image)),
        }
    }
}

impl TryFrom<FaceRecognitionMode> for FaceSelection {
    type Error = Error;

    fn try_from(mode: FaceRecognitionMode) -> Result<Self, Error> {
        match mode {
            FaceRecognitionMode::Biggest => Ok(FaceSelection::Biggest),
            FaceRecognitionMode::Group => Ok(FaceSelection::Group),
            FaceRecognitionMode::None => Err(Error::UnsupportedFaceMode(mode.name())),
        }
    }
}

pub struct FaceAnimationCalculator {
    calculator: AnimationCalculator,
    // used when no face was found
    backup: Box<dyn AnimationDataSource>,
}

impl FaceAnimationCalculator {
    pub fn new(calculator: AnimationCalculator, backup: Box<dyn AnimationDataSource>) -> Self {
        Self { calculator, backup }
    }

    pub fn build_animation(
        &self,
        face: Option<FaceRect>,
        image_size: Size,
        viewport: Size,
    ) -> ImageAnimation {
        let Some(face) = face else {
            return self.backup.build_animation(image_size, viewport);
        };
        let calc = &self.calculator;

        let start_scale = calc.random_scale(image_size, viewport);
        let end_scale = calc.random_scale(image_size, viewport);
        let scaled_start = image_size * start_scale;
        let scaled_end = image_size * end_scale;

        let start_from_face = calc.rng().boolean();

        let (start_position, end_position) = if start_from_face {
            let start = calc.face_position(face.scale_from_origin(start_scale), scaled_start, viewport);
            let end = calc.opposite_angle_position(start, scaled_end, viewport);
            (start, end)
        } else {
            let start = calc.pinned_to_edges_position(scaled_start, viewport);
            let end = calc.face_position(face.scale_from_origin(end_scale), scaled_end, viewport);
            (start, end)
        };

        ImageAnimation::new(
            ImageState::new(start_scale, start_position),
            ImageState::new(end_scale, end_position),
            calc.animation_duration(),
        )
    }
}
