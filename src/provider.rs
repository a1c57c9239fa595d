use std::sync::Arc;

use kurbo::Size;

use crate::animation::ImageAnimation;
use crate::calculator::{AnimationCalculator, AnimationDataSource};
use crate::config::{AnimationDependencies, FaceRecognitionMode};
use crate::error::{Error, Result};
use crate::face::{FaceAnimationCalculator, FaceDetector, FaceSelection};
use crate::host::SlideImage;
use crate::random::RandomGenerator;

/// Animation strategy of a run, chosen once from the face recognition mode.
pub enum AnimationSequenceProvider<I> {
    Plain(AnimationCalculator),
    Faces {
        calculator: FaceAnimationCalculator,
        selection: FaceSelection,
        detector: Arc<dyn FaceDetector<I>>,
    },
}

impl<I: SlideImage> AnimationSequenceProvider<I> {
    pub fn new(
        mode: FaceRecognitionMode,
        dependencies: AnimationDependencies,
        detector: Option<Arc<dyn FaceDetector<I>>>,
        rng: Arc<dyn RandomGenerator>,
    ) -> Result<Self> {
        let plain = AnimationCalculator::new(dependencies, rng);
        if mode == FaceRecognitionMode::None {
            return Ok(Self::Plain(plain));
        }

        let selection = FaceSelection::try_from(mode)?;
        let detector = detector.ok_or(Error::MissingFaceDetector(mode.name()))?;
        Ok(Self::Faces {
            calculator: FaceAnimationCalculator::new(plain.clone(), Box::new(plain)),
            selection,
            detector,
        })
    }

    pub fn build_animation(&self, image: &I, viewport: Size) -> ImageAnimation {
        match self {
            Self::Plain(calculator) => calculator.build_animation(image.size(), viewport),
            Self::Faces {
                calculator,
                selection,
                detector,
            } => {
                let face = selection.find(detector.as_ref(), image);
                calculator.build_animation(face, image.size(), viewport)
            }
        }
    }
}
