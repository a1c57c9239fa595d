use std::sync::Arc;

use kurbo::{Rect, Size, Vec2};

use crate::animation::{ImageAnimation, ImageState};
use crate::config::AnimationDependencies;
use crate::random::{RandomGenerator, jitter};

/// Builds one pan/zoom animation for an image of `image_size` shown in a
/// viewport of `viewport`.
pub trait AnimationDataSource: Send + Sync {
    fn build_animation(&self, image_size: Size, viewport: Size) -> ImageAnimation;
}

/// Random scales, positions and durations without any face information.
#[derive(Clone)]
pub struct AnimationCalculator {
    dependencies: AnimationDependencies,
    rng: Arc<dyn RandomGenerator>,
}

impl AnimationCalculator {
    pub fn new(dependencies: AnimationDependencies, rng: Arc<dyn RandomGenerator>) -> Self {
        Self { dependencies, rng }
    }

    pub fn rng(&self) -> &dyn RandomGenerator {
        self.rng.as_ref()
    }

    /// Smallest scale at which the image covers the viewport, never below 1.
    pub fn min_scale(image_size: Size, viewport: Size) -> f64 {
        let cover = (viewport.width / image_size.width).max(viewport.height / image_size.height);
        if cover.is_finite() { cover.max(1.0) } else { 1.0 }
    }

    pub fn random_scale(&self, image_size: Size, viewport: Size) -> f64 {
        let min = Self::min_scale(image_size, viewport);
        self.rng
            .uniform(min, min + self.dependencies.scale_factor_deviation)
    }

    /// Largest translation per axis that keeps the viewport covered.
    pub fn translation_range(scaled_image: Size, viewport: Size) -> Vec2 {
        Vec2::new(
            ((scaled_image.width - viewport.width) / 2.0).max(0.0),
            ((scaled_image.height - viewport.height) / 2.0).max(0.0),
        )
    }

    /// Per axis: one edge, the centre, or the other edge.
    pub fn pinned_to_edges_position(&self, scaled_image: Size, viewport: Size) -> Vec2 {
        let range = Self::translation_range(scaled_image, viewport);
        Vec2::new(self.pick_edge(range.x), self.pick_edge(range.y))
    }

    /// The far corner of the range as seen from `start`.
    pub fn opposite_angle_position(&self, start: Vec2, scaled_image: Size, viewport: Size) -> Vec2 {
        let range = Self::translation_range(scaled_image, viewport);
        Vec2::new(self.opposite(start.x, range.x), self.opposite(start.y, range.y))
    }

    /// Translation putting the centre of `scaled_face` at the viewport centre.
    ///
    /// `scaled_face` is in scaled image coordinates, origin at the top-left
    /// corner of the image.
    pub fn face_position(&self, scaled_face: Rect, scaled_image: Size, viewport: Size) -> Vec2 {
        let range = Self::translation_range(scaled_image, viewport);
        let image_center = Vec2::new(scaled_image.width / 2.0, scaled_image.height / 2.0);
        let offset = image_center - scaled_face.center().to_vec2();
        Vec2::new(
            offset.x.clamp(-range.x, range.x),
            offset.y.clamp(-range.y, range.y),
        )
    }

    pub fn animation_duration(&self) -> f64 {
        jitter(
            self.rng.as_ref(),
            self.dependencies.image_animation_duration,
            self.dependencies.image_animation_duration_deviation,
        )
    }

    fn pick_edge(&self, range: f64) -> f64 {
        match self.rng.uniform(0.0, 3.0) {
            roll if roll < 1.0 => -range,
            roll if roll < 2.0 => 0.0,
            _ => range,
        }
    }

    fn opposite(&self, start: f64, range: f64) -> f64 {
        if start > 0.0 {
            -range
        } else if start < 0.0 {
            range
        } else if self.rng.boolean() {
            range
        } else {
            -range
        }
    }
}

impl AnimationDataSource for AnimationCalculator {
    fn build_animation(&self, image_size: Size, viewport: Size) -> ImageAnimation {
        let start_scale = self.random_scale(image_size, viewport);
        let end_scale = self.random_scale(image_size, viewport);

        let start_position = self.pinned_to_edges_position(image_size * start_scale, viewport);
        let end_position =
            self.opposite_angle_position(start_position, image_size * end_scale, viewport);

        ImageAnimation::new(
            ImageState::new(start_scale, start_position),
            ImageState::new(end_scale, end_position),
            self.animation_duration(),
        )
    }
}
