use kurbo::Size;
use raylib::prelude::*;

use crate::animation::{ImageAnimation, ImageState};
use crate::face::FaceRect;
use crate::host::Completion;

struct Fade {
    from: f64,
    to: f64,
    duration: f64,
    elapsed: f64,
    done: Option<Completion>,
}

/// One of the two image layers.
pub struct Surface {
    photo: Option<(usize, Size)>,
    animation: Option<ImageAnimation>,
    elapsed: f64,
    pan_zoom_done: Option<Completion>,
    opacity: f64,
    fade: Option<Fade>,
    pub paused: bool,
    faces: Vec<FaceRect>,
}

impl Surface {
    pub fn new(opacity: f64) -> Self {
        Self {
            photo: None,
            animation: None,
            elapsed: 0.0,
            pan_zoom_done: None,
            opacity,
            fade: None,
            paused: false,
            faces: Vec::new(),
        }
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// Current transform, the start state before any time has passed.
    pub fn state(&self) -> Option<ImageState> {
        self.animation.map(|a| a.state_at(self.elapsed))
    }

    pub fn show(&mut self, photo: usize, size: Size, animation: ImageAnimation, done: Completion) {
        self.photo = Some((photo, size));
        self.animation = Some(animation);
        self.elapsed = 0.0;
        self.pan_zoom_done = Some(done);
        self.faces.clear();
    }

    pub fn fade_to(&mut self, to: f64, duration: f64, done: Option<Completion>) {
        self.fade = Some(Fade {
            from: self.opacity,
            to,
            duration,
            elapsed: 0.0,
            done,
        });
    }

    pub fn set_faces(&mut self, faces: &[FaceRect]) {
        self.faces = faces.to_vec();
    }

    pub fn clear_faces(&mut self) {
        self.faces.clear();
    }

    /// Freezes the surface and drops pending completions.
    pub fn halt(&mut self) {
        self.paused = true;
        self.pan_zoom_done = None;
        if let Some(fade) = self.fade.take() {
            self.opacity = fade.to;
        }
    }

    pub fn reset(&mut self, opacity: f64) {
        *self = Surface::new(opacity);
    }

    pub fn update(&mut self, dt: f64) {
        if self.paused {
            return;
        }

        if let Some(animation) = self.animation {
            self.elapsed = (self.elapsed + dt).min(animation.duration);
            if self.elapsed >= animation.duration {
                if let Some(done) = self.pan_zoom_done.take() {
                    done.complete();
                }
            }
        }

        if let Some(fade) = self.fade.as_mut() {
            fade.elapsed += dt;
            let t = if fade.duration > 0.0 {
                (fade.elapsed / fade.duration).min(1.0)
            } else {
                1.0
            };
            self.opacity = fade.from + (fade.to - fade.from) * t;
            if t >= 1.0 {
                if let Some(done) = self.fade.take().and_then(|f| f.done) {
                    done.complete();
                }
            }
        }
    }

    /// Scaled image rectangle in viewport pixels.
    fn dest(&self, viewport: Size) -> Option<(Rectangle, f64)> {
        let (_, size) = self.photo?;
        let state = self.state()?;
        let scaled = size * state.scale;
        let x = viewport.width / 2.0 + state.position.x - scaled.width / 2.0;
        let y = viewport.height / 2.0 + state.position.y - scaled.height / 2.0;
        let rect = Rectangle::new(x as f32, y as f32, scaled.width as f32, scaled.height as f32);
        Some((rect, state.scale))
    }

    pub fn draw(&self, d: &mut impl RaylibDraw, textures: &[Texture2D], viewport: Size) {
        if self.opacity <= 0.0 {
            return;
        }
        let Some((index, _)) = self.photo else {
            return;
        };
        let (Some(texture), Some((dest, scale))) = (textures.get(index), self.dest(viewport)) else {
            return;
        };

        d.draw_texture_pro(
            texture,
            Rectangle::new(0.0, 0.0, texture.width() as f32, texture.height() as f32),
            dest,
            Vector2::new(0.0, 0.0),
            0.0,
            Color::WHITE.fade(self.opacity as f32),
        );

        for face in &self.faces {
            d.draw_rectangle_lines_ex(
                Rectangle::new(
                    dest.x + (face.x0 * scale) as f32,
                    dest.y + (face.y0 * scale) as f32,
                    (face.width() * scale) as f32,
                    (face.height() * scale) as f32,
                ),
                3.0,
                Color::RED.fade(self.opacity as f32),
            );
        }
    }
}
