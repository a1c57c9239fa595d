use kurbo::Size;
use raylib::prelude::*;
use tracing::trace;

use crate::animation::ImageAnimation;
use crate::face::FaceRect;
use crate::host::{Completion, Renderer, SurfaceId};
use crate::viewer::Photo;
use crate::viewer::surface::Surface;

/// Draws the slideshow with raylib: two surfaces over the loaded textures.
pub struct RaylibRenderer {
    textures: Vec<Texture2D>,
    surfaces: [Surface; 2],
    front: SurfaceId,
    viewport: Size,
}

impl RaylibRenderer {
    pub fn new(textures: Vec<Texture2D>, viewport: Size) -> Self {
        Self {
            textures,
            surfaces: [Surface::new(1.0), Surface::new(0.0)],
            front: SurfaceId::First,
            viewport,
        }
    }

    fn surface(&mut self, id: SurfaceId) -> &mut Surface {
        match id {
            SurfaceId::First => &mut self.surfaces[0],
            SurfaceId::Second => &mut self.surfaces[1],
        }
    }

    /// Advances both surfaces by `dt` seconds.
    pub fn update(&mut self, dt: f64) {
        for surface in &mut self.surfaces {
            surface.update(dt);
        }
    }

    /// Draws the back surface, then the front one over it.
    pub fn draw(&self, d: &mut impl RaylibDraw) {
        d.clear_background(Color::BLACK);
        let back = self.front.other();
        let front = self.front;
        let viewport = self.viewport;
        for id in [back, front] {
            let surface = match id {
                SurfaceId::First => &self.surfaces[0],
                SurfaceId::Second => &self.surfaces[1],
            };
            surface.draw(d, &self.textures, viewport);
        }
    }
}

impl Renderer<Photo> for RaylibRenderer {
    fn viewport_size(&self) -> Size {
        self.viewport
    }

    fn reset_surfaces(&mut self, visible: SurfaceId) {
        self.surface(visible).reset(1.0);
        self.surface(visible.other()).reset(0.0);
        self.front = visible;
    }

    fn apply_pan_zoom(
        &mut self,
        surface: SurfaceId,
        image: &Photo,
        animation: &ImageAnimation,
        done: Completion,
    ) {
        trace!(?surface, photo = image.index, duration = animation.duration, "pan/zoom");
        self.surface(surface)
            .show(image.index, image.size, *animation, done);
    }

    fn cross_dissolve(&mut self, from: SurfaceId, to: SurfaceId, duration: f64, done: Completion) {
        trace!(?from, ?to, duration, "cross-dissolve");
        self.surface(from).fade_to(0.0, duration, None);
        self.surface(to).fade_to(1.0, duration, Some(done));
        self.front = to;
    }

    fn pause(&mut self, surface: SurfaceId) {
        self.surface(surface).paused = true;
    }

    fn resume(&mut self, surface: SurfaceId) {
        self.surface(surface).paused = false;
    }

    fn stop(&mut self) {
        for surface in &mut self.surfaces {
            surface.halt();
        }
    }

    fn show_face_rectangles(&mut self, surface: SurfaceId, image: &Photo, faces: &[FaceRect]) {
        trace!(?surface, photo = image.index, faces = faces.len(), "face rectangles");
        self.surface(surface).set_faces(faces);
    }

    fn clear_face_rectangles(&mut self, surface: SurfaceId) {
        self.surface(surface).clear_faces();
    }
}
