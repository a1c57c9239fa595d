//! Raylib host for the slideshow: textures, two fading surfaces, recording.

pub mod ffmpeg;
pub mod library;
pub mod renderer;
pub mod surface;
pub mod texture_loader;

use std::path::{Path, PathBuf};

use kurbo::Size;

use crate::host::SlideImage;

/// A loaded photo.
///
/// `size` is the photo fitted to cover the viewport at scale 1, so every
/// pan/zoom scale is relative to that fit. `pixel_size` is the texture size.
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    pub index: usize,
    pub path: PathBuf,
    pub pixel_size: Size,
    pub size: Size,
}

impl Photo {
    pub fn new(index: usize, path: PathBuf, pixel_size: Size, viewport: Size) -> Self {
        let fit = (viewport.width / pixel_size.width).max(viewport.height / pixel_size.height);
        let fit = if fit.is_finite() && fit > 0.0 { fit } else { 1.0 };
        Self {
            index,
            path,
            pixel_size,
            size: pixel_size * fit,
        }
    }

    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl SlideImage for Photo {
    fn size(&self) -> Size {
        self.size
    }
}

impl AsRef<Path> for Photo {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

#[cfg(feature = "detection")]
impl crate::subject_detection::PhotoFile for Photo {
    fn pixel_size(&self) -> Size {
        self.pixel_size
    }
}
